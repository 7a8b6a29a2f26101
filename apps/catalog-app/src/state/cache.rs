//! # Local Product Cache
//!
//! Products kept entirely in client-local storage, used when
//! `backend = "local"`.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open()                                                                 │
//! │    key "product-management-products" present and readable?             │
//! │       ├── yes → use it                                                 │
//! │       └── no  → seed with the sample list, write it back               │
//! │                                                                         │
//! │  insert / update / delete                                              │
//! │    change the in-memory list, then rewrite the full list               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use catalog_core::sample::sample_products;
use catalog_core::{NewProduct, Product, ProductPatch};

use super::store::LocalStore;
use crate::error::{CacheError, StorageError};

/// Storage key of the product list.
pub const PRODUCTS_KEY: &str = "product-management-products";

pub struct LocalProductStore {
    store: Arc<dyn LocalStore>,
    products: Mutex<Vec<Product>>,
}

impl LocalProductStore {
    /// Loads the stored list, seeding it with sample data the first time.
    pub fn open(store: Arc<dyn LocalStore>) -> Result<Self, StorageError> {
        let stored = match store.get(PRODUCTS_KEY)? {
            Some(raw) => match serde_json::from_str::<Vec<Product>>(&raw) {
                Ok(products) => Some(products),
                Err(e) => {
                    warn!(error = %e, "Stored products unreadable, using sample data");
                    None
                }
            },
            None => None,
        };

        let cache = LocalProductStore {
            store,
            products: Mutex::new(Vec::new()),
        };

        match stored {
            Some(products) => {
                debug!(count = products.len(), "Loaded local products");
                *cache.products.lock().expect("Product cache mutex poisoned") = products;
            }
            None => {
                let products = sample_products();
                info!(count = products.len(), "Seeding local products");
                cache.persist(&products)?;
                *cache.products.lock().expect("Product cache mutex poisoned") = products;
            }
        }

        Ok(cache)
    }

    /// All products, newest first.
    pub fn list(&self) -> Vec<Product> {
        let mut products = self.with_products(|products| products.clone());
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products
    }

    /// Adds a product at the front of the list.
    pub fn insert(&self, draft: &NewProduct) -> Result<Product, CacheError> {
        self.with_products_mut(|products| {
            if products.iter().any(|p| p.has_name(&draft.name)) {
                return Err(CacheError::Duplicate(draft.name.clone()));
            }

            let product = draft
                .clone()
                .into_product(Uuid::new_v4().to_string(), Utc::now());
            products.insert(0, product.clone());
            Ok(product)
        })
    }

    pub fn update(&self, id: &str, patch: &ProductPatch) -> Result<Product, CacheError> {
        self.with_products_mut(|products| {
            if let Some(name) = &patch.name {
                if products.iter().any(|p| p.id != id && p.has_name(name)) {
                    return Err(CacheError::Duplicate(name.clone()));
                }
            }

            let product = products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| CacheError::NotFound(id.to_string()))?;
            patch.apply_to(product, Utc::now());
            Ok(product.clone())
        })
    }

    pub fn delete(&self, id: &str) -> Result<(), CacheError> {
        self.with_products_mut(|products| {
            let index = products
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| CacheError::NotFound(id.to_string()))?;
            products.remove(index);
            Ok(())
        })
    }

    fn persist(&self, products: &[Product]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(products)?;
        self.store.set(PRODUCTS_KEY, &raw)
    }

    fn with_products<R>(&self, f: impl FnOnce(&Vec<Product>) -> R) -> R {
        let products = self.products.lock().expect("Product cache mutex poisoned");
        f(&products)
    }

    /// Runs a change and rewrites the stored list if it succeeded.
    ///
    /// A failed write rolls the in-memory list back.
    fn with_products_mut<R>(
        &self,
        f: impl FnOnce(&mut Vec<Product>) -> Result<R, CacheError>,
    ) -> Result<R, CacheError> {
        let mut products = self.products.lock().expect("Product cache mutex poisoned");
        let before = products.clone();

        let result = f(&mut products)?;
        if let Err(e) = self.persist(&products) {
            *products = before;
            return Err(e.into());
        }

        Ok(result)
    }
}
