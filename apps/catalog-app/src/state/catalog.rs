//! # Product Catalog
//!
//! The in-memory product list plus the store it mirrors.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add / edit / update                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductForm::validate  ──── uses is_name_unique over the cache        │
//! │       │ ok                                                              │
//! │       ▼                                                                 │
//! │  ProductBackend ──────────► SQLite (catalog-db) or local JSON cache    │
//! │       │ stored row                                                      │
//! │       ▼                                                                 │
//! │  cache: RwLock<Vec<Product>>   (front insert / replace / remove)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The cache lock is only taken after a store call has completed and is
//! never held across an `.await`.

use std::sync::RwLock;

use chrono::Utc;
use tracing::{debug, info};

use catalog_core::pipeline::available_brands;
use catalog_core::validation::{Classification, ProductForm};
use catalog_core::{NewProduct, Product, ProductPatch};
use catalog_db::ProductRepository;

use super::cache::LocalProductStore;
use crate::error::{ApiError, ApiResult, ErrorCode};

/// Where product rows are stored.
pub enum ProductBackend {
    Sqlite(ProductRepository),
    Local(LocalProductStore),
}

impl ProductBackend {
    async fn list(&self) -> ApiResult<Vec<Product>> {
        match self {
            ProductBackend::Sqlite(repo) => Ok(repo.list().await?),
            ProductBackend::Local(cache) => Ok(cache.list()),
        }
    }

    async fn insert(&self, draft: &NewProduct) -> ApiResult<Product> {
        match self {
            ProductBackend::Sqlite(repo) => Ok(repo.insert(draft).await?),
            ProductBackend::Local(cache) => Ok(cache.insert(draft)?),
        }
    }

    async fn update(&self, id: &str, patch: &ProductPatch) -> ApiResult<Product> {
        match self {
            ProductBackend::Sqlite(repo) => Ok(repo.update(id, patch).await?),
            ProductBackend::Local(cache) => Ok(cache.update(id, patch)?),
        }
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        match self {
            ProductBackend::Sqlite(repo) => Ok(repo.delete(id).await?),
            ProductBackend::Local(cache) => Ok(cache.delete(id)?),
        }
    }
}

/// Product repository as seen by commands.
pub struct ProductCatalog {
    backend: ProductBackend,
    classification: Classification,
    products: RwLock<Vec<Product>>,
}

impl ProductCatalog {
    pub fn new(backend: ProductBackend, classification: Classification) -> Self {
        ProductCatalog {
            backend,
            classification,
            products: RwLock::new(Vec::new()),
        }
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Reloads every product from the store, newest first.
    ///
    /// On failure the previous cache is kept.
    pub async fn refresh(&self) -> ApiResult<Vec<Product>> {
        let products = self.backend.list().await?;
        info!(count = products.len(), "Product list loaded");

        *self.products.write().expect("Product list lock poisoned") = products.clone();
        Ok(products)
    }

    /// Snapshot of the cached list.
    pub fn products(&self) -> Vec<Product> {
        self.products
            .read()
            .expect("Product list lock poisoned")
            .clone()
    }

    pub fn get(&self, id: &str) -> ApiResult<Product> {
        self.products
            .read()
            .expect("Product list lock poisoned")
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Product", id))
    }

    /// Whether `name` is free, ignoring case and the product `exclude_id`.
    ///
    /// Only as fresh as the last [`refresh`](Self::refresh).
    pub fn is_name_unique(&self, name: &str, exclude_id: Option<&str>) -> bool {
        let name = name.trim();
        !self
            .products
            .read()
            .expect("Product list lock poisoned")
            .iter()
            .any(|p| Some(p.id.as_str()) != exclude_id && p.has_name(name))
    }

    /// Sorted distinct brands of the cached list.
    pub fn available_brands(&self) -> Vec<String> {
        available_brands(&self.products.read().expect("Product list lock poisoned"))
    }

    /// Validates a new-product form and stores it.
    pub async fn add(&self, form: &ProductForm) -> ApiResult<Product> {
        let draft = form.validate(&self.classification, |name| {
            self.is_name_unique(name, None)
        })?;
        debug!(name = %draft.name, "Adding product");

        let stored = self.backend.insert(&draft).await.map_err(name_conflict)?;

        self.products
            .write()
            .expect("Product list lock poisoned")
            .insert(0, stored.clone());
        Ok(stored)
    }

    /// Validates a full edit form and stores it.
    pub async fn edit(&self, id: &str, form: &ProductForm) -> ApiResult<Product> {
        let draft = form.validate(&self.classification, |name| {
            self.is_name_unique(name, Some(id))
        })?;
        self.store_update(id, &ProductPatch::from(draft)).await
    }

    /// Applies a partial change to a cached product.
    ///
    /// The patched product is re-validated as a whole, so a patch cannot
    /// make a product invalid.
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> ApiResult<Product> {
        let mut candidate = self.get(id)?;
        patch.apply_to(&mut candidate, Utc::now());

        self.edit(id, &ProductForm::from_product(&candidate)).await
    }

    async fn store_update(&self, id: &str, patch: &ProductPatch) -> ApiResult<Product> {
        debug!(id = %id, "Updating product");
        let stored = self.backend.update(id, patch).await.map_err(name_conflict)?;

        let mut products = self.products.write().expect("Product list lock poisoned");
        match products.iter_mut().find(|p| p.id == stored.id) {
            Some(cached) => *cached = stored.clone(),
            None => products.insert(0, stored.clone()),
        }
        Ok(stored)
    }

    /// Deletes a product. A missing id is `NOT_FOUND`.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        debug!(id = %id, "Deleting product");
        self.backend.delete(id).await?;

        self.products
            .write()
            .expect("Product list lock poisoned")
            .retain(|p| p.id != id);
        Ok(())
    }
}

/// Gives store conflicts the same wording as the form check.
fn name_conflict(err: ApiError) -> ApiError {
    match err.code {
        ErrorCode::Conflict => ApiError::conflict("Product name must be unique"),
        _ => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::state::store::MemoryStore;
    use catalog_core::ProductStatus;
    use catalog_db::{Database, DbConfig};

    fn form(name: &str) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            description: Some("Adjustable arm".to_string()),
            price: "24.50".to_string(),
            brand: "Lumen".to_string(),
            status: ProductStatus::Active,
            stock: "7".to_string(),
        }
    }

    async fn sqlite_catalog() -> ProductCatalog {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        ProductCatalog::new(ProductBackend::Sqlite(db.products()), Classification::default())
    }

    fn local_catalog() -> ProductCatalog {
        let cache = LocalProductStore::open(Arc::new(MemoryStore::new())).unwrap();
        ProductCatalog::new(ProductBackend::Local(cache), Classification::default())
    }

    #[tokio::test]
    async fn test_add_goes_to_front_of_cache() {
        let catalog = sqlite_catalog().await;
        catalog.add(&form("Desk Lamp")).await.unwrap();
        let second = catalog.add(&form("Floor Lamp")).await.unwrap();

        let cached = catalog.products();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].id, second.id);
        assert_eq!(second.price_cents, 2450);

        // The store agrees after a reload.
        let reloaded = catalog.refresh().await.unwrap();
        assert_eq!(reloaded[0].id, second.id);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_store() {
        let catalog = sqlite_catalog().await;
        let mut bad = form("Desk Lamp");
        bad.price = "-3".to_string();
        bad.stock = "".to_string();

        let err = catalog.add(&bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.field("price").is_some());
        assert!(err.field("stock").is_some());
        assert!(catalog.refresh().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_name_uniqueness_ignores_case_and_self() {
        let catalog = sqlite_catalog().await;
        let lamp = catalog.add(&form("Desk Lamp")).await.unwrap();

        assert!(!catalog.is_name_unique("desk lamp", None));
        assert!(catalog.is_name_unique("desk lamp", Some(&lamp.id)));
        assert!(catalog.is_name_unique("Floor Lamp", None));

        let err = catalog.add(&form("DESK LAMP")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.field("name").is_some());
    }

    #[tokio::test]
    async fn test_stale_cache_conflict_comes_from_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog =
            ProductCatalog::new(ProductBackend::Sqlite(db.products()), Classification::default());

        // Another client adds the name after our last refresh.
        let draft = form("Desk Lamp")
            .validate(&Classification::default(), |_| true)
            .unwrap();
        db.products().insert(&draft).await.unwrap();

        let err = catalog.add(&form("desk lamp")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_update_replaces_cached_entry() {
        let catalog = sqlite_catalog().await;
        let lamp = catalog.add(&form("Desk Lamp")).await.unwrap();

        let patch = ProductPatch {
            stock: Some(0),
            status: Some(ProductStatus::Inactive),
            ..Default::default()
        };
        let updated = catalog.update(&lamp.id, &patch).await.unwrap();

        assert_eq!(updated.id, lamp.id);
        assert_eq!(updated.stock, 0);
        assert_eq!(updated.status, ProductStatus::Inactive);
        assert_eq!(updated.created_at, lamp.created_at);
        assert!(updated.updated_at >= lamp.updated_at);
        assert_eq!(catalog.get(&lamp.id).unwrap(), updated);
        assert_eq!(catalog.products().len(), 1);
    }

    #[tokio::test]
    async fn test_update_cannot_break_rules() {
        let catalog = sqlite_catalog().await;
        let lamp = catalog.add(&form("Desk Lamp")).await.unwrap();
        catalog.add(&form("Floor Lamp")).await.unwrap();

        let negative = ProductPatch {
            stock: Some(-1),
            ..Default::default()
        };
        let err = catalog.update(&lamp.id, &negative).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let rename = ProductPatch {
            name: Some("floor lamp".to_string()),
            ..Default::default()
        };
        let err = catalog.update(&lamp.id, &rename).await.unwrap_err();
        assert!(err.field("name").is_some());
    }

    #[tokio::test]
    async fn test_edit_keeps_own_name() {
        let catalog = sqlite_catalog().await;
        let lamp = catalog.add(&form("Desk Lamp")).await.unwrap();

        let mut edit = ProductForm::from_product(&lamp);
        edit.name = "DESK LAMP".to_string();
        edit.price = "30".to_string();

        let edited = catalog.edit(&lamp.id, &edit).await.unwrap();
        assert_eq!(edited.name, "DESK LAMP");
        assert_eq!(edited.price_cents, 3000);
    }

    #[tokio::test]
    async fn test_delete() {
        let catalog = sqlite_catalog().await;
        let lamp = catalog.add(&form("Desk Lamp")).await.unwrap();

        catalog.delete(&lamp.id).await.unwrap();
        assert!(catalog.products().is_empty());

        let err = catalog.delete(&lamp.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = catalog.get(&lamp.id).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_local_backend() {
        let catalog = local_catalog();
        let seeded = catalog.refresh().await.unwrap();
        assert_eq!(seeded.len(), 22);
        assert!(!catalog.is_name_unique("atomic habits", None));

        let brands = catalog.available_brands();
        assert_eq!(brands.len(), 8);
        assert!(brands.windows(2).all(|w| w[0] < w[1]));

        let lamp = catalog.add(&form("Desk Lamp")).await.unwrap();
        assert_eq!(catalog.refresh().await.unwrap()[0].id, lamp.id);

        catalog.delete(&lamp.id).await.unwrap();
        assert_eq!(catalog.refresh().await.unwrap().len(), 22);
    }

    #[tokio::test]
    async fn test_closed_classification_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let categories = Classification {
            label: "Category".to_string(),
            values: vec!["Electronics".to_string(), "Books".to_string()],
        };
        let catalog = ProductCatalog::new(ProductBackend::Sqlite(db.products()), categories);

        let err = catalog.add(&form("Desk Lamp")).await.unwrap_err();
        assert!(err.field("category").is_some());

        let mut ok = form("Desk Lamp");
        ok.brand = "electronics".to_string();
        assert_eq!(catalog.add(&ok).await.unwrap().brand, "Electronics");
    }
}
