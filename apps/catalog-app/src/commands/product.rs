//! # Product Commands
//!
//! ## List Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product List Flow                                    │
//! │                                                                         │
//! │  load_products()  ──► ProductCatalog::refresh (store, newest first)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  list_products(view)                                                   │
//! │       │  search → brand → status → price → stock level                 │
//! │       │  → sort (stable) → paginate                                    │
//! │       ▼                                                                 │
//! │  PageDto<ProductDto>                                                   │
//! │                                                                         │
//! │  The pipeline runs over the cached list; it never hits the store.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use catalog_core::pipeline::Page;
use catalog_core::validation::ProductForm;
use catalog_core::{Product, ProductStatus, StockLevel};

use crate::error::ApiResult;
use crate::state::{CatalogView, ProductCatalog};

/// Product DTO for output.
///
/// Money is rendered as decimal text so JSON consumers never see floats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub price_cents: i64,
    pub brand: String,
    pub status: ProductStatus,
    pub stock: i64,
    pub stock_level: StockLevel,
    /// "Out of Stock", "Low Stock (3 remaining)", "25 in stock"
    pub stock_label: String,
    pub inventory_value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        let level = p.stock_level();
        ProductDto {
            price: p.price().to_string(),
            inventory_value: p.inventory_value().to_string(),
            stock_level: level,
            stock_label: level.label(p.stock),
            id: p.id,
            name: p.name,
            description: p.description,
            price_cents: p.price_cents,
            brand: p.brand,
            status: p.status,
            stock: p.stock,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// One rendered page of the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDto {
    pub items: Vec<ProductDto>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub active_filters: usize,
}

impl PageDto {
    fn from_page(page: Page<Product>, active_filters: usize) -> Self {
        PageDto {
            has_next: page.has_next(),
            has_previous: page.has_previous(),
            page: page.page,
            page_size: page.page_size,
            total_items: page.total_items,
            total_pages: page.total_pages,
            items: page.items.into_iter().map(ProductDto::from).collect(),
            active_filters,
        }
    }
}

/// Field overrides for an edit. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub price: Option<String>,
    pub brand: Option<String>,
    pub status: Option<ProductStatus>,
    pub stock: Option<String>,
}

impl ProductChanges {
    /// Pre-fills the edit form from `product`, then applies the overrides.
    pub fn into_form(self, product: &Product) -> ProductForm {
        let mut form = ProductForm::from_product(product);
        if let Some(name) = self.name {
            form.name = name;
        }
        if self.clear_description {
            form.description = None;
        } else if let Some(description) = self.description {
            form.description = Some(description);
        }
        if let Some(price) = self.price {
            form.price = price;
        }
        if let Some(brand) = self.brand {
            form.brand = brand;
        }
        if let Some(status) = self.status {
            form.status = status;
        }
        if let Some(stock) = self.stock {
            form.stock = stock;
        }
        form
    }
}

/// Fetches every product from the store into the catalog cache.
pub async fn load_products(catalog: &ProductCatalog) -> ApiResult<usize> {
    let products = catalog.refresh().await?;
    Ok(products.len())
}

/// Renders the current page of the cached list.
pub fn list_products(catalog: &ProductCatalog, view: &CatalogView) -> PageDto {
    let criteria = view.criteria();
    debug!(
        search = %criteria.search,
        brands = criteria.brands.len(),
        page = view.page(),
        sort = %view.sort().field,
        "list_products command"
    );

    let page = view.render(&catalog.products());
    PageDto::from_page(page, view.active_filter_count())
}

pub fn get_product(catalog: &ProductCatalog, id: &str) -> ApiResult<ProductDto> {
    debug!(id = %id, "get_product command");
    Ok(catalog.get(id)?.into())
}

pub async fn add_product(catalog: &ProductCatalog, form: &ProductForm) -> ApiResult<ProductDto> {
    debug!(name = %form.name, "add_product command");
    let product = catalog.add(form).await?;
    info!(id = %product.id, name = %product.name, "Product added");
    Ok(product.into())
}

pub async fn edit_product(
    catalog: &ProductCatalog,
    id: &str,
    changes: ProductChanges,
) -> ApiResult<ProductDto> {
    debug!(id = %id, "edit_product command");
    let current = catalog.get(id)?;
    let product = catalog.edit(id, &changes.into_form(&current)).await?;
    info!(id = %product.id, "Product updated");
    Ok(product.into())
}

pub async fn delete_product(catalog: &ProductCatalog, id: &str) -> ApiResult<()> {
    debug!(id = %id, "delete_product command");
    catalog.delete(id).await?;
    info!(id = %id, "Product deleted");
    Ok(())
}

/// Brands available for the brand filter.
pub fn list_brands(catalog: &ProductCatalog) -> Vec<String> {
    catalog.available_brands()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::error::ErrorCode;
    use crate::state::{LocalProductStore, MemoryStore, ProductBackend};
    use catalog_core::pipeline::{SortField, SortOrder, SortSpec, StockFilter};
    use catalog_core::validation::Classification;

    async fn catalog() -> ProductCatalog {
        let cache = LocalProductStore::open(Arc::new(MemoryStore::new())).unwrap();
        let catalog = ProductCatalog::new(ProductBackend::Local(cache), Classification::default());
        load_products(&catalog).await.unwrap();
        catalog
    }

    #[test]
    fn test_product_dto() {
        let product = catalog_core::sample::sample_products().remove(3);
        let dto = ProductDto::from(product);

        assert_eq!(dto.name, "Dyson V15 Detect");
        assert_eq!(dto.price, "750.00");
        assert_eq!(dto.stock_level, StockLevel::Low);
        assert_eq!(dto.stock_label, "Low Stock (8 remaining)");
        assert_eq!(dto.inventory_value, "6000.00");

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["priceCents"], 75000);
        assert_eq!(json["stockLevel"], "low");
    }

    #[tokio::test]
    async fn test_list_products_pages() {
        let catalog = catalog().await;
        let mut view = CatalogView::new(12);

        let first = list_products(&catalog, &view);
        assert_eq!(first.total_items, 22);
        assert_eq!(first.items.len(), 12);
        assert!(first.has_next);
        assert!(!first.has_previous);

        view.set_stock_level(StockFilter::OutOfStock);
        let out = list_products(&catalog, &view);
        assert_eq!(out.total_items, 1);
        assert_eq!(out.items[0].name, "Tesla Model Y Accessories Kit");
        assert_eq!(out.active_filters, 1);
    }

    #[tokio::test]
    async fn test_sorted_by_price() {
        let catalog = catalog().await;
        let mut view = CatalogView::new(48);
        view.set_sort(SortSpec::new(SortField::Price, SortOrder::Asc));

        let page = list_products(&catalog, &view);
        assert_eq!(page.items[0].name, "The Psychology of Money");
        assert!(page
            .items
            .windows(2)
            .all(|w| w[0].price_cents <= w[1].price_cents));
    }

    #[tokio::test]
    async fn test_edit_product() {
        let catalog = catalog().await;

        let changes = ProductChanges {
            price: Some("899.99".to_string()),
            clear_description: true,
            ..Default::default()
        };
        let edited = edit_product(&catalog, "1", changes).await.unwrap();
        assert_eq!(edited.name, "iPhone 15 Pro");
        assert_eq!(edited.price_cents, 89999);
        assert_eq!(edited.description, None);

        let bad = ProductChanges {
            stock: Some("lots".to_string()),
            ..Default::default()
        };
        let err = edit_product(&catalog, "1", bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.field("stock").is_some());
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let catalog = catalog().await;

        assert_eq!(get_product(&catalog, "2").unwrap().name, "Nike Air Max 270");
        delete_product(&catalog, "2").await.unwrap();

        assert_eq!(get_product(&catalog, "2").unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(
            delete_product(&catalog, "2").await.unwrap_err().code,
            ErrorCode::NotFound
        );
    }

    #[tokio::test]
    async fn test_add_product() {
        let catalog = catalog().await;
        let form = ProductForm {
            name: "Desk Lamp".to_string(),
            price: "24.5".to_string(),
            brand: "Home & Garden".to_string(),
            stock: "0".to_string(),
            ..Default::default()
        };

        let added = add_product(&catalog, &form).await.unwrap();
        assert_eq!(added.price, "24.50");
        assert_eq!(added.stock_label, "Out of Stock");
        assert_eq!(list_brands(&catalog).len(), 8);

        let err = add_product(&catalog, &form).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.field("name").is_some());
    }
}
