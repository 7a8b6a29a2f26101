//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - List everything, newest first
//! - Insert / update returning the stored row
//! - Hard delete
//!
//! ## Update Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update(id, patch)                                                      │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    SELECT ... WHERE id = ?      ── none? ──► NotFound (rollback)        │
//! │    patch.apply_to(&mut row)     (updated_at = now, created_at kept)    │
//! │    UPDATE ... RETURNING ...     ── UNIQUE? ──► UniqueViolation          │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use catalog_core::{name_key, NewProduct, Product, ProductPatch};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price_cents, brand, status, stock, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let newest_first = repo.list().await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, newest first.
    ///
    /// Rows created in the same instant come back in reverse insertion order.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY created_at DESC, rowid DESC",
            PRODUCT_COLUMNS
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product. The id and both timestamps are assigned here.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored row
    /// * `Err(DbError::UniqueViolation)` - Name already taken (any case)
    pub async fn insert(&self, draft: &NewProduct) -> DbResult<Product> {
        debug!(name = %draft.name, "Inserting product");

        let product = draft.clone().into_product(generate_product_id(), Utc::now());
        let sql = format!(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, brand, status, stock, created_at, updated_at,
                name_key
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );

        let stored = sqlx::query_as::<_, Product>(&sql)
            .bind(&product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price_cents)
            .bind(&product.brand)
            .bind(product.status)
            .bind(product.stock)
            .bind(product.created_at)
            .bind(product.updated_at)
            .bind(name_key(&product.name))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_name(e.into(), &draft.name))?;

        debug!(id = %stored.id, "Product inserted");
        Ok(stored)
    }

    /// Applies a partial update and returns the stored row.
    ///
    /// Only `updated_at` is refreshed; `id` and `created_at` never change.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::UniqueViolation)` - New name already taken
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let select = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        let mut product = sqlx::query_as::<_, Product>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        patch.apply_to(&mut product, Utc::now());

        let update = format!(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                brand = ?5,
                status = ?6,
                stock = ?7,
                updated_at = ?8,
                name_key = ?9
            WHERE id = ?1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );

        let stored = sqlx::query_as::<_, Product>(&update)
            .bind(&product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price_cents)
            .bind(&product.brand)
            .bind(product.status)
            .bind(product.stock)
            .bind(product.updated_at)
            .bind(name_key(&product.name))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| conflict_on_name(e.into(), &product.name))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(stored)
    }

    /// Hard-deletes a product.
    ///
    /// A missing id is `NotFound`, not a silent success.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts all products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Reports a `name_key` collision as a conflict on `name` with the offending value.
fn conflict_on_name(err: DbError, name: &str) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } if field == "name_key" || field == "name" => {
            DbError::duplicate("name", name)
        }
        other => other,
    }
}

/// Generates a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
