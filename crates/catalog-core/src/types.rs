//! # Domain Types
//!
//! Core domain types used throughout the catalog.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      User       │   │    Session      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  user (User)    │       │
//! │  │  name (unique)  │   │  username       │   │  started_at     │       │
//! │  │  price_cents    │   │  email          │   └─────────────────┘       │
//! │  │  brand, status  │   │  (no hash!)     │                              │
//! │  │  stock          │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  NewProduct     │   │  ProductPatch   │   │   StockLevel    │       │
//! │  │  (add input)    │   │  (update input) │   │  OutOfStock     │       │
//! │  │  no id / times  │   │  every field    │   │  Low (1..=9)    │       │
//! │  └─────────────────┘   │  optional       │   │  InStock (10+)  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! - `id`: UUID v4, assigned by the record store, immutable
//! - `name`: human-facing key, unique case-insensitively, editable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Product Status
// =============================================================================

/// Whether a product is currently offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "Active",
            ProductStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = ValidationError;

    /// Case-insensitive: `"active"`, `"Active"` and `"ACTIVE"` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec!["Active".to_string(), "Inactive".to_string()],
            }),
        }
    }
}

// =============================================================================
// Stock Level
// =============================================================================

/// Stock classification of a single product.
///
/// ```text
///   stock:  0 │ 1 2 3 4 5 6 7 8 9 │ 10 11 12 ...
///           ──┼───────────────────┼──────────────
///   level:  Out│        Low        │   InStock
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    InStock,
}

impl StockLevel {
    /// Classifies a stock count.
    pub fn of(stock: i64) -> StockLevel {
        if stock <= 0 {
            StockLevel::OutOfStock
        } else if stock < LOW_STOCK_THRESHOLD {
            StockLevel::Low
        } else {
            StockLevel::InStock
        }
    }

    /// Badge text shown next to a product.
    pub fn label(&self, stock: i64) -> String {
        match self {
            StockLevel::OutOfStock => "Out of Stock".to_string(),
            StockLevel::Low => format!("Low Stock ({} remaining)", stock),
            StockLevel::InStock => format!("{} in stock", stock),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// One catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique case-insensitively.
    pub name: String,

    /// Optional long description.
    pub description: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Brand or category label, depending on catalog configuration.
    pub brand: String,

    pub status: ProductStatus,

    /// Units on hand, never negative.
    pub stock: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::of(self.stock)
    }

    /// Value of the units on hand (`price × stock`), saturating on overflow.
    pub fn inventory_value(&self) -> Money {
        self.price()
            .checked_mul(self.stock)
            .unwrap_or(Money::from_cents(i64::MAX))
    }

    /// Case-insensitive name comparison used by the uniqueness rule.
    pub fn has_name(&self, name: &str) -> bool {
        name_key(&self.name) == name_key(name)
    }
}

/// Folded form of a product name; two names collide when their keys match.
///
/// Full Unicode lowercasing, so `"Éclair"` and `"éclair"` share a key.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Input for creating a product. The store assigns `id` and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub brand: String,
    pub status: ProductStatus,
    pub stock: i64,
}

impl NewProduct {
    /// Builds the stored product once the store has chosen id and time.
    pub fn into_product(self, id: String, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price_cents: self.price_cents,
            brand: self.brand,
            status: self.status,
            stock: self.stock,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a product. `None` leaves a field untouched.
///
/// `description` is doubly optional: `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price_cents: Option<i64>,
    pub brand: Option<String>,
    pub status: Option<ProductStatus>,
    pub stock: Option<i64>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price_cents.is_none()
            && self.brand.is_none()
            && self.status.is_none()
            && self.stock.is_none()
    }

    /// Applies the patch and stamps `updated_at`. `id` and `created_at`
    /// are never touched.
    pub fn apply_to(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price_cents) = self.price_cents {
            product.price_cents = price_cents;
        }
        if let Some(brand) = &self.brand {
            product.brand = brand.clone();
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        product.updated_at = now;
    }
}

impl From<NewProduct> for ProductPatch {
    /// A full-form edit: every field is replaced.
    fn from(p: NewProduct) -> Self {
        ProductPatch {
            name: Some(p.name),
            description: Some(p.description),
            price_cents: Some(p.price_cents),
            brand: Some(p.brand),
            status: Some(p.status),
            stock: Some(p.stock),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A login principal as seen by everything outside the record store.
///
/// There is deliberately no password hash here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user. The hash is computed before it gets here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

// =============================================================================
// Session
// =============================================================================

/// Client-local record of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: User, started_at: DateTime<Utc>) -> Self {
        Session { user, started_at }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        let now = Utc::now();
        NewProduct {
            name: "Widget".to_string(),
            description: Some("A widget".to_string()),
            price_cents: 1999,
            brand: "Acme".to_string(),
            status: ProductStatus::Active,
            stock: 4,
        }
        .into_product("p-1".to_string(), now)
    }

    #[test]
    fn test_stock_level_boundaries() {
        assert_eq!(StockLevel::of(0), StockLevel::OutOfStock);
        assert_eq!(StockLevel::of(1), StockLevel::Low);
        assert_eq!(StockLevel::of(9), StockLevel::Low);
        assert_eq!(StockLevel::of(10), StockLevel::InStock);
    }

    #[test]
    fn test_stock_labels() {
        assert_eq!(StockLevel::of(0).label(0), "Out of Stock");
        assert_eq!(StockLevel::of(3).label(3), "Low Stock (3 remaining)");
        assert_eq!(StockLevel::of(25).label(25), "25 in stock");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("active".parse::<ProductStatus>().unwrap(), ProductStatus::Active);
        assert_eq!("Inactive".parse::<ProductStatus>().unwrap(), ProductStatus::Inactive);
        assert!("archived".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn test_patch_keeps_identity_and_creation_time() {
        let mut p = product();
        let created = p.created_at;
        let later = created + chrono::Duration::seconds(5);

        let patch = ProductPatch {
            name: Some("Widget Pro".to_string()),
            description: Some(None),
            stock: Some(12),
            ..Default::default()
        };
        patch.apply_to(&mut p, later);

        assert_eq!(p.id, "p-1");
        assert_eq!(p.name, "Widget Pro");
        assert_eq!(p.description, None);
        assert_eq!(p.stock, 12);
        assert_eq!(p.price_cents, 1999);
        assert_eq!(p.created_at, created);
        assert_eq!(p.updated_at, later);
    }

    #[test]
    fn test_empty_patch() {
        assert!(ProductPatch::default().is_empty());
        assert!(!ProductPatch {
            stock: Some(1),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_has_name_ignores_case() {
        let p = product();
        assert!(p.has_name("widget"));
        assert!(p.has_name("WIDGET"));
        assert!(!p.has_name("widgets"));
        assert_eq!(name_key("Éclair"), name_key("ÉCLAIR"));
    }

    #[test]
    fn test_inventory_value() {
        let p = product();
        assert_eq!(p.inventory_value().cents(), 1999 * 4);
    }

    #[test]
    fn test_session_serializes_without_hash() {
        let p = product();
        let user = User {
            id: "u-1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            created_at: p.created_at,
            updated_at: p.created_at,
        };
        let json = serde_json::to_string(&Session::new(user, p.created_at)).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("password"));
    }
}
