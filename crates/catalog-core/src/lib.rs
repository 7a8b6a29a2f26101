//! # catalog-core: Pure Catalog Logic
//!
//! This crate is the heart of the product catalog. It holds the domain
//! types and every rule that can be expressed without I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Catalog Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    catalog CLI (apps/catalog-app)               │   │
//! │  │    login ──► products list/add/edit/delete ──► users            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ catalog-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ pipeline  │  │ password  │  │ validation│  │   │
//! │  │   │  Product  │  │  filter   │  │  digest   │  │  forms    │  │   │
//! │  │   │   User    │  │  sort     │  │  verify   │  │  fields   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  catalog-db (Record Store)                      │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, User, Session, ...)
//! - [`money`] - Integer money used for prices
//! - [`pipeline`] - Filter, sort and paginate over an in-memory product list
//! - [`password`] - One-way password digests
//! - [`validation`] - Form validation
//! - [`sample`] - Built-in sample catalog
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_core::pipeline::{apply, FilterCriteria, SortSpec};
//! use catalog_core::sample::sample_products;
//!
//! let products = sample_products();
//! let criteria = FilterCriteria::default().with_search("book");
//! let view = apply(&products, &criteria, SortSpec::default());
//!
//! assert!(view.iter().all(|p| p.brand == "Books"
//!     || p.name.to_lowercase().contains("book")
//!     || p.description.as_deref().unwrap_or("").to_lowercase().contains("book")));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod password;
pub mod pipeline;
pub mod sample;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError, ValidationErrors};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Products with fewer units than this (but more than zero) are "low stock".
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Page sizes offered by the list view.
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [6, 12, 24, 48];

/// Quiet period before search input is applied to the pipeline.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Minimum password length accepted when creating an account.
pub const MIN_PASSWORD_LENGTH: usize = 6;
