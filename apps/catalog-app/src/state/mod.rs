//! # State Module
//!
//! Long-lived application state, one type per concern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │                 ┌──────────────────────────────┐                        │
//! │                 │  Arc<dyn LocalStore>         │                        │
//! │                 │  FileStore (JSON, 0600)      │                        │
//! │                 └──────────────┬───────────────┘                        │
//! │                    ┌───────────┴───────────┐                            │
//! │                    ▼                       ▼                            │
//! │  ┌──────────────────────┐   ┌────────────────────────────┐              │
//! │  │   SessionStore       │   │  LocalProductStore         │              │
//! │  │   key "user"         │   │  key "product-management-  │              │
//! │  │                      │   │       products"            │              │
//! │  └──────────────────────┘   └─────────────┬──────────────┘              │
//! │                                           │ backend = "local"           │
//! │  ┌──────────────────────┐   ┌─────────────▼──────────────┐              │
//! │  │   CatalogView        │   │  ProductCatalog            │              │
//! │  │   filters/sort/page  │──►│  RwLock<Vec<Product>>      │              │
//! │  └──────────────────────┘   └─────────────▲──────────────┘              │
//! │  ┌──────────────────────┐                 │ backend = "sqlite"          │
//! │  │   SearchDebouncer    │        ProductRepository (catalog-db)         │
//! │  │   watch + timer task │                                               │
//! │  └──────────────────────┘                                               │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Stores: interior Mutex, never held across .await                    │
//! │  • ProductCatalog: RwLock, written only after the store call returns   │
//! │  • CatalogView: plain value owned by the caller                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod catalog;
pub mod search;
pub mod session;
pub mod store;
pub mod view;

pub use cache::LocalProductStore;
pub use catalog::{ProductBackend, ProductCatalog};
pub use search::SearchDebouncer;
pub use session::SessionStore;
pub use store::{FileStore, LocalStore, MemoryStore};
pub use view::CatalogView;
