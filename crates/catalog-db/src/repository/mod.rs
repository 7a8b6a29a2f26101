//! # Repository Module
//!
//! Record store repositories for the catalog.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  ProductCatalog / Authenticator (catalog-app)                          │
//! │       │                                                                 │
//! │       │  db.products().update(id, &patch)                              │
//! │       ▼                                                                 │
//! │  ProductRepository                    UserRepository                   │
//! │  ├── list()                           ├── list()                       │
//! │  ├── get_by_id(id)                    ├── find_by_username(name)       │
//! │  ├── insert(&draft)                   └── insert(&new_user)            │
//! │  ├── update(id, &patch)                                                │
//! │  └── delete(id)                                                        │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store assigns ids and timestamps. Callers never pass them in.

pub mod product;
pub mod user;
