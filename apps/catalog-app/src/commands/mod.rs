//! # Commands Module
//!
//! Every operation the front end can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── auth.rs     ◄─── login, logout, whoami, login gate
//! ├── product.rs  ◄─── load, list (pipeline), get, add, edit, delete, brands
//! └── user.rs     ◄─── create_user, list_users
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs the catalog
//! get_product(&app.catalog, id)
//!
//! // Catalog plus the list settings
//! list_products(&app.catalog, &view)
//!
//! // Only needs the user repository
//! create_user(&app.db.users(), &form, scheme).await
//! ```
//!
//! Every fallible command returns `ApiResult<T>`; DTOs serialize in camelCase.

pub mod auth;
pub mod product;
pub mod user;

pub use auth::{ensure_logged_in, login, logout, whoami, SessionDto};
pub use product::{
    add_product, delete_product, edit_product, get_product, list_brands, list_products,
    load_products, PageDto, ProductChanges, ProductDto,
};
pub use user::{create_user, list_users, UserDto};
