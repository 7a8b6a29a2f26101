//! # catalog-app: Product Catalog Application
//!
//! Wires configuration, storage and state together and exposes the
//! commands through the `catalog` CLI.
//!
//! ## Module Structure
//! ```text
//! src/
//! ├── main.rs        ◄─── Binary entry point
//! ├── lib.rs         ◄─── You are here (App setup, tracing)
//! ├── cli.rs         ◄─── clap definitions, output, interactive browser
//! ├── config.rs      ◄─── AppConfig (defaults < TOML < CATALOG_* env)
//! ├── auth.rs        ◄─── Authentication flow
//! ├── error.rs       ◄─── ApiError and app-level errors
//! ├── commands/      ◄─── One function per operation
//! └── state/         ◄─── Stores, session, catalog cache, view, debouncer
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter, to stderr                    │
//! │     • Default: info,catalog=debug,sqlx=warn (override with RUST_LOG)   │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • defaults, then catalog.toml, then CATALOG_* variables            │
//! │                                                                         │
//! │  3. Open Storage ─────────────────────────────────────────────────────► │
//! │     • Local key/value file (session, local product cache)              │
//! │     • SQLite with WAL mode, pending migrations applied                 │
//! │                                                                         │
//! │  4. Initialize State ─────────────────────────────────────────────────► │
//! │     • Authenticator restores a stored session                          │
//! │     • ProductCatalog over the configured backend                       │
//! │                                                                         │
//! │  5. Run the requested command                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog_db::{Database, DbConfig};

use crate::auth::Authenticator;
use crate::config::{AppConfig, Backend};
use crate::error::ApiResult;
use crate::state::{
    FileStore, LocalProductStore, LocalStore, ProductBackend, ProductCatalog, SessionStore,
};

/// Everything a command might need, built once per process.
pub struct App {
    pub config: AppConfig,
    pub db: Database,
    pub auth: Authenticator,
    pub catalog: ProductCatalog,
}

impl App {
    /// Opens the configured stores.
    pub async fn init(config: AppConfig) -> ApiResult<App> {
        let local: Arc<dyn LocalStore> = Arc::new(FileStore::open(&config.local_store_path));
        let db = Database::new(DbConfig::new(config.database_path.clone())).await?;
        App::assemble(config, db, local)
    }

    /// Builds the state on top of already opened stores.
    pub fn assemble(config: AppConfig, db: Database, local: Arc<dyn LocalStore>) -> ApiResult<App> {
        let backend = match config.backend {
            Backend::Sqlite => ProductBackend::Sqlite(db.products()),
            Backend::Local => ProductBackend::Local(LocalProductStore::open(local.clone())?),
        };
        info!(backend = ?config.backend, "Product backend selected");

        let auth = Authenticator::new(db.users(), SessionStore::new(local));
        if let Some(session) = auth.restore() {
            info!(username = %session.user.username, "Session restored");
        }

        let catalog = ProductCatalog::new(backend, config.classification.clone());

        Ok(App {
            config,
            db,
            auth,
            catalog,
        })
    }
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show all debug messages
/// - `RUST_LOG=catalog=trace` - Trace level for our crates only
/// - Default: INFO for everything, DEBUG for catalog crates
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,catalog=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads configuration, opens the stores and runs one CLI invocation.
pub async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let json = cli.json;

    let app = App::init(config).await?;
    let result = cli::execute(&app, cli.command, json).await;
    app.db.close().await;

    if let Err(e) = &result {
        if json {
            println!("{}", serde_json::to_string_pretty(e)?);
        }
    }
    Ok(result?)
}
