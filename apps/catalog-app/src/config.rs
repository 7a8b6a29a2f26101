//! # Configuration
//!
//! Application configuration loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`CATALOG_*`, `__` for nesting)
//! 2. Config file (`--config`, `$CATALOG_CONFIG`, or `<config dir>/catalog.toml`)
//! 3. Defaults (this file)
//!
//! ```toml
//! backend = "sqlite"
//! page_size = 24
//! password_scheme = "argon2"
//!
//! [classification]
//! label = "category"
//! values = ["Electronics", "Clothing", "Books"]
//! ```
//!
//! Configuration is read-only after loading, so no lock is needed.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use catalog_core::password::PasswordScheme;
use catalog_core::validation::Classification;
use catalog_core::{DEFAULT_PAGE_SIZE, SEARCH_DEBOUNCE_MS};

const ENV_PREFIX: &str = "CATALOG";

/// Where products are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// The SQLite record store
    #[default]
    Sqlite,

    /// The client-local product cache (JSON, seeded with sample data)
    Local,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database file (users always live here)
    pub database_path: PathBuf,

    /// Client-local key/value file (session, local product cache)
    pub local_store_path: PathBuf,

    pub backend: Backend,

    /// Rows per page in product listings
    pub page_size: usize,

    /// Quiet period before search input is applied
    pub search_debounce_ms: u64,

    /// Digest used for newly created users
    pub password_scheme: PasswordScheme,

    /// Brand or category rule for products
    pub classification: Classification,

    /// Product commands need a logged-in user
    pub require_login: bool,
}

impl Default for AppConfig {
    /// Development defaults.
    ///
    /// ## Default Paths
    /// - **Linux**: `~/.local/share/product-catalog/`
    /// - **macOS**: `~/Library/Application Support/com.catalog.product-catalog/`
    /// - **Windows**: `%APPDATA%\catalog\product-catalog\data\`
    fn default() -> Self {
        let data_dir = default_data_dir();
        AppConfig {
            database_path: data_dir.join("catalog.db"),
            local_store_path: data_dir.join("local-store.json"),
            backend: Backend::Sqlite,
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: SEARCH_DEBOUNCE_MS,
            password_scheme: PasswordScheme::Sha256,
            classification: Classification::default(),
            require_login: true,
        }
    }
}

impl AppConfig {
    /// Loads configuration from file and environment.
    ///
    /// An explicitly named file must exist; the default one is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match config_file {
            Some(path) => (path.to_path_buf(), true),
            None => (default_config_file(), false),
        };

        let builder = Config::builder()
            .add_source(file_source(&path, required))
            .add_source(env_source());

        Self::from_builder(builder)
    }

    /// Deserializes and validates whatever sources `builder` holds.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue("page_size".to_string()));
        }
        if self.classification.label.trim().is_empty() {
            return Err(ConfigError::InvalidValue("classification.label".to_string()));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

fn file_source(path: &Path, required: bool) -> File<config::FileSourceFile, FileFormat> {
    File::new(&path.to_string_lossy(), FileFormat::Toml).required(required)
}

/// `CATALOG_PAGE_SIZE=24`, `CATALOG_CLASSIFICATION__VALUES=Books,Music`.
fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("classification.values")
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "catalog", "product-catalog")
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_config_file() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("catalog.toml"))
        .unwrap_or_else(|| PathBuf::from("catalog.toml"))
}
