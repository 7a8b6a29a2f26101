//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module)                                                 │
//! │       │   UNIQUE constraint failed  → UniqueViolation (a Conflict)     │
//! │       │   no row                    → NotFound                         │
//! │       │   anything else             → a store failure                  │
//! │       ▼                                                                 │
//! │  ApiError (catalog-app) → CONFLICT / NOT_FOUND / STORE_ERROR           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Product name already used (case-insensitive)
    /// - Username or email already registered
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed (including CHECK constraint violations).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True for uniqueness violations.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }

    /// Fills in the offending value of a UniqueViolation.
    ///
    /// SQLite only reports the column, so repositories supply the value
    /// they tried to write. `value_of` maps the column name to it.
    pub(crate) fn with_conflicting_value(self, value_of: impl Fn(&str) -> Option<String>) -> Self {
        match self {
            DbError::UniqueViolation { field, value } => {
                let value = value_of(&field).unwrap_or(value);
                DbError::UniqueViolation { field, value }
            }
            other => other,
        }
    }
}

/// Extracts the column from `"UNIQUE constraint failed: products.name"`.
///
/// Composite constraints (`"t.a, t.b"`) report their first column.
fn unique_column(message: &str) -> String {
    message
        .split("UNIQUE constraint failed: ")
        .nth(1)
        .and_then(|cols| cols.split(',').next())
        .map(|col| col.trim())
        .map(|col| col.rsplit('.').next().unwrap_or(col))
        .unwrap_or("unknown")
        .to_string()
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if msg.contains("UNIQUE constraint failed") {
                    DbError::UniqueViolation {
                        field: unique_column(msg),
                        value: "unknown".to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_column() {
        assert_eq!(unique_column("UNIQUE constraint failed: products.name"), "name");
        assert_eq!(unique_column("UNIQUE constraint failed: users.email"), "email");
        assert_eq!(
            unique_column("UNIQUE constraint failed: t.a, t.b"),
            "a"
        );
        assert_eq!(unique_column("something else"), "unknown");
    }

    #[test]
    fn test_with_conflicting_value() {
        let err = DbError::duplicate("name", "unknown")
            .with_conflicting_value(|col| (col == "name").then(|| "Widget".to_string()));
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "Duplicate name: 'Widget' already exists");

        let untouched = DbError::not_found("Product", "p-1").with_conflicting_value(|_| None);
        assert!(untouched.is_not_found());
    }
}
