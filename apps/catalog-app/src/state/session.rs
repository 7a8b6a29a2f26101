//! # Session Store
//!
//! The logged-in user, kept in client-local storage under the `user` key so
//! a later process starts logged in.

use std::sync::Arc;

use tracing::warn;

use catalog_core::Session;

use super::store::LocalStore;
use crate::error::StorageError;

/// Storage key of the session record.
pub const SESSION_KEY: &str = "user";

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn LocalStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        SessionStore { store }
    }

    /// Reads the stored session.
    ///
    /// Missing, unreadable and malformed records all mean "no session".
    pub fn load(&self) -> Option<Session> {
        let raw = match self.store.get(SESSION_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Could not read session");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed session");
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        let raw = serde_json::to_string(session)?;
        self.store.set(SESSION_KEY, &raw)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(SESSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::MemoryStore;
    use catalog_core::User;
    use chrono::Utc;

    fn session() -> Session {
        let now = Utc::now();
        Session::new(
            User {
                id: "u-1".to_string(),
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                created_at: now,
                updated_at: now,
            },
            now,
        )
    }

    #[test]
    fn test_save_load_clear() {
        let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
        assert!(sessions.load().is_none());

        let session = session();
        sessions.save(&session).unwrap();
        assert_eq!(sessions.load(), Some(session));

        sessions.clear().unwrap();
        assert!(sessions.load().is_none());
    }

    #[test]
    fn test_malformed_session_is_none() {
        let store = Arc::new(MemoryStore::new());
        store.set(SESSION_KEY, "{\"user\": 42").unwrap();

        let sessions = SessionStore::new(store);
        assert!(sessions.load().is_none());
    }
}
