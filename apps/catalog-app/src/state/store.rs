//! # Client-Local Key/Value Storage
//!
//! A small string-keyed store that survives restarts. The session and the
//! local product cache both sit on top of it.
//!
//! ## File Format
//! One JSON object, each value a JSON document stored as a string:
//! ```json
//! {
//!   "user": "{\"user\":{\"id\":\"...\",\"username\":\"alice\"},\"started_at\":\"...\"}",
//!   "product-management-products": "[...]"
//! }
//! ```
//!
//! The file is written with mode 0600 on Unix since it holds the session.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::StorageError;

/// String key/value storage.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// File Store
// =============================================================================

/// JSON-file backed store with an in-memory copy of all entries.
///
/// Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Opens the store, reading the file if it exists.
    ///
    /// An unreadable or corrupt file is logged and treated as empty; the
    /// next write replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        debug!(path = %path.display(), entries = entries.len(), "Opened local store");

        FileStore {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&self.path, contents).map_err(|source| self.io_error(source))?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|source| self.io_error(source))?;
        }

        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn with_entries<R>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> R) -> R {
        let mut entries = self.entries.lock().expect("Local store mutex poisoned");
        f(&mut entries)
    }

    /// Writes `entries`, or puts `previous` back under `key` if the write fails.
    fn save_or_restore(
        &self,
        entries: &mut HashMap<String, String>,
        key: &str,
        previous: Option<String>,
    ) -> Result<(), StorageError> {
        if let Err(e) = self.save(entries) {
            match previous {
                Some(value) => entries.insert(key.to_string(), value),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

fn load_entries(path: &Path) -> HashMap<String, String> {
    if !path.exists() {
        return HashMap::new();
    }

    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|contents| {
            serde_json::from_str::<HashMap<String, String>>(&contents).map_err(|e| e.to_string())
        });

    match parsed {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable local store");
            HashMap::new()
        }
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.with_entries(|entries| entries.get(key).cloned()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_entries(|entries| {
            let previous = entries.insert(key.to_string(), value.to_string());
            self.save_or_restore(entries, key, previous)
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.with_entries(|entries| match entries.remove(key) {
            Some(previous) => self.save_or_restore(entries, key, Some(previous)),
            None => Ok(()),
        })
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// Non-persistent store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().expect("Memory store mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().expect("Memory store mutex poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().expect("Memory store mutex poisoned");
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_temp_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().join("nested").join("store.json"));
        (store, temp_dir)
    }

    #[test]
    fn test_file_store_basic_operations() {
        let (store, _temp_dir) = create_temp_store();

        assert_eq!(store.get("user").unwrap(), None);

        store.set("user", "{\"name\":\"alice\"}").unwrap();
        assert_eq!(store.get("user").unwrap().as_deref(), Some("{\"name\":\"alice\"}"));

        store.remove("user").unwrap();
        assert_eq!(store.get("user").unwrap(), None);

        // Idempotent
        store.remove("user").unwrap();
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let (store, _temp_dir) = create_temp_store();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        let reopened = FileStore::open(store.path());
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        fs::write(&path, "not json at all").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("user").unwrap(), None);

        store.set("user", "x").unwrap();
        assert_eq!(FileStore::open(&path).get("user").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_failed_write_keeps_previous_entries() {
        let (store, temp_dir) = create_temp_store();
        store.set("user", "old").unwrap();

        // A plain file where the parent directory should be makes every save fail
        let nested = temp_dir.path().join("nested");
        fs::remove_dir_all(&nested).unwrap();
        fs::write(&nested, "").unwrap();

        assert!(matches!(store.set("user", "new"), Err(StorageError::Io { .. })));
        assert_eq!(store.get("user").unwrap().as_deref(), Some("old"));

        assert!(store.set("other", "x").is_err());
        assert_eq!(store.get("other").unwrap(), None);

        assert!(store.remove("user").is_err());
        assert_eq!(store.get("user").unwrap().as_deref(), Some("old"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (store, _temp_dir) = create_temp_store();
        store.set("user", "x").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
