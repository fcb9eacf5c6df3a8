//! Key-value session storage.
//!
//! The HTTP client never touches ambient global state; it is handed a
//! `SessionStore` and reads the bearer token from it before every request.
//! `MemoryStore` backs tests, `FileStore` persists to a JSON file the way a
//! browser front-end would use localStorage.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::warn;

/// Literal storage keys shared with the original web front-end.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USER_ID: &str = "userId";
    pub const IS_ADMIN: &str = "isAdmin";
    pub const LOGIN_TIME: &str = "loginTime";

    /// Every key a session writes, in clearing order.
    pub const ALL: [&str; 4] = [TOKEN, USER_ID, IS_ADMIN, LOGIN_TIME];
}

/// String key-value storage for session state.
///
/// All values are strings, matching the localStorage contract the backend was
/// written against. `clear` on an empty store is a no-op; two concurrent
/// clears must both succeed.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    fn clear(&self);
}

/// In-process store for tests and short-lived clients.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

/// File-backed store persisting session state as pretty-printed JSON.
///
/// Mutations are written through immediately. Write failures are logged and
/// dropped rather than surfaced: losing persistence degrades to an in-memory
/// session, which is still correct for the current process.
pub struct FileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open a store at `path`, loading any existing contents.
    pub fn open(path: PathBuf) -> Result<Self> {
        let values = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse session file: {}", path.display()))?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn flush(&self, values: &HashMap<String, String>) {
        let result = (|| -> Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(values)?;
            std::fs::write(&self.path, contents)?;
            Ok(())
        })();
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "Failed to persist session store");
        }
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.lock();
        values.insert(key.to_string(), value.to_string());
        self.flush(&values);
    }

    fn remove(&self, key: &str) {
        let mut values = self.lock();
        if values.remove(key).is_some() {
            self.flush(&values);
        }
    }

    fn clear(&self) {
        let mut values = self.lock();
        if !values.is_empty() {
            values.clear();
            self.flush(&values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(keys::TOKEN), None);

        store.set(keys::TOKEN, "abc123");
        assert_eq!(store.get(keys::TOKEN), Some("abc123".to_string()));

        store.remove(keys::TOKEN);
        assert_eq!(store.get(keys::TOKEN), None);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = MemoryStore::new();
        store.set(keys::TOKEN, "abc123");
        store.set(keys::USER_ID, "7");

        store.clear();
        assert_eq!(store.get(keys::TOKEN), None);
        assert_eq!(store.get(keys::USER_ID), None);

        // Clearing an already-empty store must succeed
        store.clear();
        assert_eq!(store.get(keys::TOKEN), None);
    }

    #[test]
    fn test_file_store_persists_across_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");

        {
            let store = FileStore::open(path.clone()).expect("open");
            store.set(keys::TOKEN, "abc123");
            store.set(keys::IS_ADMIN, "true");
        }

        let reopened = FileStore::open(path).expect("reopen");
        assert_eq!(reopened.get(keys::TOKEN), Some("abc123".to_string()));
        assert_eq!(reopened.get(keys::IS_ADMIN), Some("true".to_string()));
    }

    #[test]
    fn test_file_store_clear_removes_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");

        let store = FileStore::open(path.clone()).expect("open");
        store.set(keys::TOKEN, "abc123");
        store.clear();

        let reopened = FileStore::open(path).expect("reopen");
        assert_eq!(reopened.get(keys::TOKEN), None);
    }
}
