// src/store.rs
//
// String-keyed JSON document store. Each key holds one JSON payload
// ("amarvote_users", "votesSubmissions"); services decide the shape.
// A missing key is Ok(None) so callers can seed defaults; an unreadable
// or unparseable payload is a hard error, not an empty state.
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

pub const USERS_KEY: &str = "amarvote_users";
pub const SUBMISSIONS_KEY: &str = "votesSubmissions";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read key '{key}': {source}")]
    Read {
        key: String,
        source: std::io::Error,
    },

    #[error("failed to write key '{key}': {source}")]
    Write {
        key: String,
        source: std::io::Error,
    },

    #[error("corrupt payload under key '{key}': {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
}

/// The storage seam. Handlers and services receive this injected instead
/// of touching the filesystem, so tests swap in a `MemoryStore`.
pub trait KvStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&self, key: &str, payload: &str) -> Result<(), StoreError>;
}

/// Typed read of a key: `Ok(None)` when the key was never written.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.load(key)? {
        Some(raw) => {
            let value = serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Typed write of a key.
pub fn save_json<T: Serialize>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string_pretty(value).map_err(|source| StoreError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    store.save(key, &raw)
}

/// Directory-backed store: one `<key>.json` file per key.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn save(&self, key: &str, payload: &str) -> Result<(), StoreError> {
        // Write-then-rename so a crash mid-write never leaves a torn file
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        let write = std::fs::write(&tmp, payload)
            .and_then(|_| std::fs::rename(&tmp, self.path_for(key)));
        write.map_err(|source| StoreError::Write {
            key: key.to_string(),
            source,
        })
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn save(&self, key: &str, payload: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_none_not_error() {
        let store = MemoryStore::new();
        let loaded: Option<Vec<String>> = load_json(&store, "nothing").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn corrupt_payload_is_an_error_not_empty() {
        let store = MemoryStore::new();
        store.save(USERS_KEY, "{not json").unwrap();
        let result: Result<Option<Vec<String>>, _> = load_json(&store, USERS_KEY);
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = MemoryStore::new();
        save_json(&store, SUBMISSIONS_KEY, &vec!["a", "b"]).unwrap();
        let loaded: Option<Vec<String>> = load_json(&store, SUBMISSIONS_KEY).unwrap();
        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
    }
}
