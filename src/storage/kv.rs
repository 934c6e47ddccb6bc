//! Key-value storage abstraction and the in-memory backend

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

use crate::storage::location::StorageLocationError;

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Storage location error: {0}")]
    Location(#[from] StorageLocationError),
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("Storage quota exceeded writing {key} ({needed} bytes, {limit} allowed)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },
}

/// String-keyed storage for JSON documents.
///
/// Methods take `&self`: a backend is shared by every store of one app.
pub trait KeyValueStorage {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Storage handle shared between the stores of one application
pub type SharedStorage = Rc<dyn KeyValueStorage>;

/// Read and decode a JSON value.
///
/// Missing keys are `Ok(None)`; undecodable values are `Err`.
pub fn load_json<T: DeserializeOwned>(
    storage: &dyn KeyValueStorage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match storage.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value
pub fn save_json<T: Serialize + ?Sized>(
    storage: &dyn KeyValueStorage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    storage.set(key, &raw)
}

/// Keys are limited to characters that are safe as file names
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// In-memory storage with an optional byte quota over all values
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses writes once the stored values exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        MemoryStorage {
            entries: RefCell::default(),
            quota: Some(bytes),
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        if let Some(limit) = self.quota {
            let others: usize = self
                .entries
                .borrow()
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let storage = MemoryStorage::new();
        assert!(storage.get("tasks").unwrap().is_none());

        storage.set("tasks", "[]").unwrap();
        assert_eq!(storage.get("tasks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_invalid_key() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(storage.get("").is_err());
    }

    #[test]
    fn test_quota_exceeded() {
        let storage = MemoryStorage::with_quota(10);
        storage.set("a", "12345").unwrap();
        // Overwriting a key only counts its new size
        storage.set("a", "1234567890").unwrap();

        let err = storage.set("b", "x").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 11, .. }));
        assert!(storage.get("b").unwrap().is_none());
    }

    #[test]
    fn test_json_helpers() {
        let storage = MemoryStorage::new();
        save_json(&storage, "names", &vec!["Inbox", "Work"]).unwrap();

        let names: Option<Vec<String>> = load_json(&storage, "names").unwrap();
        assert_eq!(names.unwrap(), vec!["Inbox", "Work"]);

        let missing: Option<Vec<String>> = load_json(&storage, "missing").unwrap();
        assert!(missing.is_none());

        storage.set("broken", "{not json").unwrap();
        assert!(load_json::<Vec<String>>(&storage, "broken").is_err());
    }
}
