//! File-based key-value storage: one JSON file per key

use crate::storage::kv::{KeyValueStorage, StorageError, validate_key};
use crate::storage::location::StorageLocation;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Directory-backed storage
#[derive(Debug, Clone)]
pub struct FileStorage {
    location: StorageLocation,
}

impl FileStorage {
    /// Create a file storage for the given location
    pub fn new(location: StorageLocation) -> Self {
        FileStorage { location }
    }

    /// Get the storage location
    pub fn location(&self) -> &StorageLocation {
        &self.location
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let path = self.location.file_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.location.ensure_exists()?;

        // Temp file + rename: a document is replaced whole or not at all
        let path = self.location.file_for(key);
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = write_atomically(&tmp, &path, value) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                log::debug!("Could not remove {:?}: {}", tmp, cleanup);
            }
            return Err(e.into());
        }

        log::debug!("Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }
}

fn write_atomically(tmp: &Path, path: &Path, value: &str) -> io::Result<()> {
    let mut file = fs::File::create(tmp)?;
    file.write_all(value.as_bytes())?;
    file.sync_all()?;
    fs::rename(tmp, path)
}
