//! Data directory location detection and management

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Data directory name under the home directory
const DATA_DIR: &str = ".todos";

/// Errors related to the data location
#[derive(Debug, Error)]
pub enum StorageLocationError {
    #[error("Failed to access home directory")]
    NoHomeDirectory,
    #[error("Data path exists but is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Represents where persisted state lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    /// Directory holding one JSON file per storage key
    pub data_dir: PathBuf,
}

impl StorageLocation {
    /// Get the per-user location (~/.todos)
    pub fn global() -> Result<Self, StorageLocationError> {
        let home = dirs::home_dir().ok_or(StorageLocationError::NoHomeDirectory)?;
        Ok(StorageLocation {
            data_dir: home.join(DATA_DIR),
        })
    }

    /// Use an explicit directory
    pub fn at(path: impl AsRef<Path>) -> Self {
        StorageLocation {
            data_dir: path.as_ref().to_path_buf(),
        }
    }

    /// Resolve an optional override, falling back to the global location
    pub fn resolve(dir: Option<&Path>) -> Result<Self, StorageLocationError> {
        match dir {
            Some(dir) => Ok(Self::at(dir)),
            None => Self::global(),
        }
    }

    /// Create the data directory if it doesn't exist
    pub fn ensure_exists(&self) -> Result<(), StorageLocationError> {
        if self.data_dir.exists() && !self.data_dir.is_dir() {
            return Err(StorageLocationError::NotADirectory(self.data_dir.clone()));
        }
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }

    /// Path of the file backing `key`
    pub fn file_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}
