//! Storage layer: the local key-value facility state is persisted to

pub mod file_store;
pub mod kv;
pub mod location;

pub use file_store::FileStorage;
pub use kv::{KeyValueStorage, MemoryStorage, SharedStorage, StorageError, load_json, save_json};
pub use location::{StorageLocation, StorageLocationError};
