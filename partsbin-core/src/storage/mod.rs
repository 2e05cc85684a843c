//! Persistence boundary
//!
//! The core reads and writes JSON documents through a single injected
//! [`KeyValueStore`], chosen once by the composition layer:
//! - [`InMemoryStore`] (tests, ephemeral sessions)
//! - [`FileStore`] (one JSON file per key in a data directory)
//!
//! The store does not serialize concurrent writers. Callers that mutate from
//! several places must funnel writes through a single owner.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::InMemoryStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;

/// Namespace holding the user's catalog layer
pub const CATALOG_KEY: &str = "catalog";

/// Namespace holding the ownership record
pub const COLLECTION_KEY: &str = "collection";

/// Async key-value document store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a document; `None` when the key was never written
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Write a document, replacing any previous value
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Delete a document; `false` when nothing was stored
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// Keys currently holding a document, sorted
    async fn list(&self) -> Result<Vec<String>, StorageError>;

    /// Backend identifier for logging
    fn name(&self) -> &'static str;
}

/// Keys are restricted to `[a-z0-9_-]` so they map safely onto file names
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
