use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::{check_key, KeyValueStore};
use crate::error::StorageError;

const EXTENSION: &str = "json";

/// Document store backed by a directory: key `catalog` lives in `catalog.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Use `root` as the data directory. It is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.root.join(format!("{key}.{EXTENSION}")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(key)?;

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!("No document at {}", path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StorageError::Read {
                    key: key.to_string(),
                    source,
                })
            }
        };

        let value = serde_json::from_str(&content).map_err(|source| StorageError::Corrupted {
            key: key.to_string(),
            source,
        })?;

        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let write_err = |source| StorageError::Write {
            key: key.to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.root).await.map_err(write_err)?;

        let content = serde_json::to_string_pretty(&value).map_err(|source| {
            StorageError::Corrupted {
                key: key.to_string(),
                source,
            }
        })?;

        // Write to a sibling temp file first so readers never see a torn document
        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
        tokio::fs::write(&tmp, content).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(write_err)?;

        debug!("Wrote {} to {}", key, path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::Write {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Read {
                    key: "*".to_string(),
                    source,
                })
            }
        };

        let mut keys = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|source| StorageError::Read {
                key: "*".to_string(),
                source,
            })?;
            let Some(entry) = entry else { break };

            let path = entry.path();
            if path.extension().map(|e| e == EXTENSION).unwrap_or(false) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if check_key(stem).is_ok() {
                        keys.push(stem.to_string());
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
