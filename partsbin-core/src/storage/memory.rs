use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{check_key, KeyValueStore};
use crate::error::StorageError;

/// Process-local document store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: RwLock<BTreeMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        check_key(key)?;
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        check_key(key)?;
        self.documents.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        check_key(key)?;
        Ok(self.documents.write().await.remove(key).is_some())
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.documents.read().await.keys().cloned().collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
