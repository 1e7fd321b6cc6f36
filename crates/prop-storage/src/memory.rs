//! In-memory media store for tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::store::MediaStore;

/// Media store backed by a map. URLs resolve under a configurable base.
#[derive(Clone)]
pub struct MemoryMediaStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    public_base_url: String,
}

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

impl MemoryMediaStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Read back a stored object (test helper).
    pub async fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| (o.bytes.clone(), o.content_type.clone()))
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

impl Default for MemoryMediaStore {
    fn default() -> Self {
        Self::new("memory://media")
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn store(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> StorageResult<String> {
        if key.is_empty() || key.starts_with('/') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );

        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }
}
