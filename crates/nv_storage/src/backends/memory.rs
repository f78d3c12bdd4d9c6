use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nv_core::{ArtifactStore, Error, ObjectSummary, Result};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// Process-local store. Contents are lost on exit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bytes and content type stored under `key`.
    pub async fn get_blob(&self, key: &str) -> Option<(Vec<u8>, String)> {
        let objects = self.objects.read().await;
        objects
            .get(key)
            .map(|object| (object.bytes.clone(), object.content_type.clone()))
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    async fn insert(&self, key: &str, bytes: Vec<u8>, content_type: &str) {
        let mut objects = self.objects.write().await;
        objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_json(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let objects = self.objects.read().await;
        match objects.get(key) {
            Some(object) => serde_json::from_slice(&object.bytes)
                .map(Some)
                .map_err(|e| Error::StoreUnavailable(format!("{} is not JSON: {}", key, e))),
            None => Ok(None),
        }
    }

    async fn put_json(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.insert(key, bytes, "application/json").await;
        Ok(())
    }

    async fn put_blob(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        self.insert(key, bytes, content_type).await;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        let objects = self.objects.read().await;
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                last_modified: Some(object.last_modified),
            })
            .collect())
    }

    async fn signed_read_url(&self, key: &str, ttl: Duration) -> Result<String> {
        Ok(format!("memory://{}?expires_in={}", key, ttl.as_secs()))
    }
}
