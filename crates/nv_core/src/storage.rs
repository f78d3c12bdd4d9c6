use std::time::Duration;

use async_trait::async_trait;
use crate::types::ObjectSummary;
use crate::Result;

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    fn name(&self) -> &str;

    /// Read a JSON document, `None` when the key does not exist.
    async fn get_json(&self, key: &str) -> Result<Option<serde_json::Value>>;

    async fn put_json(&self, key: &str, value: &serde_json::Value) -> Result<()>;

    async fn put_blob(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// List every object whose key starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectSummary>>;

    /// A URL granting read access to `key` for `ttl`.
    async fn signed_read_url(&self, key: &str, ttl: Duration) -> Result<String>;
}
