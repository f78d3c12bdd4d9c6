use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use nv_core::{ArtifactStore, Error, ObjectSummary, Result};
use tracing::{debug, info};

/// Objects in an S3 bucket. Read URLs are presigned `GetObject` requests.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Client from the default AWS credential chain, optionally pinned to `region`.
    pub async fn new(bucket: &str, region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        let sdk_config = loader.load().await;
        info!(bucket, region = ?sdk_config.region(), "Using S3 storage");
        Self::from_client(Client::new(&sdk_config), bucket)
    }

    pub fn from_client(client: Client, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn s3_error<E: std::error::Error>(action: &str, key: &str, e: E) -> Error {
    Error::StoreUnavailable(format!(
        "S3 {} {} failed: {}",
        action,
        key,
        DisplayErrorContext(e)
    ))
}

/// State documents are written pretty-printed, like the other backends.
fn json_body(value: &serde_json::Value) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}

fn to_chrono(time: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}

#[async_trait]
impl ArtifactStore for S3Store {
    fn name(&self) -> &str {
        "s3"
    }

    async fn get_json(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let missing = e
                    .as_service_error()
                    .map(|service| service.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    debug!(key, "No such key");
                    return Ok(None);
                }
                return Err(s3_error("GetObject", key, e));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| s3_error("read body of", key, e))?
            .into_bytes();
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::StoreUnavailable(format!("{} is not JSON: {}", key, e)))
    }

    async fn put_json(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.put_blob(key, json_body(value)?, "application/json").await
    }

    async fn put_blob(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| s3_error("PutObject", key, e))?;
        debug!(bucket = %self.bucket, key, size, "Uploaded object");
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| s3_error("ListObjectsV2", prefix, e))?;

            for object in page.contents() {
                if let Some(key) = object.key() {
                    objects.push(ObjectSummary {
                        key: key.to_string(),
                        last_modified: object.last_modified().and_then(to_chrono),
                    });
                }
            }

            match page.next_continuation_token() {
                Some(token) if page.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(objects)
    }

    async fn signed_read_url(&self, key: &str, ttl: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| Error::StoreUnavailable(format!("Invalid expiry for {}: {}", key, e)))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| s3_error("presign", key, e))?;
        Ok(request.uri().to_string())
    }
}
