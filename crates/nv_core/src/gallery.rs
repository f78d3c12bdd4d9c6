//! Read side: stored images with signed URLs and their decoded titles.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::DEFAULT_IMAGE_PREFIX;
use crate::keys::{decode_title, is_image_key, split_artifact_key};
use crate::storage::ArtifactStore;
use crate::types::ObjectSummary;
use crate::Result;

#[derive(Debug, Clone)]
pub struct GallerySettings {
    pub image_prefix: String,
    pub signed_url_ttl: Duration,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            signed_url_ttl: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    pub key: String,
    pub url: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub title: String,
}

pub struct Gallery {
    store: Arc<dyn ArtifactStore>,
    settings: GallerySettings,
}

impl Gallery {
    pub fn new(store: Arc<dyn ArtifactStore>, settings: GallerySettings) -> Self {
        Self { store, settings }
    }

    pub async fn list_images(&self) -> Result<Vec<ImageEntry>> {
        let prefix = &self.settings.image_prefix;
        let listing = self
            .store
            .list(&format!("{}/", prefix.trim_end_matches('/')))
            .await?;
        debug!(objects = listing.len(), "Listed stored objects");

        let images = listing
            .into_iter()
            .filter(|object| is_image_key(prefix, &object.key))
            .map(|object| self.entry(object));

        try_join_all(images).await
    }

    async fn entry(&self, object: ObjectSummary) -> Result<ImageEntry> {
        let url = self
            .store
            .signed_read_url(&object.key, self.settings.signed_url_ttl)
            .await?;
        let title = title_from_key(&self.settings.image_prefix, &object.key);

        Ok(ImageEntry {
            key: object.key,
            url,
            last_modified: object.last_modified,
            title,
        })
    }
}

/// Decoded title, or the raw encoded text when it does not decode.
fn title_from_key(prefix: &str, key: &str) -> String {
    match split_artifact_key(prefix, key) {
        Ok((_, encoded)) => decode_title(encoded).unwrap_or_else(|e| {
            warn!(%key, error = %e, "Could not decode title");
            encoded.to_string()
        }),
        Err(e) => {
            warn!(%key, error = %e, "Unexpected image key");
            String::new()
        }
    }
}
