//! In-crate fakes for the collaborator traits.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::models::{ImageSource, NewsSource};
use crate::storage::ArtifactStore;
use crate::types::{Article, ObjectSummary};
use crate::{Error, Result};

pub struct FakeNews {
    pub articles: Vec<Article>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeNews {
    pub fn with(ids: &[&str]) -> Self {
        Self {
            articles: ids
                .iter()
                .map(|id| Article::new(*id, format!("Title {}", id)))
                .collect(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsSource for FakeNews {
    fn name(&self) -> &str {
        "fake-news"
    }

    async fn fetch_candidates(&self, _query: &str, page_size: usize) -> Result<Vec<Article>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::UpstreamUnavailable("feed is down".to_string()));
        }
        Ok(self.articles.iter().take(page_size).cloned().collect())
    }
}

pub struct FakeImages {
    pub output: Option<Vec<u8>>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeImages {
    pub fn ok() -> Self {
        Self {
            output: Some(b"\x89PNG fake".to_vec()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            output: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageSource for FakeImages {
    fn name(&self) -> &str {
        "fake-images"
    }

    async fn render(&self, prompt: &str) -> Result<Vec<u8>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.output
            .clone()
            .ok_or_else(|| Error::GenerationFailed("no output".to_string()))
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
    pub fail_reads: bool,
    pub fail_blobs: bool,
    pub fail_signing: bool,
    pub writes: AtomicUsize,
}

impl FakeStore {
    pub fn with_json(key: &str, value: serde_json::Value) -> Self {
        let store = Self::default();
        store.objects.lock().unwrap().insert(
            key.to_string(),
            (serde_json::to_vec(&value).unwrap(), "application/json".to_string()),
        );
        store
    }

    pub fn insert_blob(&self, key: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (vec![1, 2, 3], "image/png".to_string()));
    }

    pub fn json(&self, key: &str) -> Option<serde_json::Value> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(bytes, _)| serde_json::from_slice(bytes).unwrap())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactStore for FakeStore {
    fn name(&self) -> &str {
        "fake-store"
    }

    async fn get_json(&self, key: &str) -> Result<Option<serde_json::Value>> {
        if self.fail_reads {
            return Err(Error::StoreUnavailable("read refused".to_string()));
        }
        Ok(self.json(key))
    }

    async fn put_json(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(
            key.to_string(),
            (serde_json::to_vec(value)?, "application/json".to_string()),
        );
        Ok(())
    }

    async fn put_blob(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        if self.fail_blobs {
            return Err(Error::StoreUnavailable("write refused".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        if self.fail_reads {
            return Err(Error::StoreUnavailable("list refused".to_string()));
        }
        let modified = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        Ok(self
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .map(|key| ObjectSummary {
                key,
                last_modified: Some(modified),
            })
            .collect())
    }

    async fn signed_read_url(&self, key: &str, ttl: Duration) -> Result<String> {
        if self.fail_signing {
            return Err(Error::StoreUnavailable("signing refused".to_string()));
        }
        Ok(format!("https://signed.example/{}?ttl={}", key, ttl.as_secs()))
    }
}
