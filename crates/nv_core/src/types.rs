use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate article as served by a news source. The URL is its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Article {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.url
    }
}

/// Identifiers of articles already rendered, in the order they were recorded.
///
/// Serialized as a flat JSON array. Duplicates in a loaded document are
/// dropped, keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ProcessedSet {
    ids: Vec<String>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }

    /// Callers must have checked `contains` first.
    pub(crate) fn push(&mut self, id: String) {
        debug_assert!(!self.contains(&id));
        self.ids.push(id);
    }
}

impl From<Vec<String>> for ProcessedSet {
    fn from(ids: Vec<String>) -> Self {
        let mut seen = HashSet::with_capacity(ids.len());
        let ids = ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        Self { ids }
    }
}

impl From<ProcessedSet> for Vec<String> {
    fn from(set: ProcessedSet) -> Self {
        set.ids
    }
}

/// An image produced for one article, ready to be written to the store.
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    pub key: String,
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub style: Option<String>,
}

/// One entry of a store listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
}
