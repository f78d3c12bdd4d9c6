use std::path::Path;

use async_trait::async_trait;
use nv_core::{Article, Error, NewsSource, Result};

use super::utils;

/// Serves a fixed list of articles, for offline runs.
#[derive(Debug, Clone, Default)]
pub struct FixedNewsSource {
    articles: Vec<Article>,
}

impl FixedNewsSource {
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    /// Load a JSON array of `{url, title, metadata?}` objects.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let articles: Vec<Article> = serde_json::from_str(&raw)?;
        Ok(Self::new(articles))
    }
}

#[async_trait]
impl NewsSource for FixedNewsSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch_candidates(&self, _query: &str, page_size: usize) -> Result<Vec<Article>> {
        let batch = utils::usable_batch(self.articles.iter().cloned(), page_size);
        if batch.is_empty() {
            return Err(Error::UpstreamUnavailable("fixed source has no articles".to_string()));
        }
        Ok(batch)
    }
}
