use std::sync::Arc;

use nv_core::config::{require, NewsConfig};
use nv_core::{Error, NewsSource, Result};

pub mod fixed;
pub mod newsapi;

pub use fixed::FixedNewsSource;
pub use newsapi::NewsApiSource;

/// Names accepted by [`create_source`].
pub const SOURCE_NAMES: &[&str] = &["newsapi", "fixed"];

/// Build the news source named `kind` from configuration.
pub fn create_source(kind: &str, config: &NewsConfig) -> Result<Arc<dyn NewsSource>> {
    match kind {
        "newsapi" => {
            let api_key = require(&config.api_key, "NEWS_API_KEY")?;
            let source = NewsApiSource::new(api_key, &config.base_url).with_sort_by(&config.sort_by);
            Ok(Arc::new(source))
        }
        "fixed" => {
            let path = config
                .fixture_path
                .as_ref()
                .ok_or_else(|| Error::Config("NEWS_FIXTURE_PATH is not set".to_string()))?;
            Ok(Arc::new(FixedNewsSource::from_path(path)?))
        }
        other => Err(Error::Config(format!(
            "Unknown news source {:?} (available: {})",
            other,
            SOURCE_NAMES.join(", ")
        ))),
    }
}

/// Common utilities for sources
pub(crate) mod utils {
    use std::collections::HashSet;

    use nv_core::Article;

    /// Titles NewsAPI substitutes for withdrawn articles.
    const REMOVED_MARKER: &str = "[Removed]";

    pub fn is_usable(article: &Article) -> bool {
        !article.url.trim().is_empty()
            && !article.title.trim().is_empty()
            && article.title.trim() != REMOVED_MARKER
    }

    /// Keep the first `limit` usable articles, one per URL.
    pub fn usable_batch(articles: impl IntoIterator<Item = Article>, limit: usize) -> Vec<Article> {
        let mut seen = HashSet::new();
        articles
            .into_iter()
            .filter(is_usable)
            .filter(|article| seen.insert(article.url.clone()))
            .take(limit)
            .collect()
    }
}
