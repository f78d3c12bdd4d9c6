//! The generation entry point: fetch, filter, pick, render, store, record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_IMAGE_PREFIX, DEFAULT_STATE_KEY};
use crate::keys::{artifact_key, IMAGE_CONTENT_TYPE};
use crate::models::{ImageSource, NewsSource};
use crate::prompt::{build_prompt, Style, StyleCatalog};
use crate::rotation::{self, Selection};
use crate::storage::ArtifactStore;
use crate::types::{Article, GeneratedArtifact, ProcessedSet};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub query: String,
    pub page_size: usize,
    pub state_key: String,
    pub image_prefix: String,
    pub styles_enabled: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            query: "France".to_string(),
            page_size: 10,
            state_key: DEFAULT_STATE_KEY.to_string(),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            styles_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Generated {
        image_key: String,
        style: Option<String>,
        article_title: String,
        article_url: String,
    },
    /// Every candidate had been processed; the state was cleared.
    Reset { cleared: usize },
}

pub struct Generator {
    news: Arc<dyn NewsSource>,
    images: Arc<dyn ImageSource>,
    store: Arc<dyn ArtifactStore>,
    styles: StyleCatalog,
    settings: GeneratorSettings,
}

impl Generator {
    pub fn new(
        news: Arc<dyn NewsSource>,
        images: Arc<dyn ImageSource>,
        store: Arc<dyn ArtifactStore>,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            news,
            images,
            store,
            styles: StyleCatalog::default(),
            settings,
        }
    }

    pub fn with_styles(mut self, styles: StyleCatalog) -> Self {
        self.styles = styles;
        self
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Load the processed set, empty when the state document does not exist yet.
    pub async fn load_processed(&self) -> Result<ProcessedSet> {
        match self.store.get_json(&self.settings.state_key).await? {
            Some(value) => serde_json::from_value(value).map_err(|e| {
                Error::StoreUnavailable(format!(
                    "state document {} is malformed: {}",
                    self.settings.state_key, e
                ))
            }),
            None => {
                debug!(key = %self.settings.state_key, "No state document yet, starting empty");
                Ok(ProcessedSet::new())
            }
        }
    }

    pub async fn save_processed(&self, processed: &ProcessedSet) -> Result<()> {
        let value = serde_json::to_value(processed)?;
        self.store.put_json(&self.settings.state_key, &value).await
    }

    pub async fn run<R>(&self, rng: &mut R) -> Result<GenerationOutcome>
    where
        R: Rng + Send,
    {
        self.run_at(Utc::now(), rng).await
    }

    /// One invocation, with `now` used for the artifact key.
    pub async fn run_at<R>(&self, now: DateTime<Utc>, rng: &mut R) -> Result<GenerationOutcome>
    where
        R: Rng + Send,
    {
        let processed = self.load_processed().await?;
        info!(processed = processed.len(), "Loaded processed articles");

        let candidates = self
            .news
            .fetch_candidates(&self.settings.query, self.settings.page_size)
            .await?;
        if candidates.is_empty() {
            return Err(Error::UpstreamUnavailable(format!(
                "{} returned no articles",
                self.news.name()
            )));
        }
        info!(source = self.news.name(), candidates = candidates.len(), "Fetched candidates");

        let article = match rotation::select_next(&candidates, &processed, rng) {
            Selection::Next(article) => article.clone(),
            Selection::Exhausted => {
                let cleared = processed.len();
                info!(cleared, "All candidates already processed, resetting");
                self.save_processed(&rotation::reset()).await?;
                return Ok(GenerationOutcome::Reset { cleared });
            }
        };

        let style = if self.settings.styles_enabled {
            self.styles.choose(rng)
        } else {
            None
        };

        let artifact = self.render(&article, style, now).await?;

        self.store
            .put_blob(&artifact.key, artifact.bytes, artifact.content_type)
            .await?;
        info!(key = %artifact.key, "Stored generated image");

        let processed = rotation::record_processed(processed, &article)?;
        if let Err(e) = self.save_processed(&processed).await {
            warn!(key = %artifact.key, error = %e, "Image stored but state update failed");
            return Err(e);
        }

        Ok(GenerationOutcome::Generated {
            image_key: artifact.key,
            style: artifact.style,
            article_title: article.title,
            article_url: article.url,
        })
    }

    async fn render(
        &self,
        article: &Article,
        style: Option<Style>,
        now: DateTime<Utc>,
    ) -> Result<GeneratedArtifact> {
        let prompt = build_prompt(&article.title, style.as_ref());
        info!(
            article = %article.url,
            model = self.images.name(),
            style = style.map(|s| s.name).unwrap_or("none"),
            "Generating image"
        );
        debug!(%prompt, "Image prompt");

        let bytes = self.images.render(&prompt).await?;
        if bytes.is_empty() {
            return Err(Error::GenerationFailed(format!(
                "{} returned an empty image",
                self.images.name()
            )));
        }

        Ok(GeneratedArtifact {
            key: artifact_key(&self.settings.image_prefix, now, &article.title),
            bytes,
            content_type: IMAGE_CONTENT_TYPE,
            style: style.map(|s| s.name.to_string()),
        })
    }
}
