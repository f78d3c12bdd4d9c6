//! NewsAPI source
//!
//! Uses the `everything` endpoint: https://newsapi.org/docs/endpoints/everything

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use nv_core::{Article, Error, NewsSource, Result};

use super::utils;

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(rename = "totalResults")]
    total_results: Option<u32>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    source: Option<NewsApiArticleSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticleSource {
    name: Option<String>,
}

impl From<NewsApiArticle> for Article {
    fn from(raw: NewsApiArticle) -> Self {
        let mut article = Article::new(raw.url.unwrap_or_default(), raw.title.unwrap_or_default());
        let fields = [
            ("source", raw.source.and_then(|s| s.name)),
            ("author", raw.author),
            ("description", raw.description),
            ("publishedAt", raw.published_at),
            ("imageUrl", raw.url_to_image),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                article = article.with_metadata(key, value);
            }
        }
        article
    }
}

pub struct NewsApiSource {
    client: Client,
    api_key: String,
    base_url: String,
    sort_by: String,
}

impl NewsApiSource {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            sort_by: "relevancy".to_string(),
        }
    }

    pub fn with_sort_by(mut self, sort_by: &str) -> Self {
        self.sort_by = sort_by.to_string();
        self
    }

    fn everything_url(&self, query: &str, page_size: usize) -> Result<Url> {
        Url::parse_with_params(
            &format!("{}/v2/everything", self.base_url),
            &[
                ("q", query),
                ("sortBy", self.sort_by.as_str()),
                ("pageSize", page_size.to_string().as_str()),
                ("apiKey", self.api_key.as_str()),
            ],
        )
        .map_err(|e| Error::Config(format!("Invalid NewsAPI URL {}: {}", self.base_url, e)))
    }
}

impl fmt::Debug for NewsApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiSource")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("sort_by", &self.sort_by)
            .finish()
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn fetch_candidates(&self, query: &str, page_size: usize) -> Result<Vec<Article>> {
        let url = self.everything_url(query, page_size)?;
        debug!(%query, page_size, "Requesting NewsAPI");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("NewsAPI request failed: {}", e)))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("NewsAPI body unreadable: {}", e)))?;

        let parsed: NewsApiResponse = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                Error::UpstreamUnavailable(format!("Invalid NewsAPI response: {}", e))
            } else {
                Error::UpstreamUnavailable(format!("NewsAPI returned {}", status))
            }
        })?;

        if parsed.status != "ok" {
            warn!(%status, code = ?parsed.code, "NewsAPI reported an error");
            return Err(Error::UpstreamUnavailable(format!(
                "NewsAPI error {}: {}",
                parsed.code.unwrap_or_else(|| "unknown".to_string()),
                parsed.message.unwrap_or_else(|| "no message".to_string())
            )));
        }

        let received = parsed.articles.len();
        let articles = utils::usable_batch(parsed.articles.into_iter().map(Article::from), page_size);
        debug!(
            total_results = ?parsed.total_results,
            received,
            usable = articles.len(),
            "NewsAPI answered"
        );

        if articles.is_empty() {
            return Err(Error::UpstreamUnavailable(format!(
                "No articles found for {:?}",
                query
            )));
        }
        Ok(articles)
    }
}
