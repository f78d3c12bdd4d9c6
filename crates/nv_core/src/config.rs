//! Process configuration, read from the environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::gallery::GallerySettings;
use crate::generator::GeneratorSettings;
use crate::{Error, Result};

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org";
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_STATE_KEY: &str = "generated_articles.json";
pub const DEFAULT_IMAGE_PREFIX: &str = "images";

#[derive(Clone)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub query: String,
    pub page_size: usize,
    pub sort_by: String,
    /// JSON file of articles served by the `fixed` source.
    pub fixture_path: Option<PathBuf>,
}

impl fmt::Debug for NewsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsConfig")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("query", &self.query)
            .field("page_size", &self.page_size)
            .field("sort_by", &self.sort_by)
            .field("fixture_path", &self.fixture_path)
            .finish()
    }
}

#[derive(Clone)]
pub struct ImageConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub size: String,
    pub styles_enabled: bool,
}

impl fmt::Debug for ImageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageConfig")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("size", &self.size)
            .field("styles_enabled", &self.styles_enabled)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub news: NewsConfig,
    pub image: ImageConfig,
    pub store: StoreConfig,
    pub state_key: String,
    pub image_prefix: String,
    pub signed_url_ttl: Duration,
}

impl Config {
    /// Load from the process environment, after reading a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let news = NewsConfig {
            api_key: var("NEWS_API_KEY"),
            base_url: var("NEWS_API_URL").unwrap_or_else(|| DEFAULT_NEWS_API_URL.to_string()),
            query: var("NEWS_QUERY").unwrap_or_else(|| "France".to_string()),
            page_size: parse(&var, "NEWS_PAGE_SIZE", 10)?,
            sort_by: var("NEWS_SORT_BY").unwrap_or_else(|| "relevancy".to_string()),
            fixture_path: var("NEWS_FIXTURE_PATH").map(PathBuf::from),
        };
        if news.page_size == 0 {
            return Err(Error::Config("NEWS_PAGE_SIZE must be at least 1".to_string()));
        }

        let image = ImageConfig {
            api_key: var("OPENAI_API_KEY"),
            base_url: var("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
            model: var("IMAGE_MODEL").unwrap_or_else(|| "dall-e-3".to_string()),
            size: var("IMAGE_SIZE").unwrap_or_else(|| "1024x1024".to_string()),
            styles_enabled: parse(&var, "IMAGE_STYLES", true)?,
        };

        let store = StoreConfig {
            bucket: var("BUCKET_NAME"),
            region: var("AWS_REGION"),
            root: var("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
        };

        Ok(Self {
            news,
            image,
            store,
            state_key: var("STATE_KEY").unwrap_or_else(|| DEFAULT_STATE_KEY.to_string()),
            image_prefix: var("IMAGE_PREFIX").unwrap_or_else(|| DEFAULT_IMAGE_PREFIX.to_string()),
            signed_url_ttl: Duration::from_secs(parse(&var, "SIGNED_URL_TTL_SECS", 3600)?),
        })
    }

    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            query: self.news.query.clone(),
            page_size: self.news.page_size,
            state_key: self.state_key.clone(),
            image_prefix: self.image_prefix.clone(),
            styles_enabled: self.image.styles_enabled,
        }
    }

    pub fn gallery_settings(&self) -> GallerySettings {
        GallerySettings {
            image_prefix: self.image_prefix.clone(),
            signed_url_ttl: self.signed_url_ttl,
        }
    }
}

/// Unwrap a setting a backend cannot run without.
pub fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| Error::Config(format!("{} is not set", name)))
}

fn parse<T, F>(var: &F, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("invalid {} {:?}: {}", name, raw, e))),
        None => Ok(default),
    }
}
