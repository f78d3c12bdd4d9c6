use std::fmt;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use nv_core::config::DEFAULT_OPENAI_API_URL;
use nv_core::{Error, ImageSource, Result};

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    b64_json: Option<String>,
    url: Option<String>,
    revised_prompt: Option<String>,
}

/// OpenAI image generation (`/images/generations`).
pub struct OpenAiImageModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    size: String,
}

impl OpenAiImageModel {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: DEFAULT_OPENAI_API_URL.to_string(),
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_size(mut self, size: &str) -> Self {
        self.size = size.to_string();
        self
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::GenerationFailed(format!("Image download failed: {}", e)))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::GenerationFailed(format!("Image download failed: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

impl fmt::Debug for OpenAiImageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiImageModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("size", &self.size)
            .finish()
    }
}

#[async_trait]
impl ImageSource for OpenAiImageModel {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn render(&self, prompt: &str) -> Result<Vec<u8>> {
        let request = ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
        };
        debug!(model = %self.model, size = %self.size, "OpenAI image request");

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::GenerationFailed(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::GenerationFailed(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let body: ImageResponse = response
            .json()
            .await
            .map_err(|e| Error::GenerationFailed(format!("Invalid OpenAI response: {}", e)))?;

        let image = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::GenerationFailed("OpenAI returned no image".to_string()))?;
        if let Some(revised) = &image.revised_prompt {
            debug!(%revised, "OpenAI revised the prompt");
        }

        match (image.b64_json, image.url) {
            (Some(encoded), _) => STANDARD
                .decode(encoded.trim())
                .map_err(|e| Error::GenerationFailed(format!("Invalid image payload: {}", e))),
            (None, Some(url)) => self.download(&url).await,
            (None, None) => Err(Error::GenerationFailed(
                "OpenAI image has neither data nor URL".to_string(),
            )),
        }
    }
}
