use std::sync::Arc;

use nv_core::config::{require, ImageConfig};
use nv_core::{Error, ImageSource, Result};

pub mod dummy;
pub mod openai;

pub const MODEL_NAMES: &[&str] = &["openai", "dummy"];

pub fn create_model(kind: &str, config: &ImageConfig) -> Result<Arc<dyn ImageSource>> {
    match kind {
        "openai" => {
            let api_key = require(&config.api_key, "OPENAI_API_KEY")?;
            let model = openai::OpenAiImageModel::new(api_key)
                .with_base_url(&config.base_url)
                .with_model(&config.model)
                .with_size(&config.size);
            Ok(Arc::new(model))
        }
        "dummy" => Ok(Arc::new(dummy::DummyImageModel)),
        other => Err(Error::Config(format!(
            "Unknown image model {:?} (available: {})",
            other,
            MODEL_NAMES.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> ImageConfig {
        ImageConfig {
            api_key: api_key.map(str::to_string),
            base_url: "http://localhost:1".to_string(),
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
            styles_enabled: true,
        }
    }

    #[test]
    fn test_openai_requires_api_key() {
        let err = create_model("openai", &config(None)).err().unwrap();
        assert_eq!(err.to_string(), "Configuration error: OPENAI_API_KEY is not set");
        assert_eq!(create_model("openai", &config(Some("k"))).unwrap().name(), "OpenAI");
    }

    #[test]
    fn test_dummy_needs_nothing() {
        assert_eq!(create_model("dummy", &config(None)).unwrap().name(), "Dummy");
    }

    #[test]
    fn test_unknown_model() {
        assert!(matches!(create_model("midjourney", &config(None)), Err(Error::Config(_))));
    }
}
