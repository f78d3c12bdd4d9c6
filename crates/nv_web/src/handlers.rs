use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use nv_core::GenerationOutcome;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use crate::AppState;

pub const GENERATED_MESSAGE: &str = "Image generated and stored";
pub const RESET_MESSAGE: &str = "Every article was already processed, list reset";
pub const FAILED_MESSAGE: &str = "Image generation failed";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedResponse {
    message: &'static str,
    image_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<String>,
    article_title: String,
    article_url: String,
}

pub async fn list_images(State(state): State<AppState>) -> impl IntoResponse {
    match state.gallery.list_images().await {
        Ok(images) => (StatusCode::OK, Json(json!({ "images": images }))),
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Listing images failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

pub async fn generate(State(state): State<AppState>) -> impl IntoResponse {
    let mut rng = StdRng::from_entropy();
    match state.generator.run(&mut rng).await {
        Ok(GenerationOutcome::Generated {
            image_key,
            style,
            article_title,
            article_url,
        }) => {
            info!(%image_key, "Generation succeeded");
            let body = GeneratedResponse {
                message: GENERATED_MESSAGE,
                image_key,
                style,
                article_title,
                article_url,
            };
            (StatusCode::OK, Json(json!(body)))
        }
        Ok(GenerationOutcome::Reset { cleared }) => {
            info!(cleared, "Processed list reset");
            (StatusCode::OK, Json(json!({ "message": RESET_MESSAGE })))
        }
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": FAILED_MESSAGE, "error": e.to_string() })),
            )
        }
    }
}
