use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::AppState;

/// Browsers read the gallery from any origin.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::OPTIONS, Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/images", get(handlers::list_images))
        .route("/api/generate", post(handlers::generate))
        .layer(cors())
}
