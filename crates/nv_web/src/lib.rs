use std::net::SocketAddr;

use axum::Router;
use tracing::info;

pub mod handlers;
pub mod routes;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    routes::api_routes().with_state(state)
}

/// Bind `addr` and serve the API until the process exits.
pub async fn serve(state: AppState, addr: SocketAddr) -> nv_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use nv_core::{Error, Result};
}
