//! Server setup and configuration.

use axum::{routing::{get, post}, Router};
use tower_http::cors::CorsLayer;

use crate::api;
use crate::health;
use crate::state::AppState;

/// Build the diabetest router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/predict", post(api::predict).fallback(api::method_not_allowed))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server on the given address and run until Ctrl-C.
pub async fn serve_with_state(addr: &str, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("diabetest inference server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
