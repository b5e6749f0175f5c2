//! REST API over [`StartupAnalyst`].

pub mod dto;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::analyst::StartupAnalyst;
use crate::error::Result;

pub use handlers::{ApiError, AppState};

pub fn router(analyst: Arc<StartupAnalyst>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/analyze", post(handlers::analyze))
        .route("/analyses", get(handlers::list_analyses))
        .route("/analyses/{id}", get(handlers::get_analysis))
        .route("/pitch-deck", post(handlers::pitch_deck))
        .route("/validate-business-model", post(handlers::validate_business_model))
        .route("/export", post(handlers::export))
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(analyst))
}

/// Serves until Ctrl-C.
pub async fn serve(analyst: Arc<StartupAnalyst>, host: &str, port: u16) -> Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(analyst))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}
