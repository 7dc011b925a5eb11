//! Recommendation HTTP API
//!
//! - `GET /health` reports liveness and the number of indexed items
//! - `POST /recommend` ranks catalog items against a free-text query

mod error;
mod handlers;

pub use error::{ApiError, ApiResult};
pub use handlers::{RecommendRequest, RecommendResponse};

use crate::config::ServerConfig;
use crate::recommend::Recommender;
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    /// Result count used when a request omits `top_k`
    pub default_top_k: usize,
}

/// Builds the API router with tracing and, if enabled, permissive CORS
pub fn build_router(recommender: Recommender, config: &ServerConfig) -> Router {
    let state = AppState {
        recommender: Arc::new(recommender),
        default_top_k: config.default_top_k,
    };

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/recommend", post(handlers::recommend))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Serves the API until Ctrl-C
pub async fn serve(recommender: Recommender, config: &ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {}", config.listen_addr))?;

    info!(
        "Serving recommendations for {} catalog items on {}",
        recommender.len(),
        addr
    );
    let app = build_router(recommender, config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
