use std::net::SocketAddr;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

async fn root() -> &'static str {
    "🤖 Discord bot is running."
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Serve the liveness endpoints until the process exits. Errors are logged,
/// never propagated: the bot keeps running without its web listener.
pub async fn serve(port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, "Failed to bind liveness server: {}", e);
            return;
        }
    };

    tracing::info!(%addr, "🌐 Web server running");
    if let Err(e) = axum::serve(listener, router()).await {
        tracing::error!("Liveness server stopped: {}", e);
    }
}
