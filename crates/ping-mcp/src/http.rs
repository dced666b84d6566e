//! Optional HTTP transport.
//!
//! Implements:
//! - POST /mcp - JSON-RPC request in, JSON-RPC response out
//! - GET /health - Health check endpoint
//!
//! Disabled unless the operator passes `--http --i-understand-the-risks`;
//! stdio is the default transport and the HTTP listener binds to loopback
//! unless told otherwise.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::McpServer;

/// Health check response body.
#[derive(Serialize)]
struct HealthResponse {
    healthy: bool,
    version: &'static str,
}

/// GET /health
async fn health_handler() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /mcp - one JSON-RPC message per request.
///
/// Notifications are accepted and produce `202 Accepted` with an empty body.
async fn mcp_handler(State(server): State<McpServer>, body: String) -> Response {
    let msg: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({"error": format!("invalid JSON-RPC body: {e}")})),
            )
                .into_response();
        }
    };

    match server.handle_message(msg).await {
        Some(response) => axum::Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Build the router so tests can drive it without binding a socket.
pub fn router(server: McpServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/mcp", post(mcp_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Serve the HTTP transport until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(server: McpServer, host: &str, port: u16) -> anyhow::Result<()> {
    let app = router(server);

    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        tracing::info!("received Ctrl+C, initiating shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
        tracing::info!("received SIGTERM, initiating shutdown");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
