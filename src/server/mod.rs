//! HTTP server for the generation API

pub mod routes;
pub mod state;

pub use state::ServerAppState;

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Build the application router
pub fn build_router(state: ServerAppState) -> Router {
    // Permissive CORS with explicit headers, so browsers don't warn about
    // wildcard header allowances
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    Router::new()
        .route(
            "/generate",
            get(routes::list_handler).post(routes::generate_handler),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until ctrl-c
pub async fn run_server(port: u16, bind: &str, state: ServerAppState) -> Result<(), String> {
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Server listening on http://{}", addr);
    log::info!("Endpoints: POST /generate, GET /generate?userId=, GET /health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!("Shutdown signal received, stopping server...");
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}
