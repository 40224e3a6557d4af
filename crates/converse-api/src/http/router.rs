//! Axum router configuration with middleware.
//!
//! Middleware: CORS, request tracing.

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        // Chat
        .route("/chat", post(handlers::chat::chat))
        // Durable history (works without a live session)
        .route("/history/{id}", get(handlers::session::get_history))
        // Live sessions
        .route("/session/{id}", get(handlers::session::get_session))
        .route("/session/{id}", delete(handlers::session::delete_session))
        .route("/sessions", get(handlers::session::list_sessions))
        // Model catalog
        .route("/models", get(handlers::models::list_models))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - Service information and endpoint index.
async fn service_info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "service": "converse",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "chat": "POST /chat",
            "history": "GET /history/{session_id}",
            "session": "GET /session/{session_id}",
            "sessions": "GET /sessions",
            "models": "GET /models",
        },
    }))
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "service": "converse",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
