//! API route definitions

use super::chat_handlers;
use super::embedded_frontend;
use super::handlers::{self, RelayState};
use super::ws_chat_handler;
use axum::{
    routing::{any, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the relay router
///
/// - `/ws` (any method) → WebSocket chat
/// - `POST /api/chat` → streamed HTTP chat (other methods get 405)
/// - any other `/api/...` path → 404
/// - everything else → static assets looked up by path
pub fn create_router(state: RelayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/ws", any(ws_chat_handler::ws_chat))
        .route("/api/chat", post(chat_handlers::chat))
        .route("/api/", any(handlers::api_not_found))
        .route("/api/{*rest}", any(handlers::api_not_found));

    // Static assets
    let router = if !state.serve_frontend {
        router
    } else if let Some(ref path) = state.frontend_path {
        router.fallback_service(ServeDir::new(path))
    } else {
        router.fallback(embedded_frontend::serve_embedded)
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
