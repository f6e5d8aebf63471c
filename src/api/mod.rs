//! HTTP and WebSocket API for the chat relay

pub mod chat_handlers;
pub mod embedded_frontend;
pub mod handlers;
pub mod routes;
pub mod ws_chat_handler;

pub use handlers::{AppError, RelayState, ServerState};
pub use routes::create_router;
