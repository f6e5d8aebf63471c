//! Chat module: conversation types and system prompt handling
//!
//! Shared by the relay handlers (server side) and the terminal client.

pub mod config;
pub mod prompt;
pub mod types;

pub use config::ChatConfig;
pub use prompt::{ensure_system_prompt, DEFAULT_SYSTEM_PROMPT};
pub use types::{ChatMessage, ChatReply, ChatRequest, Role};
