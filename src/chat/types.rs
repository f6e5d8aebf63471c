//! Chat types: conversation messages and wire payloads shared by the relay and the client

use serde::{Deserialize, Serialize};

/// Role of a message author in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Request body for `POST /api/chat` and client → server WebSocket frames
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Full conversation history, oldest first
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Parse a request payload leniently.
    ///
    /// Absent, empty or malformed bodies are treated as an empty conversation
    /// rather than a hard failure.
    pub fn from_slice_lenient(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable chat payload, using empty message list");
                Self::default()
            }
        }
    }
}

/// Server → client WebSocket frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

impl ChatReply {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}
