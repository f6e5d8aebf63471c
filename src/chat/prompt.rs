//! System prompt handling

use super::types::{ChatMessage, Role};

/// Instruction prepended to conversations that carry no system message
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful, friendly assistant. Provide concise and accurate responses.";

/// Prepend [`DEFAULT_SYSTEM_PROMPT`] unless a system message is already present.
///
/// A system message anywhere in the list counts; the rest of the sequence keeps
/// its order. Returns `true` when a message was inserted.
pub fn ensure_system_prompt(messages: &mut Vec<ChatMessage>) -> bool {
    if messages.iter().any(|m| m.role == Role::System) {
        return false;
    }
    messages.insert(0, ChatMessage::system(DEFAULT_SYSTEM_PROMPT));
    true
}
