//! Client session state: conversation history, connection state and the in-flight guard

use super::view::ChatView;
use super::ClientError;
use crate::chat::{ChatMessage, ChatRequest, Role};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Shown locally when a message could not be handed to the connection
pub const SEND_ERROR_MESSAGE: &str = "Sorry, there was an error sending your message.";

/// Lifecycle of the client's socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Ordered chat history, kept in memory for the session's lifetime
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Synchronous outbound frame channel
pub trait FrameSink {
    fn send_frame(&mut self, frame: String) -> Result<(), ClientError>;
}

impl FrameSink for mpsc::UnboundedSender<String> {
    fn send_frame(&mut self, frame: String) -> Result<(), ClientError> {
        self.send(frame).map_err(|_| ClientError::ConnectionClosed)
    }
}

/// Why a send request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyInput,
    InFlight,
    NotConnected,
}

/// Result of [`ClientSession::send_message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Skipped(SkipReason),
    /// The frame could not be handed off; an apology was shown locally
    Failed,
}

/// State of one chat client
///
/// Owned by the controller driving the connection; views and sinks are passed
/// in by reference on every call.
#[derive(Debug)]
pub struct ClientSession {
    connection: ConnectionState,
    conversation: Conversation,
    is_processing: bool,
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSession {
    pub fn new() -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            conversation: Conversation::default(),
            is_processing: false,
        }
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    /// Record a connection transition.
    ///
    /// Leaving `Connected` drops any in-flight turn: its reply can never arrive
    /// on a new socket.
    pub fn set_connection(&mut self, state: ConnectionState, view: &mut impl ChatView) {
        if self.connection == ConnectionState::Connected
            && state != ConnectionState::Connected
            && self.is_processing
        {
            self.is_processing = false;
            view.set_typing(false);
            view.set_input_enabled(true);
        }
        self.connection = state;
        view.connection_changed(state);
    }

    /// Send the whole conversation plus the new user message.
    ///
    /// No-op for blank input, while a reply is pending, or when not connected.
    pub fn send_message(
        &mut self,
        input: &str,
        sink: &mut impl FrameSink,
        view: &mut impl ChatView,
    ) -> SendOutcome {
        let text = input.trim();
        if text.is_empty() {
            return SendOutcome::Skipped(SkipReason::EmptyInput);
        }
        if self.is_processing {
            return SendOutcome::Skipped(SkipReason::InFlight);
        }
        if self.connection != ConnectionState::Connected {
            return SendOutcome::Skipped(SkipReason::NotConnected);
        }

        self.is_processing = true;
        view.set_input_enabled(false);
        self.conversation.push(ChatMessage::user(text));
        view.append_message(Role::User, text);
        view.clear_input();
        view.set_typing(true);

        let result = serde_json::to_string(&ChatRequest {
            messages: self.conversation.messages().to_vec(),
        })
        .map_err(ClientError::from)
        .and_then(|frame| sink.send_frame(frame));

        match result {
            Ok(()) => {
                debug!(messages = self.conversation.len(), "Sent conversation");
                SendOutcome::Sent
            }
            Err(e) => {
                warn!(error = %e, "Failed to send message");
                view.set_typing(false);
                view.append_message(Role::Assistant, SEND_ERROR_MESSAGE);
                self.is_processing = false;
                view.set_input_enabled(true);
                SendOutcome::Failed
            }
        }
    }

    /// Handle a server text frame.
    ///
    /// A `response` field is rendered and appended to the history. Whatever the
    /// frame holds, the typing indicator is cleared and input re-enabled.
    pub fn handle_frame(&mut self, frame: &str, view: &mut impl ChatView) -> Option<String> {
        let reply = match serde_json::from_str::<serde_json::Value>(frame) {
            Ok(value) => value.get("response").map(|r| match r {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed server frame");
                None
            }
        };

        if let Some(ref text) = reply {
            view.append_message(Role::Assistant, text);
            self.conversation.push(ChatMessage::assistant(text.as_str()));
        }

        view.set_typing(false);
        self.is_processing = false;
        view.set_input_enabled(true);
        reply
    }
}
