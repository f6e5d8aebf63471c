//! Chat client: session state, rendering seam and the reconnecting connection driver

pub mod connection;
pub mod session;
pub mod view;

pub use connection::{ChatClient, RECONNECT_DELAY};
pub use session::{
    ClientSession, ConnectionState, Conversation, FrameSink, SendOutcome, SkipReason,
    SEND_ERROR_MESSAGE,
};
pub use view::{ChatView, TerminalView};

/// Client-side failures
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connection is closed")]
    ConnectionClosed,
    #[error("failed to encode chat frame: {0}")]
    Encode(#[from] serde_json::Error),
}
