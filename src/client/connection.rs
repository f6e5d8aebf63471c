//! Connection driver: connect, relay frames, reconnect after a fixed delay

use super::session::{ClientSession, ConnectionState, FrameSink};
use super::view::ChatView;
use super::ClientError;
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, info, warn};

/// Fixed delay before every reconnect attempt
pub const RECONNECT_DELAY: Duration = Duration::from_millis(2000);

/// Sink used while no socket is open; the session never reaches it because it
/// skips sends when not connected.
struct Offline;

impl FrameSink for Offline {
    fn send_frame(&mut self, _frame: String) -> Result<(), ClientError> {
        Err(ClientError::ConnectionClosed)
    }
}

/// Terminal-agnostic chat client
///
/// Reconnects forever with a constant delay; there is no backoff growth and
/// no retry limit.
pub struct ChatClient {
    url: String,
    reconnect_delay: Duration,
    session: ClientSession,
}

impl ChatClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay: RECONNECT_DELAY,
            session: ClientSession::new(),
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Drive the session until `input` closes.
    ///
    /// Each received line is a send attempt. Lines arriving while not
    /// connected are dropped by the session's send guard.
    pub async fn run(
        &mut self,
        input: &mut mpsc::UnboundedReceiver<String>,
        view: &mut impl ChatView,
    ) -> Result<(), ClientError> {
        loop {
            self.session.set_connection(ConnectionState::Connecting, view);

            let url = self.url.clone();
            let Some(connected) = self.while_offline(connect_async(url), input, view).await else {
                return Ok(());
            };

            match connected {
                Ok((ws_stream, _)) => {
                    info!(url = %self.url, "Connected to chat relay");
                    self.session.set_connection(ConnectionState::Connected, view);
                    let input_closed = self.serve_connection(ws_stream, input, view).await;
                    self.session.set_connection(ConnectionState::Disconnected, view);
                    if input_closed {
                        return Ok(());
                    }
                }
                Err(e) => {
                    warn!(url = %self.url, error = %e, "Failed to connect to chat relay");
                    self.session.set_connection(ConnectionState::Disconnected, view);
                }
            }

            debug!(delay_ms = self.reconnect_delay.as_millis() as u64, "Reconnecting");
            let delay = tokio::time::sleep(self.reconnect_delay);
            if self.while_offline(delay, input, view).await.is_none() {
                return Ok(());
            }
        }
    }

    /// Await `fut` while still consuming input lines. `None` if input closed first.
    async fn while_offline<F: Future>(
        &mut self,
        fut: F,
        input: &mut mpsc::UnboundedReceiver<String>,
        view: &mut impl ChatView,
    ) -> Option<F::Output> {
        tokio::pin!(fut);
        loop {
            tokio::select! {
                output = &mut fut => return Some(output),
                line = input.recv() => match line {
                    Some(line) => {
                        self.session.send_message(&line, &mut Offline, view);
                    }
                    None => return None,
                },
            }
        }
    }

    /// Relay frames over one open socket. Returns `true` when input closed.
    async fn serve_connection<S>(
        &mut self,
        ws_stream: S,
        input: &mut mpsc::UnboundedReceiver<String>,
        view: &mut impl ChatView,
    ) -> bool
    where
        S: futures::Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>>
            + futures::Sink<WsMessage, Error = tokio_tungstenite::tungstenite::Error>
            + Send
            + 'static,
    {
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        // Writer task: makes the session's send call synchronous
        let (mut frame_tx, mut frame_rx) = mpsc::unbounded_channel::<String>();
        let writer = tokio::spawn(async move {
            while let Some(frame) = frame_rx.recv().await {
                if let Err(e) = ws_sender.send(WsMessage::Text(frame.into())).await {
                    debug!(error = %e, "Chat socket write failed");
                    break;
                }
            }
        });

        let input_closed = loop {
            tokio::select! {
                line = input.recv() => match line {
                    Some(line) => {
                        self.session.send_message(&line, &mut frame_tx, view);
                    }
                    None => break true,
                },
                msg = ws_receiver.next() => match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        self.session.handle_frame(text.as_str(), view);
                    }
                    Some(Ok(WsMessage::Close(_))) | None => {
                        debug!("Chat relay closed the connection");
                        break false;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Chat socket error");
                        break false;
                    }
                    Some(Ok(_)) => {}
                },
            }
        };

        writer.abort();
        input_closed
    }
}
