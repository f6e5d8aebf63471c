//! WebSocket handler for the chat relay
//!
//! Protocol:
//! - Client → Server: `{ "messages": ChatMessage[] }` as a text (or UTF-8 binary) frame
//! - Server → Client: `{ "response": string }` as a text frame, one per inbound frame
//!
//! Frames on one connection are handled one at a time, so replies come back
//! in the order the requests arrived. Failures produce an apology frame and
//! never close the socket.

use super::handlers::{AppError, RelayState};
use crate::chat::{ensure_system_prompt, ChatReply, ChatRequest};
use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Reply sent when a frame could not be relayed
pub const WS_ERROR_REPLY: &str = "Sorry, there was an error processing your request.";

/// True when the `Upgrade` header asks for a WebSocket
fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
}

/// WebSocket upgrade handler for `/ws`
///
/// Requests without `Upgrade: websocket` get 426 and no socket is created.
pub async fn ws_chat(
    State(state): State<RelayState>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if !is_websocket_upgrade(&headers) {
        return AppError::UpgradeRequired("Expected Upgrade: websocket".into()).into_response();
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            debug!(reason = %rejection, "WS chat: upgrade rejected");
            return rejection.into_response();
        }
    };

    let connection_id = Uuid::new_v4();
    ws.on_upgrade(move |socket| handle_ws_chat(socket, state, connection_id))
}

/// Receive loop for one chat connection
async fn handle_ws_chat(socket: WebSocket, state: RelayState, connection_id: Uuid) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    info!(%connection_id, "Chat WebSocket connected");

    // Ping interval (30s)
    let mut ping_interval = interval(Duration::from_secs(30));
    // Skip the first immediate tick
    ping_interval.tick().await;

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if ws_sender.send(Message::Ping(vec![].into())).await.is_err() {
                    debug!(%connection_id, "Ping failed, client disconnected");
                    break;
                }
            }

            msg = ws_receiver.next() => {
                let payload = match msg {
                    Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
                    Some(Ok(Message::Binary(bytes))) => String::from_utf8_lossy(&bytes).into_owned(),
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%connection_id, "Chat WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(%connection_id, error = %e, "Chat WebSocket error");
                        break;
                    }
                    Some(Ok(_)) => continue,
                };

                let reply = match relay_frame(&state, &payload).await {
                    Ok(text) => ChatReply::new(text),
                    Err(e) => {
                        warn!(%connection_id, error = %format!("{:#}", e), "Failed to relay chat frame");
                        ChatReply::new(WS_ERROR_REPLY)
                    }
                };

                match serde_json::to_string(&reply) {
                    Ok(json) => {
                        if ws_sender.send(Message::Text(json.into())).await.is_err() {
                            debug!(%connection_id, "WebSocket send failed, client disconnected");
                            break;
                        }
                    }
                    Err(e) => warn!(%connection_id, "Failed to serialize chat reply: {}", e),
                }
            }
        }
    }

    info!(%connection_id, "Chat WebSocket closed");
}

/// Parse one inbound frame, run inference and extract the reply text
async fn relay_frame(state: &RelayState, payload: &str) -> Result<String> {
    let mut request: ChatRequest =
        serde_json::from_str(payload).context("Invalid chat frame")?;
    ensure_system_prompt(&mut request.messages);

    let output = state
        .inference
        .run(
            &state.chat_config.model,
            &request.messages,
            state.chat_config.max_tokens,
        )
        .await?;

    Ok(output.into_text())
}
