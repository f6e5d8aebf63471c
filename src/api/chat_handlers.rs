//! Chat API handler: one-shot HTTP relay with a streamed body

use crate::api::handlers::{AppError, RelayState};
use crate::chat::{ensure_system_prompt, ChatRequest};
use anyhow::Context;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::Response,
};
use tracing::debug;

/// POST /api/chat: forward the conversation and stream the model output back
///
/// The upstream body is relayed as-is (SSE-compatible chunks), never buffered.
pub async fn chat(State(state): State<RelayState>, body: Bytes) -> Result<Response, AppError> {
    let mut request = ChatRequest::from_slice_lenient(&body);
    let inserted = ensure_system_prompt(&mut request.messages);

    debug!(
        messages = request.messages.len(),
        system_prompt_inserted = inserted,
        model = %state.chat_config.model,
        "Relaying chat request"
    );

    let stream = state
        .inference
        .run_stream(
            &state.chat_config.model,
            &request.messages,
            state.chat_config.max_tokens,
        )
        .await
        .context("Failed to start inference stream")?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, stream.content_type)
        .body(Body::from_stream(stream.body))
        .context("Failed to build streaming response")?;

    Ok(response)
}
