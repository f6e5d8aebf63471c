//! InferenceProvider trait definition
//!
//! Same shape as the other service seams of the crate: async trait +
//! Send + Sync so handlers can hold an `Arc<dyn InferenceProvider>`.

use super::output::InferenceOutput;
use crate::chat::ChatMessage;
use anyhow::Result;
use async_trait::async_trait;
use axum::body::Bytes;
use futures::stream::BoxStream;

/// Raw streamed model output, relayed to HTTP clients without reshaping
pub struct InferenceStream {
    /// Content type reported by the upstream API
    pub content_type: String,
    pub body: BoxStream<'static, std::io::Result<Bytes>>,
}

/// Abstract interface for the hosted model inference API.
///
/// # Implementations
///
/// - [`HttpInferenceProvider`](super::HttpInferenceProvider): REST client for a
///   Workers-AI-style `/run/{model}` endpoint
/// - [`MockInferenceProvider`](super::MockInferenceProvider): scripted replies
///   and call recording for tests
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Run the model once and return the complete result.
    async fn run(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<InferenceOutput>;

    /// Run the model and return the raw response stream.
    ///
    /// # Errors
    ///
    /// Fails if the stream cannot be started (connection error, non-2xx status).
    /// Errors after the first chunk surface inside the stream.
    async fn run_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<InferenceStream>;
}
