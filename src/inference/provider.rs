//! HTTP inference provider implementation
//!
//! Implements `InferenceProvider` against a Workers-AI-style REST API:
//! `POST {base_url}/run/{model}` with `{ messages, max_tokens, stream }`.
//!
//! Non-streaming answers come back either bare or wrapped in a
//! `{ "result": ..., "success": true }` envelope; the envelope is unwrapped
//! before decoding into [`InferenceOutput`].

use super::output::InferenceOutput;
use super::traits::{InferenceProvider, InferenceStream};
use crate::chat::ChatMessage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

/// HTTP-based inference provider.
///
/// Cheaply cloneable (shares the reqwest client internally).
#[derive(Clone)]
pub struct HttpInferenceProvider {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl HttpInferenceProvider {
    /// Create a provider.
    ///
    /// * `base_url` - API root, e.g. `https://api.cloudflare.com/client/v4/accounts/<id>/ai`
    /// * `api_token` - optional bearer token
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.filter(|t| !t.is_empty()),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/run/{}", self.base_url, model)
    }

    async fn send(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
        stream: bool,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint(model);
        let body = InferenceRequest {
            messages,
            max_tokens,
            stream,
        };

        let mut req = self.client.post(&url).json(&body);
        if let Some(ref token) = self.api_token {
            req = req.bearer_auth(token);
        }

        let response = req
            .send()
            .await
            .with_context(|| format!("Failed to connect to inference API at {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
                if let Some(detail) = envelope.errors.first() {
                    anyhow::bail!(
                        "Inference API error ({}): {}",
                        status.as_u16(),
                        detail.message
                    );
                }
            }
            anyhow::bail!("Inference API returned {}: {}", status.as_u16(), body);
        }

        Ok(response)
    }
}

/// Strip the `{ result, success }` envelope if present
fn unwrap_envelope(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut obj)
            if obj.contains_key("success") && obj.contains_key("result") =>
        {
            obj.remove("result").unwrap_or_default()
        }
        other => other,
    }
}

#[async_trait]
impl InferenceProvider for HttpInferenceProvider {
    async fn run(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<InferenceOutput> {
        let response = self.send(model, messages, max_tokens, false).await?;
        let value: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse inference API response")?;

        Ok(InferenceOutput::from_value(unwrap_envelope(value)))
    }

    async fn run_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<InferenceStream> {
        let response = self.send(model, messages, max_tokens, true).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/event-stream")
            .to_string();

        let body = response
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed();

        Ok(InferenceStream { content_type, body })
    }
}
