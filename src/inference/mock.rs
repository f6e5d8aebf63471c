//! Mock inference provider for tests
//!
//! Replays a script of canned replies (or failures) and records every call so
//! tests can assert on exactly what the relay forwarded.

use super::output::InferenceOutput;
use super::traits::{InferenceProvider, InferenceStream};
use crate::chat::ChatMessage;
use anyhow::Result;
use async_trait::async_trait;
use axum::body::Bytes;
use futures::StreamExt;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this output (or stream these bytes, for `run_stream`)
    Output(InferenceOutput),
    /// Wait, then return the output
    Delayed(Duration, InferenceOutput),
    /// Fail the call with this message
    Fail(String),
}

/// A call observed by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub stream: bool,
}

/// Scripted inference provider.
///
/// Replies are consumed in order; once the script is exhausted the fallback
/// reply is used for every further call.
///
/// # Example
///
/// ```rust
/// use chat_relay::chat::ChatMessage;
/// use chat_relay::inference::{InferenceProvider, MockInferenceProvider, MockReply};
///
/// # tokio_test::block_on(async {
/// let provider = MockInferenceProvider::replying("hi there")
///     .with_script([MockReply::Fail("overloaded".into())]);
/// let messages = vec![ChatMessage::user("hello")];
///
/// // Script first, then the fallback
/// assert!(provider.run("m", &messages, 1024).await.is_err());
/// let output = provider.run("m", &messages, 1024).await.unwrap();
/// assert_eq!(output.into_text(), "hi there");
///
/// assert_eq!(provider.calls().await.len(), 2);
/// # });
/// ```
pub struct MockInferenceProvider {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockInferenceProvider {
    /// Always answer with the given text
    pub fn replying(text: &str) -> Self {
        Self::with_fallback(MockReply::Output(InferenceOutput::from(text)))
    }

    /// Always fail
    pub fn failing(message: &str) -> Self {
        Self::with_fallback(MockReply::Fail(message.to_string()))
    }

    pub fn with_fallback(fallback: MockReply) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue replies consumed before the fallback
    pub fn with_script(self, replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            ..self
        }
    }

    /// All calls made so far
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    async fn next_reply(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
        stream: bool,
    ) -> Result<InferenceOutput> {
        self.calls.lock().await.push(RecordedCall {
            model: model.to_string(),
            messages: messages.to_vec(),
            max_tokens,
            stream,
        });

        let reply = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            MockReply::Output(output) => Ok(output),
            MockReply::Delayed(delay, output) => {
                tokio::time::sleep(delay).await;
                Ok(output)
            }
            MockReply::Fail(message) => Err(anyhow::anyhow!(message)),
        }
    }
}

#[async_trait]
impl InferenceProvider for MockInferenceProvider {
    async fn run(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<InferenceOutput> {
        self.next_reply(model, messages, max_tokens, false).await
    }

    async fn run_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<InferenceStream> {
        let text = self
            .next_reply(model, messages, max_tokens, true)
            .await?
            .into_text();

        let chunks: Vec<std::io::Result<Bytes>> = vec![
            Ok(Bytes::from(format!(
                "data: {}\n\n",
                serde_json::json!({ "response": text })
            ))),
            Ok(Bytes::from_static(b"data: [DONE]\n\n")),
        ];
        let body = tokio_stream::iter(chunks).boxed();

        Ok(InferenceStream {
            content_type: "text/event-stream".to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_fallback() {
        let mock = MockInferenceProvider::replying("fallback").with_script([
            MockReply::Output(InferenceOutput::from("first")),
            MockReply::Fail("boom".into()),
        ]);

        assert_eq!(mock.run("m", &[], 8).await.unwrap().into_text(), "first");
        assert!(mock.run("m", &[], 8).await.is_err());
        assert_eq!(mock.run("m", &[], 8).await.unwrap().into_text(), "fallback");
        assert_eq!(mock.calls().await.len(), 3);
    }

    #[tokio::test]
    async fn test_records_calls() {
        let mock = MockInferenceProvider::replying("ok");
        let messages = vec![ChatMessage::user("hi")];
        mock.run_stream("model-x", &messages, 1024).await.unwrap();

        let calls = mock.calls().await;
        assert_eq!(
            calls,
            vec![RecordedCall {
                model: "model-x".into(),
                messages,
                max_tokens: 1024,
                stream: true,
            }]
        );
    }
}
