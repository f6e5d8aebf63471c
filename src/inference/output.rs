//! Decoding of non-streaming inference results

use serde::Deserialize;

/// Text used when a result carries none of the known reply shapes
pub const NO_RESPONSE_PLACEHOLDER: &str = "[No response]";

/// The result shapes a non-streaming inference call may produce.
///
/// Variants are tried in order, which gives the extraction precedence:
/// bare string, then a string `response` field, then a string `result` field.
/// Anything else lands in [`InferenceOutput::Unrecognized`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InferenceOutput {
    Text(String),
    Response { response: String },
    Result { result: String },
    Unrecognized(serde_json::Value),
}

impl InferenceOutput {
    /// Decode a raw JSON value. Never fails: unknown shapes become `Unrecognized`.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(Self::Unrecognized(value))
    }

    /// Reply text, falling back to [`NO_RESPONSE_PLACEHOLDER`]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) | Self::Response { response: text } | Self::Result { result: text } => {
                text
            }
            Self::Unrecognized(_) => NO_RESPONSE_PLACEHOLDER.to_string(),
        }
    }
}

impl From<&str> for InferenceOutput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}
