//! Chat configuration

/// Output budget for every inference call
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Model used when neither YAML nor env configure one
pub const DEFAULT_MODEL: &str = "@cf/meta/llama-3.1-8b-instruct";

/// Configuration for the chat relay
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Model identifier passed to the inference API on every call
    pub model: String,
    /// Maximum number of tokens the model may generate
    pub max_tokens: u32,
}

impl ChatConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}
