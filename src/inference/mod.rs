//! Inference module: the hosted model API behind a trait
//!
//! Architecture follows the project pattern (trait + impl + mock):
//! - `InferenceProvider` trait: async interface for one-shot and streamed runs
//! - `HttpInferenceProvider`: REST client for a Workers-AI-style endpoint
//! - `MockInferenceProvider`: scripted replies for tests
//! - `InferenceOutput`: tagged decode of non-streaming results

pub mod mock;
pub mod output;
pub mod provider;
pub mod traits;

pub use mock::{MockInferenceProvider, MockReply, RecordedCall};
pub use output::{InferenceOutput, NO_RESPONSE_PLACEHOLDER};
pub use provider::HttpInferenceProvider;
pub use traits::{InferenceProvider, InferenceStream};
