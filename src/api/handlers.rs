//! Shared server state and error handling for the API handlers

use crate::chat::ChatConfig;
use crate::inference::InferenceProvider;
use axum::{http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

/// Shared server state
///
/// Immutable after startup; every request and socket builds its own view of
/// the conversation from the payload it receives.
pub struct ServerState {
    pub inference: Arc<dyn InferenceProvider>,
    pub chat_config: ChatConfig,
    /// Whether to serve the frontend static files
    pub serve_frontend: bool,
    /// Directory to serve static files from. `None` serves the embedded page.
    pub frontend_path: Option<String>,
}

/// Shared relay state
pub type RelayState = Arc<ServerState>;

impl ServerState {
    pub fn new(inference: Arc<dyn InferenceProvider>, chat_config: ChatConfig) -> Self {
        Self {
            inference,
            chat_config,
            serve_frontend: true,
            frontend_path: None,
        }
    }
}

/// Body returned for any internal failure; details stay in the logs
pub const INTERNAL_ERROR_MESSAGE: &str = "Failed to process request";

pub enum AppError {
    Internal(anyhow::Error),
    NotFound(String),
    UpgradeRequired(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(e) => {
                tracing::error!(error = %format!("{:#}", e), "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::UpgradeRequired(msg) => (StatusCode::UPGRADE_REQUIRED, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

/// Fallback for unknown `/api/...` paths
pub async fn api_not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let resp = AppError::Internal(anyhow::anyhow!("secret upstream detail")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json, serde_json::json!({"error": "Failed to process request"}));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let resp = AppError::NotFound("nope".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["error"], "nope");

        let resp = AppError::UpgradeRequired("ws only".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UPGRADE_REQUIRED);
    }
}
