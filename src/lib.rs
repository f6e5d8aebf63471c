//! Chat Relay
//!
//! A thin chat backend and client:
//! - HTTP relay streaming model output for `POST /api/chat`
//! - WebSocket relay answering one JSON reply per conversation frame on `/ws`
//! - Embedded browser page and a reconnecting terminal client
//! - Hosted inference API behind the `InferenceProvider` trait

pub mod api;
pub mod chat;
pub mod client;
pub mod inference;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub inference: InferenceYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
    pub serve_frontend: bool,
    /// Serve static files from this directory instead of the embedded page
    pub frontend_path: Option<String>,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            port: 8787,
            serve_frontend: true,
            frontend_path: None,
        }
    }
}

/// Inference API configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceYamlConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub model: String,
}

impl Default for InferenceYamlConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8788/ai".into(),
            api_token: None,
            model: chat::config::DEFAULT_MODEL.into(),
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub serve_frontend: bool,
    pub frontend_path: Option<String>,
    pub inference_base_url: String,
    pub inference_api_token: Option<String>,
    pub model: String,
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        Ok(Self {
            server_port: match std::env::var("SERVER_PORT") {
                Ok(port) => port
                    .parse()
                    .with_context(|| format!("Invalid SERVER_PORT: {}", port))?,
                Err(_) => yaml.server.port,
            },
            serve_frontend: std::env::var("SERVE_FRONTEND")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.server.serve_frontend),
            frontend_path: std::env::var("FRONTEND_PATH")
                .ok()
                .or(yaml.server.frontend_path)
                .filter(|p| !p.is_empty()),
            inference_base_url: std::env::var("INFERENCE_BASE_URL")
                .unwrap_or(yaml.inference.base_url),
            inference_api_token: std::env::var("INFERENCE_API_TOKEN")
                .ok()
                .or(yaml.inference.api_token)
                .filter(|t| !t.is_empty()),
            model: std::env::var("INFERENCE_MODEL").unwrap_or(yaml.inference.model),
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Build the shared relay state for a configuration
pub fn build_state(config: &Config) -> api::RelayState {
    let inference = Arc::new(inference::HttpInferenceProvider::new(
        config.inference_base_url.clone(),
        config.inference_api_token.clone(),
    ));

    let mut state = api::ServerState::new(inference, chat::ChatConfig::new(config.model.clone()));
    state.serve_frontend = config.serve_frontend;
    state.frontend_path = config.frontend_path.clone();
    Arc::new(state)
}

/// Bind the configured port and serve until the process stops
pub async fn start_server(config: Config) -> Result<()> {
    let app = api::create_router(build_state(&config));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        %addr,
        model = %config.model,
        serve_frontend = config.serve_frontend,
        "Chat relay listening"
    );

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_config_loading() {
        let yaml = r#"
server:
  port: 9090
  serve_frontend: false
  frontend_path: /srv/chat

inference:
  base_url: https://api.example.com/client/v4/accounts/abc/ai
  api_token: token-123
  model: "@cf/mistral/mistral-7b-instruct-v0.1"
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9090);
        assert!(!config.server.serve_frontend);
        assert_eq!(config.server.frontend_path.as_deref(), Some("/srv/chat"));
        assert_eq!(
            config.inference.base_url,
            "https://api.example.com/client/v4/accounts/abc/ai"
        );
        assert_eq!(config.inference.api_token.as_deref(), Some("token-123"));
        assert_eq!(config.inference.model, "@cf/mistral/mistral-7b-instruct-v0.1");
    }

    #[test]
    fn test_yaml_defaults() {
        let config = YamlConfig::default();
        assert_eq!(config.server.port, 8787);
        assert!(config.server.serve_frontend);
        assert!(config.server.frontend_path.is_none());
        assert_eq!(config.inference.model, chat::config::DEFAULT_MODEL);
        assert!(config.inference.api_token.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_section_defaults() {
        let yaml = r#"
inference:
  model: custom-model
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.inference.model, "custom-model");
        assert_eq!(config.inference.base_url, "http://localhost:8788/ai");
        assert_eq!(config.server.port, 8787);
    }

    /// Combined test for YAML file loading and env var overrides.
    /// Runs as a single test to avoid parallel env var race conditions.
    #[test]
    fn test_yaml_and_env_lifecycle() {
        fn clear_env() {
            for var in &[
                "SERVER_PORT",
                "SERVE_FRONTEND",
                "FRONTEND_PATH",
                "INFERENCE_BASE_URL",
                "INFERENCE_API_TOKEN",
                "INFERENCE_MODEL",
            ] {
                std::env::remove_var(var);
            }
        }

        // --- Phase 1: YAML values loaded correctly ---
        let yaml = r#"
server:
  port: 9999
inference:
  base_url: http://yaml-host/ai
  model: yaml-model
"#;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        clear_env();

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.server_port, 9999);
        assert_eq!(config.inference_base_url, "http://yaml-host/ai");
        assert_eq!(config.model, "yaml-model");
        assert!(config.inference_api_token.is_none());
        assert!(config.serve_frontend);

        // --- Phase 2: Env vars override YAML ---
        std::env::set_var("SERVER_PORT", "7777");
        std::env::set_var("INFERENCE_MODEL", "env-model");
        std::env::set_var("INFERENCE_API_TOKEN", "env-token");
        std::env::set_var("SERVE_FRONTEND", "false");

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.server_port, 7777);
        assert_eq!(config.model, "env-model");
        assert_eq!(config.inference_api_token.as_deref(), Some("env-token"));
        assert!(!config.serve_frontend);
        // YAML value still used where no env override
        assert_eq!(config.inference_base_url, "http://yaml-host/ai");

        // --- Phase 3: Invalid port is an error ---
        std::env::set_var("SERVER_PORT", "not-a-port");
        assert!(Config::from_yaml_and_env(Some(&file_path)).is_err());

        clear_env();

        // --- Phase 4: No YAML file → defaults ---
        let nonexistent = Path::new("/tmp/nonexistent-chat-relay-config-12345.yaml");
        let config = Config::from_yaml_and_env(Some(nonexistent)).unwrap();
        assert_eq!(config.server_port, 8787);
        assert_eq!(config.model, chat::config::DEFAULT_MODEL);
        assert!(config.frontend_path.is_none());
    }

    #[test]
    fn test_build_state_uses_config() {
        let config = Config {
            server_port: 0,
            serve_frontend: false,
            frontend_path: Some("./public".into()),
            inference_base_url: "http://localhost:1/ai".into(),
            inference_api_token: None,
            model: "m".into(),
        };
        let state = build_state(&config);
        assert_eq!(state.chat_config.model, "m");
        assert_eq!(state.chat_config.max_tokens, 1024);
        assert!(!state.serve_frontend);
        assert_eq!(state.frontend_path.as_deref(), Some("./public"));
    }
}
