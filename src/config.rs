//! Application configuration loaded from environment variables.
//!
//! Everything here is non-sensitive; the push gateway URL is the only
//! deployment-specific value without a usable default.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID
    pub gcp_project_id: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Requests allowed per credential per fixed one-hour window
    pub api_rate_limit: u32,
    /// Push gateway endpoint; when unset the push channel reports unavailable
    pub push_gateway_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            api_rate_limit: env::var("API_RATE_LIMIT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(1000),
            push_gateway_url: env::var("PUSH_GATEWAY_URL").ok(),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            api_rate_limit: 1000,
            push_gateway_url: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
