//! Configuration for the pets REST API client.

use serde::{Deserialize, Serialize};
use std::env;

use crate::errors::{Result, VitalsError};

/// Configuration for the pets API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend (default: <http://localhost:8080>)
    pub base_url: String,
    /// Bearer token attached to every request.
    pub token: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            token: String::new(),
            timeout_seconds: 30,
        }
    }
}

impl ApiConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let token = env::var("PETVITALS_TOKEN").map_err(|_| {
            VitalsError::Configuration(
                "API token not found. Set the PETVITALS_TOKEN environment variable".to_string(),
            )
        })?;

        let mut config = Self {
            token,
            ..Self::default()
        };

        if let Ok(base_url) = env::var("PETVITALS_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(timeout) = env::var("PETVITALS_TIMEOUT_SECONDS") {
            config.timeout_seconds = timeout.parse().unwrap_or(config.timeout_seconds);
        }

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(VitalsError::Configuration(
                "API token cannot be empty".to_string(),
            ));
        }
        if self.base_url.is_empty() {
            return Err(VitalsError::Configuration(
                "Base URL cannot be empty".to_string(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(VitalsError::Configuration(
                "Timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The API root, with the `/api` prefix the backend mounts its routes
    /// under.
    pub fn api_root(&self) -> String {
        format!("{}/api", self.base_url.trim_end_matches('/'))
    }
}
