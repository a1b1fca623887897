//! Completion service configuration (HF router)

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Completion service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API token for the completion router
    pub api_token: Secret<String>,

    /// Model identifier, e.g. "google/gemma-2-2b-it"
    #[serde(default = "default_model")]
    pub model: String,

    /// Router base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Liveness probe timeout in seconds
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_secs: u64,

    /// Generation timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,
}

impl AiConfig {
    /// Validate completion service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingCompletionToken);
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidCompletionUrl);
        }
        if self.ping_timeout_secs == 0 || self.generation_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_model() -> String {
    "google/gemma-2-2b-it".to_string()
}

fn default_base_url() -> String {
    "https://router.huggingface.co/v1".to_string()
}

fn default_ping_timeout() -> u64 {
    15
}

fn default_generation_timeout() -> u64 {
    30
}
