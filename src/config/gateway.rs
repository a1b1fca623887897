//! Messaging gateway configuration (signing secret, bot token)

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Gateway credentials and endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Shared secret used to verify inbound webhook signatures
    pub signing_secret: Secret<String>,

    /// Bot token for outbound message sends
    pub bot_token: Secret<String>,

    /// Web API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl GatewayConfig {
    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.signing_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingSigningSecret);
        }
        if self.bot_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingBotToken);
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://slack.com/api".to_string()
}
