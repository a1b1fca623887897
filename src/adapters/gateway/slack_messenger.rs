//! Slack implementation of the messenger port.
//!
//! Posts outbound replies through `chat.postMessage`. The Slack web API
//! answers HTTP 200 even for application errors, so the JSON `ok` flag is
//! checked as well.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::ports::{DeliveryError, Messenger};

/// Slack web API messenger.
pub struct SlackMessenger {
    bot_token: Secret<String>,
    base_url: String,
    client: Client,
}

impl SlackMessenger {
    /// Creates a messenger for the default Slack API endpoint.
    pub fn new(bot_token: impl Into<String>) -> Result<Self, DeliveryError> {
        Self::with_base_url(bot_token, "https://slack.com/api")
    }

    /// Creates a messenger against a custom endpoint (used in tests).
    pub fn with_base_url(
        bot_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DeliveryError::Network(e.to_string()))?;
        Ok(Self {
            bot_token: Secret::new(bot_token.into()),
            base_url: base_url.into(),
            client,
        })
    }
}

#[async_trait]
impl Messenger for SlackMessenger {
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), DeliveryError> {
        let request = PostMessageRequest { channel, text };

        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.bot_token.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| DeliveryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected(format!("status {status}: {body}")));
        }

        let body: PostMessageResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Rejected(format!("unparseable response: {e}")))?;
        if !body.ok {
            return Err(DeliveryError::Rejected(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}
