//! Hugging Face router implementation of the completion service port.
//!
//! Talks the OpenAI-style chat-completions dialect exposed by the HF router.
//! Every request carries a per-call timeout so a hung upstream is reported as
//! a `CompletionError::Timeout` instead of leaking the handling task.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::ports::{CompletionError, CompletionOptions, CompletionService};

/// Liveness probe status when the router answered.
const PING_OK: &str = "HF_ROUTER_OK";

/// Configuration for the HF router completion client.
#[derive(Debug, Clone)]
pub struct HfRouterConfig {
    api_key: Secret<String>,
    /// Model routed to (e.g. "google/gemma-2-2b-it").
    pub model: String,
    /// Base URL of the router.
    pub base_url: String,
    /// Short bound for the liveness probe.
    pub ping_timeout: Duration,
}

impl HfRouterConfig {
    /// Creates a configuration with the given API token.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "google/gemma-2-2b-it".to_string(),
            base_url: "https://router.huggingface.co/v1".to_string(),
            ping_timeout: Duration::from_secs(15),
        }
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the ping timeout.
    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// HF router chat-completions client.
pub struct HfRouterCompletion {
    config: HfRouterConfig,
    client: Client,
}

impl HfRouterCompletion {
    /// Creates a client; timeouts are applied per request.
    pub fn new(config: HfRouterConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .build()
            .map_err(|e| CompletionError::Network(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    async fn send_chat(
        &self,
        content: &str,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: content.to_string(),
            }],
            stream: false,
            max_tokens: Some(options.max_tokens),
            temperature: Some(options.temperature),
            top_p: Some(options.top_p),
        };

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .timeout(options.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout {
                        timeout_secs: options.timeout.as_secs(),
                    }
                } else {
                    CompletionError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CompletionError::Parse("no choices in response".to_string()))
    }
}

#[async_trait]
impl CompletionService for HfRouterCompletion {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        self.send_chat(prompt, options).await
    }

    async fn ping(&self) -> String {
        let options = CompletionOptions {
            max_tokens: 8,
            timeout: self.config.ping_timeout,
            ..CompletionOptions::default()
        };
        match self.send_chat("ping", &options).await {
            Ok(_) => PING_OK.to_string(),
            Err(e) => format!("ERROR: {e}"),
        }
    }

    fn echo(&self, text: &str) -> String {
        format!("Model: {}\nECHO: {}", self.config.model, text)
    }
}

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
