//! Completion service port - interface to the text-generation backend.
//!
//! The completion service is a black box that returns text for a prompt.
//! Callers bound every call with a timeout so a hung upstream cannot leak
//! background tasks; on timeout the caller degrades instead of retrying.

use std::time::Duration;

use async_trait::async_trait;

/// Generation parameters for a single completion call.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    /// Hard bound on the request.
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.7,
            top_p: 0.9,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Completion service failures.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Request exceeded its timeout.
    #[error("completion request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured bound in seconds.
        timeout_secs: u64,
    },

    /// Network failure reaching the service.
    #[error("completion network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the service.
    #[error("completion service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// Response did not contain a usable completion.
    #[error("completion response parse error: {0}")]
    Parse(String),
}

/// Port for the external text-generation backend.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Generates text for a prompt, bounded by `options.timeout`.
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError>;

    /// Quick liveness probe; returns a short status string and never fails
    /// (errors are folded into the string).
    async fn ping(&self) -> String;

    /// Diagnostic echo naming the configured model.
    fn echo(&self, text: &str) -> String;
}
