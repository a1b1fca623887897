//! Messenger port - outbound message delivery through the gateway.
//!
//! Fire-and-forget from the core's perspective: delivery errors are logged by
//! callers, never retried.

use async_trait::async_trait;

/// Outbound delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Network failure reaching the gateway.
    #[error("gateway network error: {0}")]
    Network(String),

    /// Gateway rejected the send.
    #[error("gateway rejected message: {0}")]
    Rejected(String),
}

/// Port for sending chat messages to a channel.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends `text` to `channel`.
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), DeliveryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messenger_is_object_safe() {
        fn _accepts_dyn(_messenger: &dyn Messenger) {}
    }
}
