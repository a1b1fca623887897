//! Event dispatcher: classifies verified webhook envelopes and routes them.
//!
//! The dispatcher decides synchronously what to answer the gateway (challenge
//! or acknowledgment) and detaches the actual event processing onto its own
//! task, so the HTTP response never waits on completion-service calls. The
//! gateway enforces a short response budget; retries arrive with a retry
//! header and are dropped as best-effort duplicate suppression.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{strip_mention_markup, EnvelopeKind, WebhookEnvelope};

use super::trainer::Trainer;

/// What the HTTP layer should answer the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Echo the handshake challenge token back.
    Challenge(String),
    /// Plain acknowledgment; processing, if any, continues in the background.
    Ack,
}

/// Routes verified envelopes to the trainer or answers them directly.
pub struct EventDispatcher {
    trainer: Arc<Trainer>,
}

impl EventDispatcher {
    pub fn new(trainer: Arc<Trainer>) -> Self {
        Self { trainer }
    }

    /// Dispatches one verified envelope.
    ///
    /// `is_retry` marks a gateway redelivery (retry header present); such
    /// events are acknowledged and dropped.
    pub fn dispatch(&self, envelope: WebhookEnvelope, is_retry: bool) -> DispatchOutcome {
        match envelope.kind {
            EnvelopeKind::UrlVerification => {
                info!("answering url verification handshake");
                DispatchOutcome::Challenge(envelope.challenge.unwrap_or_default())
            }
            EnvelopeKind::EventCallback => {
                if is_retry {
                    debug!("dropping gateway redelivery");
                    return DispatchOutcome::Ack;
                }
                let Some(event) = envelope.event else {
                    return DispatchOutcome::Ack;
                };
                if !event.is_eligible() {
                    debug!(kind = %event.kind, "dropping ineligible event");
                    return DispatchOutcome::Ack;
                }
                let (Some(user), Some(channel)) = (event.user, event.channel) else {
                    return DispatchOutcome::Ack;
                };

                let text = strip_mention_markup(&event.text.unwrap_or_default());
                debug!(user, channel, "queueing event for processing");

                let trainer = self.trainer.clone();
                tokio::spawn(async move {
                    trainer.handle_message(&user, &channel, &text).await;
                });

                DispatchOutcome::Ack
            }
            EnvelopeKind::Unknown => DispatchOutcome::Ack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::adapters::memory::{InMemoryQuestionBank, InMemorySessionStore};
    use crate::domain::GatewayEvent;
    use crate::ports::{
        CompletionError, CompletionOptions, CompletionService, DeliveryError, Messenger,
    };

    struct SilentCompletion;

    #[async_trait]
    impl CompletionService for SilentCompletion {
        async fn complete(
            &self,
            _prompt: &str,
            _options: &CompletionOptions,
        ) -> Result<String, CompletionError> {
            Ok("ok".to_string())
        }

        async fn ping(&self) -> String {
            "OK".to_string()
        }

        fn echo(&self, text: &str) -> String {
            format!("ECHO: {text}")
        }
    }

    #[derive(Default)]
    struct CountingMessenger {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Messenger for CountingMessenger {
        async fn send_message(&self, _channel: &str, text: &str) -> Result<(), DeliveryError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn dispatcher() -> (EventDispatcher, Arc<CountingMessenger>) {
        let messenger = Arc::new(CountingMessenger::default());
        let trainer = Arc::new(Trainer::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryQuestionBank::with_questions(vec![])),
            messenger.clone(),
            Arc::new(SilentCompletion),
        ));
        (EventDispatcher::new(trainer), messenger)
    }

    fn message_event(text: &str) -> WebhookEnvelope {
        WebhookEnvelope {
            kind: EnvelopeKind::EventCallback,
            challenge: None,
            event: Some(GatewayEvent {
                kind: "message".to_string(),
                user: Some("U1".to_string()),
                channel: Some("D1".to_string()),
                text: Some(text.to_string()),
                channel_type: Some("im".to_string()),
                bot_id: None,
            }),
        }
    }

    #[tokio::test]
    async fn handshake_returns_challenge() {
        let (dispatcher, _) = dispatcher();
        let envelope = WebhookEnvelope {
            kind: EnvelopeKind::UrlVerification,
            challenge: Some("tok-123".to_string()),
            event: None,
        };

        assert_eq!(
            dispatcher.dispatch(envelope, false),
            DispatchOutcome::Challenge("tok-123".to_string())
        );
    }

    #[tokio::test]
    async fn retries_are_acked_and_dropped() {
        let (dispatcher, messenger) = dispatcher();

        assert_eq!(
            dispatcher.dispatch(message_event("hello"), true),
            DispatchOutcome::Ack
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(messenger.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bot_events_are_dropped() {
        let (dispatcher, messenger) = dispatcher();
        let mut envelope = message_event("hello");
        envelope.event.as_mut().unwrap().bot_id = Some("B9".to_string());

        assert_eq!(dispatcher.dispatch(envelope, false), DispatchOutcome::Ack);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(messenger.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn channel_chatter_is_dropped() {
        let (dispatcher, messenger) = dispatcher();
        let mut envelope = message_event("hello");
        envelope.event.as_mut().unwrap().channel_type = Some("channel".to_string());

        assert_eq!(dispatcher.dispatch(envelope, false), DispatchOutcome::Ack);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(messenger.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn eligible_event_reaches_the_trainer() {
        let (dispatcher, messenger) = dispatcher();

        assert_eq!(
            dispatcher.dispatch(message_event("hello there"), false),
            DispatchOutcome::Ack
        );

        // Background task finishes shortly after the ack.
        for _ in 0..50 {
            if !messenger.sent.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let sent = messenger.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("ECHO: hello there"));
    }
}
