//! Inbound webhook envelope and event types.
//!
//! The gateway posts a JSON envelope `{type, challenge?, event?}`. Unknown
//! envelope and event kinds deserialize instead of failing so new gateway
//! event types are acknowledged and dropped rather than rejected.

use serde::Deserialize;

/// Top-level envelope kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    /// Endpoint ownership handshake; answered with the challenge token.
    UrlVerification,
    /// A wrapped gateway event.
    EventCallback,
    /// Anything else: acknowledged and dropped.
    #[serde(other)]
    Unknown,
}

/// The raw webhook envelope as delivered by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    /// Present on `url_verification` envelopes.
    #[serde(default)]
    pub challenge: Option<String>,
    /// Present on `event_callback` envelopes.
    #[serde(default)]
    pub event: Option<GatewayEvent>,
}

/// The nested event inside an `event_callback` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// `im` marks a direct-message channel.
    #[serde(default)]
    pub channel_type: Option<String>,
    /// Present when the sender is a bot; such events must be dropped.
    #[serde(default)]
    pub bot_id: Option<String>,
}

impl GatewayEvent {
    /// Whether this event should reach the state machine at all.
    ///
    /// Only app mentions and direct messages are eligible; bot-authored
    /// events never are (replying to them would loop).
    pub fn is_eligible(&self) -> bool {
        if self.bot_id.is_some() {
            return false;
        }
        self.kind == "app_mention"
            || (self.kind == "message" && self.channel_type.as_deref() == Some("im"))
    }
}
