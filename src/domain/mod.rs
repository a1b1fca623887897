//! Domain layer: pure training logic with no I/O.
//!
//! Everything here is synchronous and deterministic (apart from timestamps);
//! network and storage effects live behind the ports.

pub mod command;
pub mod envelope;
pub mod question;
pub mod session;
pub mod webhook_verifier;

pub use command::{classify, strip_mention_markup, Command};
pub use envelope::{EnvelopeKind, GatewayEvent, WebhookEnvelope};
pub use question::{ChoiceLetter, McqItem, Question};
pub use session::{PendingQuestion, TrainingState, UserSession, LEVEL_UP_THRESHOLD};
pub use webhook_verifier::{AuthError, SignatureVerifier, MAX_TIMESTAMP_SKEW_SECS};
