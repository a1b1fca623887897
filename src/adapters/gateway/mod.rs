//! Messaging gateway adapters.

mod slack_messenger;

pub use slack_messenger::SlackMessenger;
