//! Ports: async trait seams between the core and its external collaborators.
//!
//! Adapters implement these traits; the application layer depends only on the
//! trait objects, injected at process start.

mod completion_service;
mod messenger;
mod question_bank;
mod session_store;

pub use completion_service::{CompletionError, CompletionOptions, CompletionService};
pub use messenger::{DeliveryError, Messenger};
pub use question_bank::{BankError, QuestionBank};
pub use session_store::{SessionStore, StoreError};
