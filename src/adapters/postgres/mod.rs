//! PostgreSQL store adapters.

mod question_bank;
mod session_store;

pub use question_bank::PostgresQuestionBank;
pub use session_store::PostgresSessionStore;
