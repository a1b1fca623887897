//! Question bank port.
//!
//! The bank owns the question records; the core samples them and counts per
//! level, never writes.

use async_trait::async_trait;

use crate::domain::Question;

/// Question bank failures.
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    /// Underlying storage failed.
    #[error("question bank error: {0}")]
    Database(String),
}

/// Port for the read-only question bank.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Returns a uniformly random question among all questions at exactly
    /// `level`, or `None` when the level has no questions.
    async fn sample_at_level(&self, level: u32) -> Result<Option<Question>, BankError>;

    /// Counts questions at exactly `level`; used to decide whether a level
    /// promotion is viable.
    async fn count_at_level(&self, level: u32) -> Result<u64, BankError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_bank_is_object_safe() {
        fn _accepts_dyn(_bank: &dyn QuestionBank) {}
    }
}
