//! In-memory session store and question bank.
//!
//! Used by tests and local development; production deployments use the
//! Postgres adapters.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use crate::domain::{Question, UserSession};
use crate::ports::{BankError, QuestionBank, SessionStore, StoreError};

/// In-memory session store keyed by user id.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, UserSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions (useful for tests).
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn find(&self, user_id: &str) -> Result<Option<UserSession>, StoreError> {
        Ok(self.sessions.read().await.get(user_id).cloned())
    }

    async fn upsert(&self, session: &UserSession) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .insert(session.user_id().to_string(), session.clone());
        Ok(())
    }
}

/// In-memory question bank with uniform sampling per level.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuestionBank {
    questions: Arc<RwLock<Vec<Question>>>,
}

impl InMemoryQuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bank preloaded with questions.
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions: Arc::new(RwLock::new(questions)),
        }
    }

    /// Adds a question to the bank.
    pub async fn add(&self, question: Question) {
        self.questions.write().await.push(question);
    }
}

#[async_trait]
impl QuestionBank for InMemoryQuestionBank {
    async fn sample_at_level(&self, level: u32) -> Result<Option<Question>, BankError> {
        let questions = self.questions.read().await;
        let at_level: Vec<&Question> = questions.iter().filter(|q| q.level == level).collect();
        Ok(at_level.choose(&mut rand::thread_rng()).map(|q| (*q).clone()))
    }

    async fn count_at_level(&self, level: u32) -> Result<u64, BankError> {
        let questions = self.questions.read().await;
        Ok(questions.iter().filter(|q| q.level == level).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(number: i64, level: u32) -> Question {
        Question {
            number,
            level,
            question_text: format!("q{number}"),
            answer_text: format!("a{number}"),
            module: "general".to_string(),
        }
    }

    #[tokio::test]
    async fn store_round_trips_sessions() {
        let store = InMemorySessionStore::new();
        assert!(store.find("U1").await.unwrap().is_none());

        let mut session = UserSession::new("U1");
        session.begin_training();
        store.upsert(&session).await.unwrap();

        let found = store.find("U1").await.unwrap().unwrap();
        assert!(found.in_training());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_session() {
        let store = InMemorySessionStore::new();
        let mut session = UserSession::new("U1");
        store.upsert(&session).await.unwrap();

        session.begin_training();
        store.upsert(&session).await.unwrap();

        assert!(store.find("U1").await.unwrap().unwrap().in_training());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn sampling_respects_the_exact_level() {
        let bank = InMemoryQuestionBank::with_questions(vec![
            question(1, 1),
            question(2, 1),
            question(3, 2),
        ]);

        for _ in 0..20 {
            let q = bank.sample_at_level(1).await.unwrap().unwrap();
            assert_eq!(q.level, 1);
        }
        assert_eq!(bank.sample_at_level(3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn counts_are_per_level() {
        let bank = InMemoryQuestionBank::with_questions(vec![
            question(1, 1),
            question(2, 1),
            question(3, 2),
        ]);

        assert_eq!(bank.count_at_level(1).await.unwrap(), 2);
        assert_eq!(bank.count_at_level(2).await.unwrap(), 1);
        assert_eq!(bank.count_at_level(9).await.unwrap(), 0);
    }
}
