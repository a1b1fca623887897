//! Session store port.
//!
//! Persists per-user training sessions keyed by platform user id. The store
//! is externally synchronized; the trainer serializes access per user so each
//! read-modify-write behaves as a single logical transaction.

use async_trait::async_trait;

use crate::domain::UserSession;

/// Session store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying storage failed.
    #[error("session store error: {0}")]
    Database(String),
}

/// Port for per-user session persistence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Looks up the session for a user. `None` if the user has never been
    /// seen.
    async fn find(&self, user_id: &str) -> Result<Option<UserSession>, StoreError>;

    /// Inserts or fully replaces the session for its user id.
    async fn upsert(&self, session: &UserSession) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SessionStore) {}
    }
}
