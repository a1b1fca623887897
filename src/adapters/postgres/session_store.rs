//! PostgreSQL implementation of the session store port.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::{ChoiceLetter, PendingQuestion, UserSession};
use crate::ports::{SessionStore, StoreError};

/// Session store backed by the `training_sessions` table.
#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn find(&self, user_id: &str) -> Result<Option<UserSession>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, current_level, in_training, correct_streak,
                   pending_number, pending_reference_answer, pending_correct_option,
                   updated_at
            FROM training_sessions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("failed to fetch session: {e}")))?;

        row.map(row_to_session).transpose()
    }

    async fn upsert(&self, session: &UserSession) -> Result<(), StoreError> {
        let pending = session.pending_question();
        sqlx::query(
            r#"
            INSERT INTO training_sessions (
                user_id, current_level, in_training, correct_streak,
                pending_number, pending_reference_answer, pending_correct_option,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                current_level = EXCLUDED.current_level,
                in_training = EXCLUDED.in_training,
                correct_streak = EXCLUDED.correct_streak,
                pending_number = EXCLUDED.pending_number,
                pending_reference_answer = EXCLUDED.pending_reference_answer,
                pending_correct_option = EXCLUDED.pending_correct_option,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(session.user_id())
        .bind(session.current_level() as i32)
        .bind(session.in_training())
        .bind(session.correct_streak() as i32)
        .bind(pending.map(|p| p.number))
        .bind(pending.map(|p| p.reference_answer.as_str()))
        .bind(pending.map(|p| p.correct_option.as_str()))
        .bind(session.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("failed to upsert session: {e}")))?;

        Ok(())
    }
}

fn row_to_session(row: sqlx::postgres::PgRow) -> Result<UserSession, StoreError> {
    let user_id: String = row.get("user_id");
    let current_level: i32 = row.get("current_level");
    let in_training: bool = row.get("in_training");
    let correct_streak: i32 = row.get("correct_streak");
    let pending_number: Option<i64> = row.get("pending_number");
    let pending_reference: Option<String> = row.get("pending_reference_answer");
    let pending_correct: Option<String> = row.get("pending_correct_option");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

    let pending_question = match (pending_number, pending_reference, pending_correct) {
        (Some(number), Some(reference_answer), Some(letter)) => {
            let correct_option = ChoiceLetter::parse(&letter).ok_or_else(|| {
                StoreError::Database(format!(
                    "corrupt pending_correct_option {letter:?} for user {user_id}"
                ))
            })?;
            Some(PendingQuestion {
                number,
                reference_answer,
                correct_option,
            })
        }
        (None, None, None) => None,
        _ => {
            return Err(StoreError::Database(format!(
                "partial pending question columns for user {user_id}"
            )))
        }
    };

    Ok(UserSession::reconstitute(
        user_id,
        current_level.max(1) as u32,
        in_training,
        correct_streak.max(0) as u32,
        pending_question,
        updated_at,
    ))
}
