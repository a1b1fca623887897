//! PostgreSQL implementation of the question bank port.
//!
//! Sampling uses `ORDER BY random()` over the level filter, which is uniform
//! over the rows at that level and cheap at question-bank scale.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::Question;
use crate::ports::{BankError, QuestionBank};

/// Question bank backed by the `questions` table.
#[derive(Clone)]
pub struct PostgresQuestionBank {
    pool: PgPool,
}

impl PostgresQuestionBank {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionBank for PostgresQuestionBank {
    async fn sample_at_level(&self, level: u32) -> Result<Option<Question>, BankError> {
        let row = sqlx::query(
            r#"
            SELECT number, level, question_text, answer_text, module
            FROM questions
            WHERE level = $1
            ORDER BY random()
            LIMIT 1
            "#,
        )
        .bind(level as i32)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| BankError::Database(format!("failed to sample question: {e}")))?;

        Ok(row.map(|row| Question {
            number: row.get("number"),
            level: row.get::<i32, _>("level").max(0) as u32,
            question_text: row.get("question_text"),
            answer_text: row.get("answer_text"),
            module: row.get("module"),
        }))
    }

    async fn count_at_level(&self, level: u32) -> Result<u64, BankError> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM questions WHERE level = $1"#,
        )
        .bind(level as i32)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| BankError::Database(format!("failed to count questions: {e}")))?;

        Ok(count.max(0) as u64)
    }
}
