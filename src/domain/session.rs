//! Per-user training session aggregate.
//!
//! One `UserSession` exists per platform user id. It is created lazily on the
//! first event from a user and mutated exclusively by the trainer in response
//! to classified commands and answers; it is never deleted (stopping training
//! only clears the pending question and flags).
//!
//! # Invariants
//!
//! - `current_level` starts at 1 and never decreases
//! - `pending_question` is set iff the last outbound message was an MCQ
//!   awaiting a letter answer
//! - `in_training == false` implies `pending_question == None`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::question::ChoiceLetter;

/// Consecutive correct answers required before a level promotion is attempted.
pub const LEVEL_UP_THRESHOLD: u32 = 3;

/// The MCQ sent to the user and not yet answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingQuestion {
    /// Bank number of the question behind the MCQ.
    pub number: i64,
    /// Reference answer shown as the explanation after evaluation.
    pub reference_answer: String,
    /// The letter the synthesizer marked correct.
    pub correct_option: ChoiceLetter,
}

/// Coarse training state derived from the session fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    /// Not in training; messages go to default chat.
    Idle,
    /// In training with no question outstanding.
    InTraining,
    /// An MCQ was sent and a letter answer is expected.
    AwaitingAnswer,
}

/// Per-user training session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    user_id: String,
    current_level: u32,
    in_training: bool,
    correct_streak: u32,
    pending_question: Option<PendingQuestion>,
    updated_at: DateTime<Utc>,
}

impl UserSession {
    /// Creates a fresh idle session at level 1.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            current_level: 1,
            in_training: false,
            correct_streak: 0,
            pending_question: None,
            updated_at: Utc::now(),
        }
    }

    /// Rebuilds a session from persistence without validation.
    pub fn reconstitute(
        user_id: String,
        current_level: u32,
        in_training: bool,
        correct_streak: u32,
        pending_question: Option<PendingQuestion>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            current_level,
            in_training,
            correct_streak,
            pending_question,
            updated_at,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn in_training(&self) -> bool {
        self.in_training
    }

    pub fn correct_streak(&self) -> u32 {
        self.correct_streak
    }

    pub fn pending_question(&self) -> Option<&PendingQuestion> {
        self.pending_question.as_ref()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Derives the coarse state used by the transition table.
    pub fn state(&self) -> TrainingState {
        if self.pending_question.is_some() {
            TrainingState::AwaitingAnswer
        } else if self.in_training {
            TrainingState::InTraining
        } else {
            TrainingState::Idle
        }
    }

    /// Enters training mode. Any previously pending question is dropped so the
    /// next fetch starts clean.
    pub fn begin_training(&mut self) {
        self.in_training = true;
        self.pending_question = None;
        self.touch();
    }

    /// Leaves training mode, clearing the pending question and streak.
    /// Idempotent: calling while already idle is a no-op apart from the
    /// timestamp.
    pub fn stop_training(&mut self) {
        self.in_training = false;
        self.pending_question = None;
        self.correct_streak = 0;
        self.touch();
    }

    /// Records the MCQ that was just sent. Only meaningful while in training.
    pub fn set_pending_question(&mut self, pending: PendingQuestion) {
        debug_assert!(self.in_training, "pending question outside training");
        self.pending_question = Some(pending);
        self.touch();
    }

    /// Resolves the pending question with a correct answer and returns the new
    /// streak value.
    pub fn record_correct(&mut self) -> u32 {
        self.pending_question = None;
        self.correct_streak += 1;
        self.touch();
        self.correct_streak
    }

    /// Resolves the pending question with a wrong answer; the streak always
    /// resets to zero.
    pub fn record_incorrect(&mut self) {
        self.pending_question = None;
        self.correct_streak = 0;
        self.touch();
    }

    /// Advances to the next level and resets the streak. Callers must have
    /// confirmed the next level has questions.
    pub fn promote(&mut self) {
        self.current_level += 1;
        self.correct_streak = 0;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
