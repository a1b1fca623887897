//! Session state machine: command handling, answer evaluation, leveling.
//!
//! The trainer owns every mutation of `UserSession`. Each user's handling is
//! serialized through a keyed async mutex so the read-modify-write against
//! the session store behaves as a single logical transaction even when two
//! events from the same user race.
//!
//! Every error inside a handling unit is caught at its boundary and turned
//! into a user-visible chat message; nothing propagates out of
//! [`Trainer::handle_message`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

use crate::domain::{
    classify, ChoiceLetter, Command, PendingQuestion, UserSession, LEVEL_UP_THRESHOLD,
};
use crate::ports::{
    BankError, CompletionOptions, CompletionService, Messenger, QuestionBank, SessionStore,
    StoreError,
};

use super::mcq_synthesizer::McqSynthesizer;

const REPROMPT_MESSAGE: &str =
    "❓ I could not detect a valid option in your answer.\nPlease reply with A, B, C or D.";

const SYNTHESIS_APOLOGY: &str = "😕 I could not prepare a multiple-choice question right now.\n\
     Say \"next question\" to try again, or \"stop training\" to leave training mode.";

const CHAT_FAILURE_MESSAGE: &str = "❌ Sorry, something went wrong in normal chat mode.";

const INTERNAL_FAILURE_MESSAGE: &str =
    "❌ Sorry, something went wrong while handling your message. Please try again.";

/// Internal fault while handling a message. Converted into a user-visible
/// apology at the task boundary, never propagated.
#[derive(Debug, thiserror::Error)]
enum TrainerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Bank(#[from] BankError),
}

/// Drives per-user training sessions.
pub struct Trainer {
    sessions: Arc<dyn SessionStore>,
    bank: Arc<dyn QuestionBank>,
    messenger: Arc<dyn Messenger>,
    completion: Arc<dyn CompletionService>,
    synthesizer: McqSynthesizer,
    chat_options: CompletionOptions,
    user_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Trainer {
    /// Wires a trainer from its injected collaborators.
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        bank: Arc<dyn QuestionBank>,
        messenger: Arc<dyn Messenger>,
        completion: Arc<dyn CompletionService>,
    ) -> Self {
        Self {
            sessions,
            bank,
            messenger,
            synthesizer: McqSynthesizer::new(completion.clone()),
            completion,
            chat_options: CompletionOptions::default(),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Overrides the completion options used for synthesis and chat.
    pub fn with_completion_options(mut self, options: CompletionOptions) -> Self {
        self.synthesizer = McqSynthesizer::new(self.completion.clone()).with_options(options.clone());
        self.chat_options = options;
        self
    }

    /// Handles one cleaned inbound message for a user/channel pair.
    ///
    /// Never fails: internal errors are logged and answered with an apology.
    pub async fn handle_message(&self, user: &str, channel: &str, text: &str) {
        let lock = self.lock_for(user);
        let _guard = lock.lock().await;

        if let Err(e) = self.handle_inner(user, channel, text).await {
            error!(user, error = %e, "message handling failed");
            self.deliver(channel, INTERNAL_FAILURE_MESSAGE).await;
        }
    }

    async fn handle_inner(
        &self,
        user: &str,
        channel: &str,
        text: &str,
    ) -> Result<(), TrainerError> {
        let existing = self.sessions.find(user).await?;
        let newly_created = existing.is_none();
        let mut session = existing.unwrap_or_else(|| UserSession::new(user));

        match classify(text) {
            Command::StopTraining => {
                session.stop_training();
                self.sessions.upsert(&session).await?;
                info!(user, "training stopped");
                self.deliver(
                    channel,
                    &format!("🛑 Training mode stopped for <@{user}>. You can now chat normally."),
                )
                .await;
            }
            Command::StartTraining => {
                session.begin_training();
                self.sessions.upsert(&session).await?;
                info!(user, level = session.current_level(), "training started");
                self.send_fresh_question(&mut session, user, channel).await?;
            }
            Command::NextQuestion if session.in_training() => {
                self.send_fresh_question(&mut session, user, channel).await?;
            }
            Command::Answer(letter) if session.pending_question().is_some() => {
                self.evaluate_answer(&mut session, channel, letter).await?;
            }
            Command::NextQuestion | Command::Answer(_) | Command::Chat => {
                if session.pending_question().is_some() {
                    // Awaiting a letter but none was found: re-prompt, stay.
                    self.deliver(channel, REPROMPT_MESSAGE).await;
                } else {
                    if newly_created {
                        self.sessions.upsert(&session).await?;
                    }
                    self.default_chat(user, channel, text).await;
                }
            }
        }

        Ok(())
    }

    /// Samples a question at the session's level, synthesizes an MCQ and
    /// sends it. The pending question is persisted before the send.
    async fn send_fresh_question(
        &self,
        session: &mut UserSession,
        user: &str,
        channel: &str,
    ) -> Result<(), TrainerError> {
        let level = session.current_level();

        let question = match self.bank.sample_at_level(level).await? {
            Some(q) => q,
            None => {
                self.deliver(
                    channel,
                    &format!(
                        "Hi <@{user}>! I could not find any training questions \
                         for level {level} in the database yet."
                    ),
                )
                .await;
                return Ok(());
            }
        };

        match self.synthesizer.synthesize(&question).await {
            Ok(mcq) => {
                session.set_pending_question(PendingQuestion {
                    number: question.number,
                    reference_answer: question.answer_text.clone(),
                    correct_option: mcq.correct_option,
                });
                self.sessions.upsert(session).await?;
                self.deliver(channel, &mcq.render(level, question.number)).await;
            }
            Err(e) => {
                // Training flag stays as-is so "next question" retries.
                warn!(user, reason = %e.reason, raw = %e.raw, "mcq synthesis failed");
                self.deliver(channel, SYNTHESIS_APOLOGY).await;
            }
        }

        Ok(())
    }

    /// Evaluates a resolved letter against the pending question.
    async fn evaluate_answer(
        &self,
        session: &mut UserSession,
        channel: &str,
        letter: ChoiceLetter,
    ) -> Result<(), TrainerError> {
        let pending = match session.pending_question() {
            Some(p) => p.clone(),
            None => return Ok(()),
        };

        let mut message;
        if letter == pending.correct_option {
            let streak = session.record_correct();
            message = format!(
                "✅ *Your answer for Question #{} is CORRECT!* 🎉\n\n*Correct option:* {}\n",
                pending.number, pending.correct_option
            );
            if !pending.reference_answer.is_empty() {
                message.push_str(&format!("*Explanation:* {}\n", pending.reference_answer));
            }

            if streak >= LEVEL_UP_THRESHOLD {
                let next_level = session.current_level() + 1;
                if self.bank.count_at_level(next_level).await? > 0 {
                    session.promote();
                    info!(
                        user = session.user_id(),
                        level = session.current_level(),
                        "level promotion"
                    );
                    message.push_str(&format!(
                        "\n\n🏆 You have answered {LEVEL_UP_THRESHOLD} questions correctly in a row.\n\
                         You are now promoted to *Level {}*!",
                        session.current_level()
                    ));
                } else {
                    message.push_str(&format!(
                        "\n\nℹ️ You reached the threshold to move to Level {next_level}, \
                         but there are no questions configured for that level yet."
                    ));
                }
            }
        } else {
            session.record_incorrect();
            message = format!(
                "❌ *Your answer for Question #{} is INCORRECT.*\n\n*Correct option:* {}\n",
                pending.number, pending.correct_option
            );
            if !pending.reference_answer.is_empty() {
                message.push_str(&format!("*Explanation:* {}\n", pending.reference_answer));
            }
        }

        // Persist the resolved session before any reply goes out.
        self.sessions.upsert(session).await?;
        self.deliver(channel, &message).await;
        Ok(())
    }

    /// Proxies a message to the completion service with echo and status
    /// diagnostics. Upstream failures degrade to an apology.
    async fn default_chat(&self, user: &str, channel: &str, text: &str) {
        let echo = self.completion.echo(text);
        let status = self.completion.ping().await;

        match self.completion.complete(text, &self.chat_options).await {
            Ok(answer) => {
                self.deliver(
                    channel,
                    &format!(
                        "👋 Hello <@{user}>!\n*Echo:* {echo}\n\n*Answer:*\n{answer}\n\n\
                         LLM Status: `{status}`"
                    ),
                )
                .await;
            }
            Err(e) => {
                warn!(user, error = %e, "default chat completion failed");
                self.deliver(channel, CHAT_FAILURE_MESSAGE).await;
            }
        }
    }

    /// Sends a message; delivery errors are logged, never retried.
    async fn deliver(&self, channel: &str, text: &str) {
        if let Err(e) = self.messenger.send_message(channel, text).await {
            error!(channel, error = %e, "message delivery failed");
        }
    }

    /// Returns the serialization lock for a user, creating it on first use.
    fn lock_for(&self, user: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.user_locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks
            .entry(user.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}
