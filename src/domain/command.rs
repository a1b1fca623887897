//! Command classification for inbound chat text.
//!
//! A single classifier with an explicit priority order:
//! **stop > next > start > answer > default**. Substring triggers can
//! otherwise overlap ambiguously (a message containing both "start training"
//! and "stop training" must stop).

use super::question::ChoiceLetter;

/// Exact-match synonyms that also stop training.
const STOP_SYNONYMS: [&str; 3] = ["exit training", "quit training", "exit"];

/// A classified user command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Leave training mode.
    StopTraining,
    /// Fetch another question while in training.
    NextQuestion,
    /// Enter training mode and fetch a question.
    StartTraining,
    /// A candidate answer letter; only meaningful with a pending question.
    Answer(ChoiceLetter),
    /// Everything else: delegate to default chat.
    Chat,
}

/// Classifies message text into a command.
///
/// Matching is performed on the trimmed, lower-cased text. The classifier is
/// state-free; the trainer decides whether `NextQuestion` or `Answer` apply in
/// the current session state.
pub fn classify(text: &str) -> Command {
    let normalized = text.trim().to_lowercase();

    if normalized.contains("stop training") || STOP_SYNONYMS.contains(&normalized.as_str()) {
        return Command::StopTraining;
    }
    if normalized.contains("next question") || normalized == "next" {
        return Command::NextQuestion;
    }
    if normalized.contains("start training") {
        return Command::StartTraining;
    }
    if let Some(letter) = ChoiceLetter::extract(text) {
        return Command::Answer(letter);
    }
    Command::Chat
}

/// Removes a leading `<@UXXXX>` mention from message text.
///
/// App mentions arrive as `<@BOT_ID> actual text`; everything up to and
/// including the first `>` after the mention marker is dropped.
pub fn strip_mention_markup(text: &str) -> String {
    if let Some(start) = text.find("<@") {
        if let Some(end) = text[start..].find('>') {
            let mut cleaned = String::with_capacity(text.len());
            cleaned.push_str(&text[..start]);
            cleaned.push_str(&text[start + end + 1..]);
            return cleaned.trim().to_string();
        }
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_wins_over_start_when_both_present() {
        assert_eq!(
            classify("please start training no wait stop training"),
            Command::StopTraining
        );
    }

    #[test]
    fn stop_synonyms_match_exactly() {
        assert_eq!(classify("exit"), Command::StopTraining);
        assert_eq!(classify("quit training"), Command::StopTraining);
        assert_eq!(classify("EXIT TRAINING"), Command::StopTraining);
        // "exit" only as the whole message, not a substring.
        assert_eq!(classify("what is an exit node?"), Command::Chat);
    }

    #[test]
    fn next_matches_exact_and_substring() {
        assert_eq!(classify("next"), Command::NextQuestion);
        assert_eq!(classify("Next"), Command::NextQuestion);
        assert_eq!(classify("give me the next question"), Command::NextQuestion);
    }

    #[test]
    fn next_wins_over_start() {
        assert_eq!(
            classify("start training with the next question"),
            Command::NextQuestion
        );
    }

    #[test]
    fn start_matches_substring() {
        assert_eq!(classify("can we start training now?"), Command::StartTraining);
    }

    #[test]
    fn letters_classify_as_answers() {
        assert_eq!(classify("b"), Command::Answer(ChoiceLetter::B));
        assert_eq!(classify("C please"), Command::Answer(ChoiceLetter::C));
    }

    #[test]
    fn free_text_falls_through_to_chat() {
        assert_eq!(classify("what is a firewall?"), Command::Chat);
        assert_eq!(classify("I don't know"), Command::Chat);
    }

    #[test]
    fn strip_mention_removes_leading_mention() {
        assert_eq!(strip_mention_markup("<@U0BOT> start training"), "start training");
    }

    #[test]
    fn strip_mention_keeps_text_without_mention() {
        assert_eq!(strip_mention_markup("  hello there "), "hello there");
    }

    #[test]
    fn strip_mention_handles_mid_text_mention() {
        assert_eq!(strip_mention_markup("hey <@U0BOT> next"), "hey  next");
    }
}
