//! MCQ synthesis from bank questions via the completion service.
//!
//! The synthesizer builds a deterministic instruction prompt, asks the
//! completion service for strict JSON, and parses it defensively: completion
//! backends routinely wrap JSON in code fences or add prose around it, so the
//! parser strips fences and slices from the first `{` to the last `}` before
//! handing the candidate to `serde_json`. Failures carry the raw completion
//! text for diagnostics and are surfaced to the caller; no retry happens here.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::domain::{ChoiceLetter, McqItem, Question};
use crate::ports::{CompletionOptions, CompletionService};

/// Failure to turn a bank question into a multiple-choice item.
#[derive(Debug, thiserror::Error)]
#[error("mcq synthesis failed: {reason}")]
pub struct SynthesisError {
    /// What went wrong.
    pub reason: String,
    /// Raw completion text, for diagnostics. Empty when the completion call
    /// itself failed.
    pub raw: String,
}

impl SynthesisError {
    fn new(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            raw: raw.into(),
        }
    }
}

/// Shape of the JSON the completion service is instructed to return.
#[derive(Debug, Deserialize)]
struct RawMcq {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    options: BTreeMap<String, String>,
    #[serde(default)]
    correct_option: Option<String>,
}

/// Turns bank questions into four-option MCQs through the completion service.
pub struct McqSynthesizer {
    completion: Arc<dyn CompletionService>,
    options: CompletionOptions,
}

impl McqSynthesizer {
    /// Creates a synthesizer using default generation options.
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            completion,
            options: CompletionOptions::default(),
        }
    }

    /// Overrides the generation options.
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Synthesizes an MCQ for a bank question.
    ///
    /// # Errors
    ///
    /// `SynthesisError` when the completion call fails or its output cannot
    /// be parsed into a well-formed four-option item.
    pub async fn synthesize(&self, question: &Question) -> Result<McqItem, SynthesisError> {
        let prompt = build_prompt(question);
        let raw = self
            .completion
            .complete(&prompt, &self.options)
            .await
            .map_err(|e| SynthesisError::new(e.to_string(), ""))?;

        parse_mcq(&raw, &question.question_text)
    }
}

/// Builds the instruction prompt for one question.
fn build_prompt(question: &Question) -> String {
    format!(
        concat!(
            "You are a cybersecurity training assistant.\n",
            "You will receive a training item from the database.\n",
            "Create ONE multiple-choice question with exactly four options A, B, C, and D.\n",
            "Make sure exactly ONE option is clearly correct.\n",
            "Respond STRICTLY in this JSON format (no extra text, no markdown, no code fences):\n\n",
            "{{\n",
            "  \"question\": \"...\",\n",
            "  \"options\": {{\n",
            "    \"A\": \"...\",\n",
            "    \"B\": \"...\",\n",
            "    \"C\": \"...\",\n",
            "    \"D\": \"...\"\n",
            "  }},\n",
            "  \"correct_option\": \"A\" | \"B\" | \"C\" | \"D\"\n",
            "}}\n\n",
            "Do NOT add ```json or ``` anywhere.\n\n",
            "Database question: {question}\n",
            "Reference answer: {answer}\n",
        ),
        question = question.question_text,
        answer = question.answer_text,
    )
}

/// Parses raw completion output into an `McqItem`.
///
/// `fallback_question` replaces a missing `question` field, matching the
/// behavior of asking the bank question verbatim when the model only returns
/// options.
fn parse_mcq(raw: &str, fallback_question: &str) -> Result<McqItem, SynthesisError> {
    let candidate = extract_json_candidate(raw);

    let parsed: RawMcq = serde_json::from_str(candidate)
        .map_err(|e| SynthesisError::new(format!("invalid JSON: {e}"), raw))?;

    let correct_option = parsed
        .correct_option
        .as_deref()
        .and_then(ChoiceLetter::parse)
        .ok_or_else(|| SynthesisError::new("correct_option is not one of A/B/C/D", raw))?;

    let mut options = BTreeMap::new();
    for letter in ChoiceLetter::ALL {
        let text = parsed
            .options
            .iter()
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(letter.as_str()))
            .map(|(_, v)| v.clone())
            .ok_or_else(|| {
                SynthesisError::new(format!("options is missing letter {letter}"), raw)
            })?;
        options.insert(letter, text);
    }

    let question_text = match parsed.question {
        Some(q) if !q.trim().is_empty() => q,
        _ => fallback_question.to_string(),
    };

    Ok(McqItem {
        question_text,
        options,
        correct_option,
    })
}

/// Slices the most plausible JSON object out of free-form completion text.
///
/// Strips a leading code-fence marker (with optional language tag) and a
/// trailing fence, then takes the substring between the first `{` and the
/// last `}` inclusive. When no such pair exists the cleaned text is returned
/// as-is and left to the JSON parser to reject.
fn extract_json_candidate(raw: &str) -> &str {
    let mut clean = raw.trim();

    if let Some(rest) = clean.strip_prefix("```") {
        // Drop the language tag up to the end of the fence line.
        clean = match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => rest,
        };
    }
    clean = clean.strip_suffix("```").unwrap_or(clean).trim();

    match (clean.find('{'), clean.rfind('}')) {
        (Some(start), Some(end)) if end > start => &clean[start..=end],
        _ => clean,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_JSON: &str = r#"{
        "question": "What does a firewall do?",
        "options": {
            "A": "Filters traffic",
            "B": "Encrypts disks",
            "C": "Generates passwords",
            "D": "Scans memory"
        },
        "correct_option": "A"
    }"#;

    #[test]
    fn parses_clean_json() {
        let item = parse_mcq(VALID_JSON, "fallback").unwrap();
        assert_eq!(item.question_text, "What does a firewall do?");
        assert_eq!(item.correct_option, ChoiceLetter::A);
        assert_eq!(item.options.len(), 4);
        assert_eq!(item.options[&ChoiceLetter::D], "Scans memory");
    }

    #[test]
    fn tolerates_code_fences() {
        let fenced = format!("```json\n{VALID_JSON}\n```");
        let item = parse_mcq(&fenced, "fallback").unwrap();
        assert_eq!(item.correct_option, ChoiceLetter::A);
    }

    #[test]
    fn tolerates_preamble_and_postamble() {
        let noisy = format!("Sure! Here is your question:\n{VALID_JSON}\nGood luck!");
        let item = parse_mcq(&noisy, "fallback").unwrap();
        assert_eq!(item.correct_option, ChoiceLetter::A);
    }

    #[test]
    fn normalizes_correct_option_case_and_whitespace() {
        let json = VALID_JSON.replace(
            r#""correct_option": "A""#,
            r#""correct_option": " b ""#,
        );
        let item = parse_mcq(&json, "fallback").unwrap();
        assert_eq!(item.correct_option, ChoiceLetter::B);
    }

    #[test]
    fn missing_correct_option_fails_with_raw_text() {
        let json = r#"{"question":"q","options":{"A":"1","B":"2","C":"3","D":"4"}}"#;
        let err = parse_mcq(json, "fallback").unwrap_err();
        assert!(err.reason.contains("correct_option"));
        assert_eq!(err.raw, json);
    }

    #[test]
    fn invalid_correct_option_fails() {
        let json = r#"{"options":{"A":"1","B":"2","C":"3","D":"4"},"correct_option":"E"}"#;
        assert!(parse_mcq(json, "fallback").is_err());
    }

    #[test]
    fn incomplete_options_fail() {
        let json = r#"{"question":"q","options":{"A":"1","B":"2"},"correct_option":"A"}"#;
        let err = parse_mcq(json, "fallback").unwrap_err();
        assert!(err.reason.contains("missing letter"));
    }

    #[test]
    fn non_json_fails_and_carries_raw() {
        let err = parse_mcq("I cannot answer that.", "fallback").unwrap_err();
        assert_eq!(err.raw, "I cannot answer that.");
    }

    #[test]
    fn missing_question_falls_back_to_bank_text() {
        let json = r#"{"options":{"A":"1","B":"2","C":"3","D":"4"},"correct_option":"C"}"#;
        let item = parse_mcq(json, "What is TLS?").unwrap();
        assert_eq!(item.question_text, "What is TLS?");
    }

    #[test]
    fn candidate_extraction_slices_between_braces() {
        assert_eq!(extract_json_candidate("noise {\"a\":1} trailing"), "{\"a\":1}");
        assert_eq!(extract_json_candidate("no braces here"), "no braces here");
    }

    #[test]
    fn prompt_embeds_question_and_reference_answer() {
        let question = Question {
            number: 3,
            level: 1,
            question_text: "What is phishing?".to_string(),
            answer_text: "Fraudulent messages that steal credentials.".to_string(),
            module: "general".to_string(),
        };
        let prompt = build_prompt(&question);
        assert!(prompt.contains("Database question: What is phishing?"));
        assert!(prompt.contains("Reference answer: Fraudulent messages"));
        assert!(prompt.contains("no code fences"));
    }
}
