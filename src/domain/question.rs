//! Question bank entities and multiple-choice value objects.
//!
//! `Question` rows are owned by the question bank and are read-only from the
//! core's perspective: they are sampled, never written. `McqItem` is the
//! ephemeral four-option item produced by the synthesizer; only the fields
//! folded into the session's pending question outlive the send.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A training question as stored in the question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Stable question number, unique within the bank.
    pub number: i64,
    /// Difficulty tier gating when this question is sampled.
    pub level: u32,
    /// The question text shown to trainees.
    pub question_text: String,
    /// Reference answer, used as the explanation after evaluation.
    pub answer_text: String,
    /// Curriculum module this question belongs to.
    pub module: String,
}

/// One of the four answer options of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChoiceLetter {
    A,
    B,
    C,
    D,
}

impl ChoiceLetter {
    /// All letters in display order.
    pub const ALL: [ChoiceLetter; 4] = [
        ChoiceLetter::A,
        ChoiceLetter::B,
        ChoiceLetter::C,
        ChoiceLetter::D,
    ];

    /// Returns the letter as an upper-case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChoiceLetter::A => "A",
            ChoiceLetter::B => "B",
            ChoiceLetter::C => "C",
            ChoiceLetter::D => "D",
        }
    }

    /// Parses a normalized (trimmed, case-insensitive) single letter.
    ///
    /// Returns `None` for anything that is not exactly one of A/B/C/D.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Some(ChoiceLetter::A),
            "B" => Some(ChoiceLetter::B),
            "C" => Some(ChoiceLetter::C),
            "D" => Some(ChoiceLetter::D),
            _ => None,
        }
    }

    /// Extracts a single answer letter from free-form reply text.
    ///
    /// A letter matches when the normalized text is exactly the letter, starts
    /// with the letter followed by a space, or contains the letter surrounded
    /// by spaces. Letters are tried in order, so the first match wins.
    pub fn extract(text: &str) -> Option<Self> {
        let normalized = text.trim().to_ascii_uppercase();
        for letter in Self::ALL {
            let l = letter.as_str();
            if normalized == l
                || normalized.starts_with(&format!("{l} "))
                || normalized.contains(&format!(" {l} "))
            {
                return Some(letter);
            }
        }
        None
    }
}

impl fmt::Display for ChoiceLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A synthesized multiple-choice item with exactly one correct option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McqItem {
    /// The (possibly rephrased) question text.
    pub question_text: String,
    /// Option text per letter; always contains all four letters.
    pub options: BTreeMap<ChoiceLetter, String>,
    /// The single correct option.
    pub correct_option: ChoiceLetter,
}

impl McqItem {
    /// Renders the item as a chat message body with lettered options.
    pub fn render(&self, level: u32, number: i64) -> String {
        let mut lines = format!(
            "🎓 *Training mode* — Level {level}\n\nQuestion #{number}:\n{}\n\n",
            self.question_text
        );
        for letter in ChoiceLetter::ALL {
            let option = self.options.get(&letter).map(String::as_str).unwrap_or("");
            lines.push_str(&format!("{letter}) {option}\n"));
        }
        lines.push_str("\nPlease answer by typing A, B, C or D.");
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_all_four_letters_case_insensitively() {
        assert_eq!(ChoiceLetter::parse("A"), Some(ChoiceLetter::A));
        assert_eq!(ChoiceLetter::parse("b"), Some(ChoiceLetter::B));
        assert_eq!(ChoiceLetter::parse(" c "), Some(ChoiceLetter::C));
        assert_eq!(ChoiceLetter::parse("d"), Some(ChoiceLetter::D));
    }

    #[test]
    fn parse_rejects_non_letters() {
        assert_eq!(ChoiceLetter::parse("E"), None);
        assert_eq!(ChoiceLetter::parse("AB"), None);
        assert_eq!(ChoiceLetter::parse(""), None);
    }

    #[test]
    fn extract_finds_exact_letter() {
        assert_eq!(ChoiceLetter::extract("A"), Some(ChoiceLetter::A));
        assert_eq!(ChoiceLetter::extract("b"), Some(ChoiceLetter::B));
    }

    #[test]
    fn extract_finds_letter_with_trailing_words() {
        assert_eq!(ChoiceLetter::extract("C please"), Some(ChoiceLetter::C));
    }

    #[test]
    fn extract_trims_surrounding_whitespace() {
        assert_eq!(ChoiceLetter::extract(" D "), Some(ChoiceLetter::D));
    }

    #[test]
    fn extract_finds_letter_surrounded_by_spaces() {
        assert_eq!(
            ChoiceLetter::extract("maybe B perhaps"),
            Some(ChoiceLetter::B)
        );
    }

    #[test]
    fn extract_returns_none_without_a_clear_letter() {
        assert_eq!(ChoiceLetter::extract("I don't know"), None);
        assert_eq!(ChoiceLetter::extract("what are the options?"), None);
        assert_eq!(ChoiceLetter::extract(""), None);
    }

    #[test]
    fn render_lists_all_options_in_order() {
        let mut options = BTreeMap::new();
        options.insert(ChoiceLetter::A, "first".to_string());
        options.insert(ChoiceLetter::B, "second".to_string());
        options.insert(ChoiceLetter::C, "third".to_string());
        options.insert(ChoiceLetter::D, "fourth".to_string());
        let item = McqItem {
            question_text: "Which?".to_string(),
            options,
            correct_option: ChoiceLetter::B,
        };

        let rendered = item.render(2, 7);
        assert!(rendered.contains("Level 2"));
        assert!(rendered.contains("Question #7"));
        assert!(rendered.contains("A) first"));
        assert!(rendered.contains("D) fourth"));
        assert!(rendered.contains("typing A, B, C or D"));
    }
}
