//! Question bank loader.
//!
//! Parses a numbered question-and-answer text file and replaces the contents
//! of the `questions` table with it. Each entry starts with a line of the
//! form `N. question text`; subsequent lines up to the next numbered entry
//! form the reference answer.
//!
//! Usage: `load-questions [path]` (defaults to `questions.txt`).

use std::path::PathBuf;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use quiz_coach::config::AppConfig;
use quiz_coach::domain::Question;

const DEFAULT_LEVEL: u32 = 1;
const DEFAULT_MODULE: &str = "general";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("questions.txt"));

    let text = std::fs::read_to_string(&path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;

    let questions = parse_questions(&text);
    if questions.is_empty() {
        return Err(format!("no questions detected in {}", path.display()).into());
    }
    info!(count = questions.len(), file = %path.display(), "parsed question file");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM questions").execute(&mut *tx).await?;
    for q in &questions {
        sqlx::query(
            "INSERT INTO questions (number, level, question_text, answer_text, module) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(q.number)
        .bind(q.level as i32)
        .bind(&q.question_text)
        .bind(&q.answer_text)
        .bind(&q.module)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!(count = questions.len(), "question bank replaced");
    Ok(())
}

/// Splits the file into numbered blocks and builds one question per block.
fn parse_questions(text: &str) -> Vec<Question> {
    let mut questions = Vec::new();
    let mut current: Option<(i64, String, Vec<String>)> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some((number, question_text)) = split_numbered_line(trimmed) {
            if let Some(q) = current.take() {
                questions.push(finish(q));
            }
            current = Some((number, question_text.to_string(), Vec::new()));
        } else if let Some((_, _, answer_lines)) = current.as_mut() {
            if !trimmed.is_empty() {
                answer_lines.push(trimmed.to_string());
            }
        }
    }
    if let Some(q) = current.take() {
        questions.push(finish(q));
    }
    questions
}

/// Matches `N. rest` where N is a decimal number, returning both parts.
fn split_numbered_line(line: &str) -> Option<(i64, &str)> {
    let dot = line.find('.')?;
    let (head, tail) = line.split_at(dot);
    let number: i64 = head.parse().ok()?;
    let rest = tail[1..].trim();
    if rest.is_empty() {
        return None;
    }
    Some((number, rest))
}

fn finish((number, question_text, answer_lines): (i64, String, Vec<String>)) -> Question {
    Question {
        number,
        level: DEFAULT_LEVEL,
        question_text,
        answer_text: answer_lines.join(" "),
        module: DEFAULT_MODULE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
1. What is phishing?
A social engineering attack that tricks users
into revealing credentials.

2. What is a firewall?
A network device filtering traffic by policy.
";

    #[test]
    fn parses_numbered_blocks() {
        let questions = parse_questions(SAMPLE);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].number, 1);
        assert_eq!(questions[0].question_text, "What is phishing?");
        assert_eq!(
            questions[0].answer_text,
            "A social engineering attack that tricks users into revealing credentials."
        );
        assert_eq!(questions[1].number, 2);
        assert_eq!(questions[1].level, 1);
        assert_eq!(questions[1].module, "general");
    }

    #[test]
    fn ignores_preamble_before_first_number() {
        let questions = parse_questions("Intro text\nmore intro\n1. Q?\nA.");
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_text, "Q?");
    }

    #[test]
    fn non_numbered_dots_are_answer_text() {
        let questions = parse_questions("1. Q?\ne.g. an example line");
        assert_eq!(questions[0].answer_text, "e.g. an example line");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_questions("").is_empty());
        assert!(parse_questions("no numbers here").is_empty());
    }
}
