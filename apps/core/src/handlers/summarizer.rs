//! Summarization intent handler.
//!
//! Produces a summary plus flashcards from lecture content (inline text or a
//! file). The model collaborator does the heavy lifting when it is available;
//! otherwise deterministic sentence-scoring and definition-mining fallbacks
//! keep the handler functional offline.

use async_trait::async_trait;
use regex::Regex;
use sqlx::sqlite::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::LazyLock;
use tracing::warn;

use crate::actors::messages::AppError;
use crate::actors::traits::{IntentHandler, ModelBackend};
use crate::database;
use crate::evaluation;
use crate::models::{Flashcard, HandlerOutput, Request};
use crate::text_extract;

/// Minimum content size worth summarizing.
const MIN_CONTENT_WORDS: usize = 50;
const MAX_FALLBACK_FLASHCARDS: usize = 10;

const FILE_PREFIX: &str = "summarize file:";

static DEFINITION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"([A-Z][A-Za-z ]{2,30})\s+is\s+([^.!?]{10,100})")
            .expect("Invalid regex: is-definition"),
        Regex::new(r"([A-Z][A-Za-z ]{2,30}):\s+([^.!?]{10,100})")
            .expect("Invalid regex: colon-definition"),
        Regex::new(r"([A-Z][A-Za-z ]{2,30})\s+refers to\s+([^.!?]{10,100})")
            .expect("Invalid regex: refers-to-definition"),
        Regex::new(r"([A-Z][A-Za-z ]{2,30})\s+means\s+([^.!?]{10,100})")
            .expect("Invalid regex: means-definition"),
    ]
});

static CAPITALIZED_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]{2,}\b").expect("Invalid regex: capitalized term"));

pub struct SummarizeHandler {
    pool: SqlitePool,
    model: Option<Arc<dyn ModelBackend>>,
}

impl SummarizeHandler {
    pub fn new(pool: SqlitePool, model: Option<Arc<dyn ModelBackend>>) -> Self {
        Self { pool, model }
    }

    /// Resolves the lecture content: an explicit file reference, a bare path,
    /// or the input itself.
    fn extract_content(raw_text: &str) -> Result<String, AppError> {
        let trimmed = raw_text.trim();
        let lower = trimmed.to_lowercase();

        if let Some(rest) = lower.strip_prefix(FILE_PREFIX) {
            let offset = trimmed.len() - rest.len();
            let path = trimmed[offset..].trim();
            return Self::read_file(path);
        }

        if Path::new(trimmed).exists() {
            return Self::read_file(trimmed);
        }

        Ok(trimmed.to_string())
    }

    fn read_file(path: &str) -> Result<String, AppError> {
        let data = std::fs::read(path)?;
        text_extract::extract_text_from_file(path, &data)
    }

    async fn summarize(&self, content: &str) -> String {
        match &self.model {
            Some(model) => match model.generate_summary(content).await {
                Ok(summary) => summary,
                Err(e) => {
                    warn!("Model summary generation failed, using fallback: {}", e);
                    fallback_summary(content)
                }
            },
            None => fallback_summary(content),
        }
    }

    async fn make_flashcards(&self, content: &str, summary: &str) -> Vec<Flashcard> {
        match &self.model {
            Some(model) => match model.generate_flashcards(content, summary).await {
                Ok(cards) => cards,
                Err(e) => {
                    warn!("Model flashcard generation failed, using fallback: {}", e);
                    fallback_flashcards(content)
                }
            },
            None => fallback_flashcards(content),
        }
    }

    /// Stores results; persistence failures degrade to warnings.
    async fn save_results(&self, summary: &str, original_words: usize, cards: &[Flashcard]) {
        let summary_words = summary.split_whitespace().count();
        if let Err(e) = database::save_summary(
            &self.pool,
            summary,
            original_words as i64,
            summary_words as i64,
        )
        .await
        {
            warn!("Failed to save summary: {}", e);
        }

        for card in cards {
            if let Err(e) = database::save_flashcard(&self.pool, card).await {
                warn!("Failed to save flashcard: {}", e);
            }
        }
    }
}

#[async_trait]
impl IntentHandler for SummarizeHandler {
    async fn handle(&self, request: &Request) -> Result<HandlerOutput, AppError> {
        let content = Self::extract_content(&request.raw_text)?;

        if content.is_empty() {
            return Err(AppError::Validation(
                "No content found to summarize".to_string(),
            ));
        }

        let word_count = content.split_whitespace().count();
        if word_count < MIN_CONTENT_WORDS {
            return Err(AppError::Validation(format!(
                "Content too short ({} words). Please provide at least {} words.",
                word_count, MIN_CONTENT_WORDS
            )));
        }

        let summary = self.summarize(&content).await;
        let flashcards = self.make_flashcards(&content, &summary).await;

        self.save_results(&summary, word_count, &flashcards).await;

        // ROUGE-L of the summary against the source: how much of the original
        // wording survives.
        let retention = evaluation::rouge(&summary, &content).rouge_l;
        let summary_words = summary.split_whitespace().count();

        let message = format!("Generated summary and {} flashcards", flashcards.len());
        Ok(HandlerOutput::new(
            message,
            serde_json::json!({
                "summary": summary,
                "flashcards": flashcards,
                "word_count": word_count,
                "summary_words": summary_words,
                "information_retention": retention,
            }),
        ))
    }
}

/// Rule-based summarization fallback.
///
/// Scores sentences by position, keyword presence and length, then keeps the
/// top five.
fn fallback_summary(content: &str) -> String {
    const KEYWORDS: &[&str] = &[
        "important",
        "key",
        "main",
        "significant",
        "critical",
        "essential",
        "fundamental",
        "primary",
        "crucial",
    ];

    let sentences: Vec<&str> = content
        .split(['.', '!', '?'])
        .map(|s| s.trim())
        .filter(|s| s.len() > 20)
        .collect();

    let mut scored: Vec<(i32, &str)> = sentences
        .iter()
        .enumerate()
        .map(|(idx, sentence)| {
            let mut score = 0;

            // Opening sentences carry the framing
            if idx < 3 {
                score += 2;
            }

            let lower = sentence.to_lowercase();
            for keyword in KEYWORDS {
                if lower.contains(keyword) {
                    score += 1;
                }
            }

            let word_count = sentence.split_whitespace().count();
            if (10..=30).contains(&word_count) {
                score += 1;
            }

            (score, *sentence)
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut summary = scored
        .iter()
        .take(5)
        .map(|(_, s)| *s)
        .collect::<Vec<_>>()
        .join(". ");
    if !summary.ends_with('.') && !summary.is_empty() {
        summary.push('.');
    }

    summary
}

/// Rule-based flashcard fallback: mined definitions, recurring terms, and a
/// generic floor of three cards.
fn fallback_flashcards(content: &str) -> Vec<Flashcard> {
    let mut cards: Vec<Flashcard> = Vec::new();

    for pattern in DEFINITION_PATTERNS.iter() {
        for caps in pattern.captures_iter(content) {
            let term = caps[1].trim().to_string();
            let definition = caps[2].trim().to_string();

            cards.push(Flashcard {
                question: format!("What is {}?", term),
                answer: definition,
                category: "definition".to_string(),
            });
        }
    }

    // Recurring capitalized terms, excluding sentence-starting noise words
    const NOISE: &[&str] = &["The", "This", "That", "These", "Those"];
    let mut term_counts: HashMap<&str, usize> = HashMap::new();
    for m in CAPITALIZED_TERM.find_iter(content) {
        let term = m.as_str();
        if !NOISE.contains(&term) {
            *term_counts.entry(term).or_insert(0) += 1;
        }
    }

    let mut frequent: Vec<&str> = term_counts
        .iter()
        .filter(|(_, count)| **count >= 2)
        .map(|(term, _)| *term)
        .collect();
    frequent.sort(); // deterministic order

    for term in frequent.into_iter().take(5) {
        if let Ok(pattern) = Regex::new(&format!(r"\b{}\b[^.!?]*[.!?]", regex::escape(term))) {
            if let Some(m) = pattern.find(content) {
                cards.push(Flashcard {
                    question: format!("Explain the concept of {}", term),
                    answer: m.as_str().trim().to_string(),
                    category: "concept".to_string(),
                });
            }
        }
    }

    // Floor: at least a few generic cards from the opening sentences
    if cards.len() < 3 {
        for (idx, sentence) in content.split(['.', '!', '?']).take(3).enumerate() {
            let sentence = sentence.trim();
            if sentence.split_whitespace().count() > 10 {
                cards.push(Flashcard {
                    question: format!("What is discussed in point {}?", idx + 1),
                    answer: sentence.to_string(),
                    category: "general".to_string(),
                });
            }
        }
    }

    // Dedup on normalized question, cap the total
    let mut seen: HashSet<String> = HashSet::new();
    cards
        .into_iter()
        .filter(|card| seen.insert(card.question.trim().to_lowercase()))
        .take(MAX_FALLBACK_FLASHCARDS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LECTURE: &str = "Photosynthesis is the process by which plants convert light \
        energy into chemical energy. The key reaction takes place in the chloroplast. \
        Chlorophyll absorbs light most strongly in the blue and red parts of the spectrum. \
        The light reactions produce ATP and NADPH for the Calvin cycle. The Calvin cycle \
        uses carbon dioxide to build sugars. This process is essential for most life on \
        Earth because it produces both food and oxygen.";

    #[test]
    fn test_fallback_summary_selects_sentences() {
        let summary = fallback_summary(LECTURE);
        assert!(!summary.is_empty());
        assert!(summary.ends_with('.'));
        // The keyword-bearing opening sentence should survive
        assert!(summary.contains("Photosynthesis"));
    }

    #[test]
    fn test_fallback_summary_empty_content() {
        assert_eq!(fallback_summary(""), "");
    }

    #[test]
    fn test_fallback_flashcards_find_definitions() {
        let cards = fallback_flashcards(LECTURE);
        assert!(!cards.is_empty());
        assert!(cards.len() <= MAX_FALLBACK_FLASHCARDS);
        assert!(cards
            .iter()
            .any(|c| c.question.contains("Photosynthesis")));
    }

    #[test]
    fn test_fallback_flashcards_dedup() {
        let cards = fallback_flashcards(LECTURE);
        let questions: std::collections::HashSet<String> =
            cards.iter().map(|c| c.question.to_lowercase()).collect();
        assert_eq!(questions.len(), cards.len());
    }

    #[test]
    fn test_extract_content_passthrough() {
        let content = SummarizeHandler::extract_content("just some lecture text");
        assert_eq!(content.unwrap(), "just some lecture text");
    }

    #[test]
    fn test_extract_content_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "file based lecture notes").unwrap();

        let input = format!("Summarize file: {}", path.display());
        let content = SummarizeHandler::extract_content(&input).unwrap();
        assert_eq!(content, "file based lecture notes");
    }

    #[test]
    fn test_extract_content_missing_file() {
        let input = "Summarize file: /nonexistent/notes.txt";
        assert!(SummarizeHandler::extract_content(input).is_err());
    }
}
