//! Intent classification using regex patterns.
//!
//! Fast pattern-based routing for study-assistant requests.
//! No model call involved - pure Rust regex matching.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Detected intent type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Calendar operations (schedule, remind, book, etc.)
    Schedule,
    /// Lecture summarization and flashcards (summarize, notes, etc.)
    Summarize,
    /// Study plan generation (study plan, study for, etc.)
    Plan,
    /// Content quality evaluation (evaluate, score, metrics, etc.)
    Evaluate,
    /// Unknown/Default
    Unknown,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Intent {
    /// Returns a human-readable label for the intent
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Schedule => "schedule",
            Intent::Summarize => "summarize",
            Intent::Plan => "plan",
            Intent::Evaluate => "evaluate",
            Intent::Unknown => "unknown",
        }
    }
}

/// Result of intent classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResult {
    /// Detected intent
    pub intent: Intent,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Patterns that matched
    pub matched_patterns: Vec<String>,
}

/// Pattern definition for intent matching
struct IntentPattern {
    intent: Intent,
    patterns: &'static [Regex],
    weight: f32,
}

/// Intent classifier using regex patterns.
///
/// Groups are checked in a fixed priority order (Schedule, Summarize, Plan,
/// Evaluate); the first group with at least one matching pattern wins.
pub struct IntentClassifier {
    patterns: Vec<IntentPattern>,
}

// Compile patterns once at startup; expect() is acceptable here since a bad
// pattern is unrecoverable.
static SCHEDULE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(schedule|reschedule)\b").expect("Invalid regex: schedule verbs"),
        Regex::new(r"(?i)\b(calendar|event|meeting|appointment)\b")
            .expect("Invalid regex: calendar nouns"),
        Regex::new(r"(?i)\b(remind|reminder)\b").expect("Invalid regex: reminder words"),
        Regex::new(r"(?i)\b(book|reserve)\b").expect("Invalid regex: booking verbs"),
        Regex::new(r"(?i)\bplan\b.*\btime\b").expect("Invalid regex: plan-time phrase"),
    ]
});

static SUMMARIZE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(summarize|summarise|summary)\b")
            .expect("Invalid regex: summary verbs"),
        Regex::new(r"(?i)\bflashcards?\b").expect("Invalid regex: flashcard nouns"),
        Regex::new(r"(?i)\b(notes|lecture)\b").expect("Invalid regex: lecture nouns"),
        Regex::new(r"(?i)\bstudy\s+materials?\b").expect("Invalid regex: study material phrase"),
        Regex::new(r"(?i)\bkey\s+points\b").expect("Invalid regex: key points phrase"),
    ]
});

static PLAN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\bstudy\s+plan\b").expect("Invalid regex: study plan phrase"),
        Regex::new(r"(?i)\bstudy\s+for\b").expect("Invalid regex: study-for phrase"),
        Regex::new(r"(?i)\b(learning|revision|preparation)\s+plan\b")
            .expect("Invalid regex: plan synonyms"),
        Regex::new(r"(?i)\borgani[sz]e\b.*\bstud(y|ies|ying)\b")
            .expect("Invalid regex: organize-study phrase"),
        Regex::new(r"(?i)\bprepare\s+for\b.*\b(exam|test|quiz)\b")
            .expect("Invalid regex: exam preparation phrase"),
    ]
});

static EVALUATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(evaluate|evaluation|assess|assessment)\b")
            .expect("Invalid regex: evaluation verbs"),
        Regex::new(r"(?i)\b(quality|performance)\b").expect("Invalid regex: quality nouns"),
        Regex::new(r"(?i)\b(metrics?|scores?)\b").expect("Invalid regex: metric nouns"),
    ]
});

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    /// Create a new intent classifier with all patterns
    pub fn new() -> Self {
        let patterns = vec![
            IntentPattern {
                intent: Intent::Schedule,
                patterns: &SCHEDULE_PATTERNS,
                weight: 1.0, // High priority - "schedule" always routes here
            },
            IntentPattern {
                intent: Intent::Summarize,
                patterns: &SUMMARIZE_PATTERNS,
                weight: 0.9,
            },
            IntentPattern {
                intent: Intent::Plan,
                patterns: &PLAN_PATTERNS,
                weight: 0.85,
            },
            IntentPattern {
                intent: Intent::Evaluate,
                patterns: &EVALUATE_PATTERNS,
                weight: 0.8,
            },
        ];

        Self { patterns }
    }

    /// Classify the intent of a text.
    ///
    /// Deterministic: the first pattern group (in priority order) with a
    /// match decides the intent. Empty or unmatched text yields
    /// `Intent::Unknown`.
    pub fn classify(&self, text: &str) -> IntentResult {
        let text = text.trim();

        if text.is_empty() {
            return IntentResult {
                intent: Intent::Unknown,
                confidence: 0.0,
                matched_patterns: vec![],
            };
        }

        for pattern_group in &self.patterns {
            let mut match_count = 0;
            let mut matched_patterns = Vec::new();

            for pattern in pattern_group.patterns {
                if let Some(m) = pattern.find(text) {
                    match_count += 1;
                    matched_patterns.push(m.as_str().to_string());
                }
            }

            if match_count > 0 {
                let pattern_count = pattern_group.patterns.len() as f32;
                let match_ratio = match_count as f32 / pattern_count;
                let confidence = (match_ratio * pattern_group.weight * 2.0).min(1.0);

                return IntentResult {
                    intent: pattern_group.intent,
                    confidence,
                    matched_patterns,
                };
            }
        }

        IntentResult {
            intent: Intent::Unknown,
            confidence: 0.0,
            matched_patterns: vec![],
        }
    }
}
