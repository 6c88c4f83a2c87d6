//! Study topic extraction.
//!
//! Pulls topic names out of free text using a known-subject table, quoted
//! phrases, and "study X" patterns.

use regex::Regex;
use std::sync::LazyLock;

/// Common academic subjects recognized without further markup.
const KNOWN_SUBJECTS: &[&str] = &[
    "math",
    "calculus",
    "algebra",
    "geometry",
    "statistics",
    "physics",
    "chemistry",
    "biology",
    "anatomy",
    "history",
    "geography",
    "literature",
    "english",
    "computer science",
    "programming",
    "algorithms",
    "economics",
    "psychology",
    "sociology",
];

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']([^"']+)["']"#).expect("Invalid regex: quoted topics"));

static STUDY_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bstudy\s+([a-z][a-z ]{2,29}?)(?:\s+and\b|\s+for\b|\s+in\b|\s+exam\b|[,.!?]|$)")
        .expect("Invalid regex: study phrase")
});

/// Filler captured by the study-phrase pattern that is not a real topic.
const NOISE_WORDS: &[&str] = &["for", "my", "the", "a", "an", "this", "that"];
const NOISE_TOPICS: &[&str] = &["plan", "plans", "planning", "schedule", "session", "sessions", "time"];

/// Fallback topic when nothing could be extracted.
pub const DEFAULT_TOPIC: &str = "General Study";

/// Extracts study topics from text.
///
/// Falls back to a single generic topic when nothing is recognized.
pub fn extract_topics(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut topics: Vec<String> = Vec::new();

    for subject in KNOWN_SUBJECTS {
        if lower.contains(subject) {
            push_unique(&mut topics, title_case(subject));
        }
    }

    for caps in QUOTED.captures_iter(text) {
        let quoted = caps[1].trim();
        if !quoted.is_empty() {
            push_unique(&mut topics, quoted.to_string());
        }
    }

    for caps in STUDY_PHRASE.captures_iter(&lower) {
        if let Some(topic) = clean_study_capture(caps[1].trim()) {
            push_unique(&mut topics, topic);
        }
    }

    if topics.is_empty() {
        topics.push(DEFAULT_TOPIC.to_string());
    }

    topics
}

/// Strips leading filler words from a "study X" capture and drops captures
/// that are not topics at all ("study plan", "study time").
fn clean_study_capture(capture: &str) -> Option<String> {
    let words: Vec<&str> = capture
        .split_whitespace()
        .skip_while(|w| NOISE_WORDS.contains(&w.to_lowercase().as_str()))
        .collect();

    if words.is_empty() {
        return None;
    }
    if words.len() == 1 && NOISE_TOPICS.contains(&words[0].to_lowercase().as_str()) {
        return None;
    }

    Some(title_case(&words.join(" ")))
}

fn push_unique(topics: &mut Vec<String>, candidate: String) {
    // Case-insensitive dedup; also skip candidates already covered by a
    // longer topic ("Computer Science" covers "computer science").
    let lower = candidate.to_lowercase();
    if !topics.iter().any(|t| t.to_lowercase() == lower) {
        topics.push(candidate);
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_subjects() {
        let topics = extract_topics("I need to study physics and chemistry this week");
        assert!(topics.contains(&"Physics".to_string()));
        assert!(topics.contains(&"Chemistry".to_string()));
    }

    #[test]
    fn test_quoted_topics() {
        let topics = extract_topics("study plan for 'Linear Regression' please");
        assert!(topics.contains(&"Linear Regression".to_string()));
    }

    #[test]
    fn test_study_phrase() {
        let topics = extract_topics("study thermodynamics for the exam");
        assert!(topics.contains(&"Thermodynamics".to_string()));
    }

    #[test]
    fn test_fallback_topic() {
        let topics = extract_topics("help me get ready");
        assert_eq!(topics, vec![DEFAULT_TOPIC.to_string()]);
    }

    #[test]
    fn test_no_duplicates() {
        let topics = extract_topics("study physics, more physics, 'Physics'");
        let physics_count = topics
            .iter()
            .filter(|t| t.to_lowercase().contains("physics"))
            .count();
        assert_eq!(physics_count, 1);
    }
}
