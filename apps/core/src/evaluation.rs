//! Content quality metrics.
//!
//! Lightweight ROUGE/BLEU implementations for reference-based comparison and
//! heuristic quality scoring for flashcards and summaries. Everything here is
//! pure; the evaluator handler decides what to score and where results go.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{Flashcard, StoredSummary};

/// ROUGE scores for a generated/reference text pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RougeScores {
    pub rouge_1: f64,
    pub rouge_2: f64,
    pub rouge_l: f64,
}

/// Aggregated flashcard quality metrics, each in `0.0..=1.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardMetrics {
    pub clarity: f64,
    pub completeness: f64,
    pub difficulty: f64,
    pub overall_quality: f64,
}

/// Aggregated summary quality metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetrics {
    /// Average summary-to-original length ratio.
    pub compression_ratio: f64,
    /// Average coherence heuristic, `0.0..=1.0`.
    pub coherence: f64,
}

/// Direction of recent evaluation scores compared with older ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

fn ngrams(tokens: &[String], n: usize) -> HashSet<Vec<String>> {
    if tokens.len() < n || n == 0 {
        return HashSet::new();
    }
    tokens.windows(n).map(|w| w.to_vec()).collect()
}

/// Recall-based ROUGE-N: matched reference n-grams over total reference n-grams.
fn rouge_n(generated: &[String], reference: &[String], n: usize) -> f64 {
    let gen_ngrams = ngrams(generated, n);
    let ref_ngrams = ngrams(reference, n);

    if ref_ngrams.is_empty() {
        return 0.0;
    }

    let overlap = gen_ngrams.intersection(&ref_ngrams).count();
    overlap as f64 / ref_ngrams.len() as f64
}

fn lcs_length(seq1: &[String], seq2: &[String]) -> usize {
    let (m, n) = (seq1.len(), seq2.len());
    let mut dp = vec![vec![0usize; n + 1]; m + 1];

    for i in 1..=m {
        for j in 1..=n {
            if seq1[i - 1] == seq2[j - 1] {
                dp[i][j] = dp[i - 1][j - 1] + 1;
            } else {
                dp[i][j] = dp[i - 1][j].max(dp[i][j - 1]);
            }
        }
    }

    dp[m][n]
}

/// F-measure over the longest common subsequence.
fn rouge_l(generated: &[String], reference: &[String]) -> f64 {
    if generated.is_empty() || reference.is_empty() {
        return 0.0;
    }

    let lcs = lcs_length(generated, reference) as f64;
    let recall = lcs / reference.len() as f64;
    let precision = lcs / generated.len() as f64;

    if precision + recall == 0.0 {
        return 0.0;
    }

    (2.0 * precision * recall) / (precision + recall)
}

/// Computes ROUGE-1, ROUGE-2 and ROUGE-L for a generated/reference pair.
pub fn rouge(generated: &str, reference: &str) -> RougeScores {
    let gen_tokens = tokenize(generated);
    let ref_tokens = tokenize(reference);

    RougeScores {
        rouge_1: rouge_n(&gen_tokens, &ref_tokens, 1),
        rouge_2: rouge_n(&gen_tokens, &ref_tokens, 2),
        rouge_l: rouge_l(&gen_tokens, &ref_tokens),
    }
}

/// Simplified BLEU: geometric mean of 1-4 gram precisions with a brevity penalty.
#[allow(dead_code)]
pub fn bleu(generated: &str, reference: &str) -> f64 {
    let gen_tokens = tokenize(generated);
    let ref_tokens = tokenize(reference);

    if gen_tokens.is_empty() || ref_tokens.is_empty() {
        return 0.0;
    }

    let mut precisions = Vec::new();
    for n in 1..=4 {
        if gen_tokens.len() < n {
            break;
        }

        let gen_ngrams = ngrams(&gen_tokens, n);
        let ref_ngrams = ngrams(&ref_tokens, n);

        if gen_ngrams.is_empty() {
            continue;
        }

        let overlap = gen_ngrams.intersection(&ref_ngrams).count();
        precisions.push(overlap as f64 / gen_ngrams.len() as f64);
    }

    if precisions.is_empty() {
        return 0.0;
    }

    let log_sum: f64 = precisions.iter().map(|p| (p + 1e-10).ln()).sum();
    let score = (log_sum / precisions.len() as f64).exp();

    let brevity_penalty = if gen_tokens.len() < ref_tokens.len() {
        (1.0 - ref_tokens.len() as f64 / gen_tokens.len() as f64).exp()
    } else {
        1.0
    };

    score * brevity_penalty
}

/// Scores question clarity (0-1): interrogative opener, question mark, length.
pub fn score_clarity(question: &str) -> f64 {
    let mut score: f64 = 0.5;
    let lower = question.to_lowercase();

    const INTERROGATIVES: &[&str] = &[
        "what", "how", "why", "when", "where", "who", "which", "explain", "describe",
    ];
    if INTERROGATIVES.iter().any(|w| lower.starts_with(w)) {
        score += 0.2;
    }

    if question.trim().ends_with('?') {
        score += 0.15;
    }

    let word_count = question.split_whitespace().count();
    if (5..=20).contains(&word_count) {
        score += 0.15;
    }

    score.min(1.0)
}

/// Scores answer completeness (0-1): length band and closing punctuation.
pub fn score_completeness(answer: &str) -> f64 {
    let mut score: f64 = 0.5;

    let word_count = answer.split_whitespace().count();
    if (5..=50).contains(&word_count) {
        score += 0.3;
    } else if word_count > 50 {
        score += 0.2;
    }

    if matches!(answer.trim().chars().last(), Some('.') | Some('!')) {
        score += 0.2;
    }

    score.min(1.0)
}

/// Estimates question difficulty (0-1) from answer length and multi-part questions.
pub fn estimate_difficulty(question: &str, answer: &str) -> f64 {
    let answer_words = answer.split_whitespace().count() as f64;
    let mut complexity = (answer_words / 50.0).min(1.0);

    let lower = question.to_lowercase();
    if lower.contains(" and ") || question.contains(',') {
        complexity += 0.2;
    }

    complexity.min(1.0)
}

/// Aggregates quality metrics over a batch of flashcards.
pub fn flashcard_quality(cards: &[Flashcard]) -> FlashcardMetrics {
    if cards.is_empty() {
        return FlashcardMetrics {
            clarity: 0.0,
            completeness: 0.0,
            difficulty: 0.0,
            overall_quality: 0.0,
        };
    }

    let count = cards.len() as f64;
    let clarity: f64 = cards.iter().map(|c| score_clarity(&c.question)).sum::<f64>() / count;
    let completeness: f64 = cards
        .iter()
        .map(|c| score_completeness(&c.answer))
        .sum::<f64>()
        / count;
    let difficulty: f64 = cards
        .iter()
        .map(|c| estimate_difficulty(&c.question, &c.answer))
        .sum::<f64>()
        / count;

    FlashcardMetrics {
        clarity,
        completeness,
        difficulty,
        overall_quality: (clarity + completeness) / 2.0,
    }
}

/// Coherence heuristic (0-1): multiple sentences and transition words.
pub fn score_coherence(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let mut score: f64 = 0.5;

    let sentence_count = text.split('.').filter(|s| !s.trim().is_empty()).count();
    if sentence_count >= 3 {
        score += 0.2;
    }

    const TRANSITIONS: &[&str] = &[
        "however",
        "therefore",
        "furthermore",
        "additionally",
        "consequently",
    ];
    let lower = text.to_lowercase();
    if TRANSITIONS.iter().any(|w| lower.contains(w)) {
        score += 0.3;
    }

    score.min(1.0)
}

/// Aggregates quality metrics over stored summaries.
pub fn summary_quality(summaries: &[StoredSummary]) -> SummaryMetrics {
    if summaries.is_empty() {
        return SummaryMetrics {
            compression_ratio: 0.0,
            coherence: 0.0,
        };
    }

    let mut ratios = Vec::new();
    let mut coherence_total = 0.0;

    for summary in summaries {
        if summary.original_words > 0 {
            ratios.push(summary.summary_words as f64 / summary.original_words as f64);
        }
        coherence_total += score_coherence(&summary.content);
    }

    let compression_ratio = if ratios.is_empty() {
        0.0
    } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
    };

    SummaryMetrics {
        compression_ratio,
        coherence: coherence_total / summaries.len() as f64,
    }
}

/// Compares the newer half of scores against the older half.
///
/// `scores` is expected newest first, as returned by the evaluation log query.
pub fn score_trend(scores: &[f64]) -> Trend {
    if scores.len() < 2 {
        return Trend::InsufficientData;
    }

    let mid = scores.len() / 2;
    let recent = &scores[..mid];
    let older = &scores[mid..];

    let recent_avg = recent.iter().sum::<f64>() / recent.len() as f64;
    let older_avg = older.iter().sum::<f64>() / older.len() as f64;

    if recent_avg > older_avg * 1.1 {
        Trend::Improving
    } else if recent_avg < older_avg * 0.9 {
        Trend::Declining
    } else {
        Trend::Stable
    }
}
