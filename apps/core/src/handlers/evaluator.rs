//! Evaluation intent handler.
//!
//! Scores recently generated content (flashcards, summaries) and aggregates
//! stored evaluation results into an overall report with a trend.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use tracing::warn;

use crate::actors::messages::AppError;
use crate::actors::traits::IntentHandler;
use crate::database;
use crate::evaluation;
use crate::models::{Flashcard, HandlerOutput, Request};

const FLASHCARD_SAMPLE: i64 = 50;
const SUMMARY_SAMPLE: i64 = 20;
const TREND_SAMPLE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvaluationKind {
    Flashcards,
    Summaries,
    Overall,
}

pub struct EvaluateHandler {
    pool: SqlitePool,
}

impl EvaluateHandler {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn detect_kind(text: &str) -> EvaluationKind {
        let lower = text.to_lowercase();

        if lower.contains("flashcard") {
            EvaluationKind::Flashcards
        } else if lower.contains("summar") {
            EvaluationKind::Summaries
        } else {
            EvaluationKind::Overall
        }
    }

    /// Records the evaluation; a logging failure never fails the evaluation.
    async fn record(&self, kind: &str, score: f64, details: &serde_json::Value) {
        if let Err(e) = database::log_evaluation(&self.pool, kind, "overall", score, details).await
        {
            warn!("Failed to record {} evaluation: {}", kind, e);
        }
    }

    async fn evaluate_flashcards(&self) -> Result<HandlerOutput, AppError> {
        let stored = database::recent_flashcards(&self.pool, FLASHCARD_SAMPLE).await?;

        if stored.is_empty() {
            return Ok(HandlerOutput::new(
                "No flashcards to evaluate yet",
                serde_json::json!({ "metrics": {} }),
            ));
        }

        let cards: Vec<Flashcard> = stored
            .iter()
            .map(|c| Flashcard {
                question: c.question.clone(),
                answer: c.answer.clone(),
                category: c.category.clone(),
            })
            .collect();

        let metrics = evaluation::flashcard_quality(&cards);
        let details = serde_json::to_value(&metrics)?;
        self.record("flashcards", metrics.overall_quality, &details).await;

        Ok(HandlerOutput::new(
            format!("Evaluated {} flashcards", stored.len()),
            serde_json::json!({
                "metrics": details,
                "num_evaluated": stored.len(),
            }),
        ))
    }

    async fn evaluate_summaries(&self) -> Result<HandlerOutput, AppError> {
        let summaries = database::recent_summaries(&self.pool, SUMMARY_SAMPLE).await?;

        if summaries.is_empty() {
            return Ok(HandlerOutput::new(
                "No summaries to evaluate yet",
                serde_json::json!({ "metrics": {} }),
            ));
        }

        let metrics = evaluation::summary_quality(&summaries);
        let details = serde_json::to_value(&metrics)?;
        self.record("summaries", metrics.coherence, &details).await;

        Ok(HandlerOutput::new(
            format!("Evaluated {} summaries", summaries.len()),
            serde_json::json!({
                "metrics": details,
                "num_evaluated": summaries.len(),
            }),
        ))
    }

    async fn evaluate_overall(&self) -> Result<HandlerOutput, AppError> {
        let averages = database::average_metric_scores(&self.pool).await?;
        let logs = database::evaluation_logs(&self.pool, TREND_SAMPLE).await?;

        let scores: Vec<f64> = logs.iter().map(|log| log.score).collect();
        let trend = evaluation::score_trend(&scores);

        let averages_json: serde_json::Map<String, serde_json::Value> = averages
            .into_iter()
            .map(|(metric, score)| (metric, serde_json::json!(score)))
            .collect();

        Ok(HandlerOutput::new(
            "Generated overall performance report",
            serde_json::json!({
                "averages": averages_json,
                "trend": trend,
                "total_evaluations": logs.len(),
            }),
        ))
    }
}

#[async_trait]
impl IntentHandler for EvaluateHandler {
    async fn handle(&self, request: &Request) -> Result<HandlerOutput, AppError> {
        match Self::detect_kind(&request.raw_text) {
            EvaluationKind::Flashcards => self.evaluate_flashcards().await,
            EvaluationKind::Summaries => self.evaluate_summaries().await,
            EvaluationKind::Overall => self.evaluate_overall().await,
        }
    }
}
