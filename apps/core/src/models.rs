use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use crate::brain::intent::Intent;

/// Represents the generation settings passed to the model collaborator.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct ModelSettings {
    /// Controls the creativity of the model's responses. Value between 0.0 and 2.0.
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
    /// The system-level instructions provided to the model for context.
    #[validate(length(min = 1))]
    pub system_prompt: String,
    /// Upper bound on generated tokens per completion.
    #[validate(range(min = 1))]
    pub max_tokens: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            system_prompt: crate::prompts::system_prompt().to_string(),
            max_tokens: 512,
        }
    }
}

/// A single user request flowing through the coordinator.
///
/// Transient: created per call and not persisted beyond the interaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// The raw natural-language input.
    pub raw_text: String,
    /// Skips classification when set (e.g., from a CLI flag).
    pub intent_override: Option<Intent>,
    /// Unix timestamp of when the request was received.
    pub timestamp: i64,
}

impl Request {
    pub fn new(raw_text: impl Into<String>, intent_override: Option<Intent>) -> Self {
        Self {
            raw_text: raw_text.into(),
            intent_override,
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// The coordinator's aggregated answer to a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutedResponse {
    /// The intent the request was routed under.
    pub intent: Intent,
    /// Whether the handler completed successfully.
    pub success: bool,
    /// Human-readable outcome message.
    pub message: String,
    /// Handler-specific payload; opaque to the coordinator.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Populated when `success` is false.
    pub error_message: Option<String>,
    /// Unix timestamp of when the response was produced.
    pub timestamp: i64,
}

/// The raw output of a single intent handler, before aggregation.
#[derive(Debug, Clone)]
pub struct HandlerOutput {
    pub message: String,
    pub payload: serde_json::Value,
}

impl HandlerOutput {
    pub fn new(message: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            message: message.into(),
            payload,
        }
    }
}

/// A calendar event parsed from natural language, not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EventDraft {
    #[validate(length(min = 1))]
    pub title: String,
    pub date: NaiveDate,
    /// None means an all-day event.
    pub time: Option<NaiveTime>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub description: String,
}

/// A calendar event row from the local store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredEvent {
    pub id: i64,
    pub title: String,
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    /// 24h clock (`HH:MM`); None for all-day events.
    pub time: Option<String>,
    pub duration_minutes: i64,
    pub description: String,
    /// Identifier assigned by the calendar provider, when synced.
    pub remote_event_id: Option<String>,
    pub created_at: i64,
}

/// A question/answer pair produced by the summarizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
    #[serde(default = "default_flashcard_category")]
    pub category: String,
}

fn default_flashcard_category() -> String {
    "generated".to_string()
}

/// A flashcard row from the local store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredFlashcard {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub created_at: i64,
}

/// A summary row from the local store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredSummary {
    pub id: i64,
    pub content: String,
    pub original_words: i64,
    pub summary_words: i64,
    pub created_at: i64,
}

/// A study topic fed into the slot packer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTopic {
    pub name: String,
    /// Higher values are packed first.
    pub priority: u8,
    pub estimated_hours: f64,
}

/// A day/topic/hours allocation produced by the slot packer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPlanSlot {
    pub day: NaiveDate,
    pub topic: String,
    pub allocated_hours: f64,
}

/// A complete packed study plan.
///
/// `feasible` is false when the requested topics do not fit in the available
/// days; the topics that could not be fully placed are listed rather than
/// silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlan {
    pub slots: Vec<StudyPlanSlot>,
    pub feasible: bool,
    pub unplaced_topics: Vec<String>,
    pub daily_capacity_hours: f64,
    pub start_date: NaiveDate,
    pub deadline: NaiveDate,
}

/// A study plan row from the local store.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct StoredPlan {
    /// UUID assigned at save time.
    pub id: String,
    pub plan: Json<StudyPlan>,
    pub status: String,
    pub created_at: i64,
}

/// An evaluation result row from the local store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvaluationLog {
    pub id: i64,
    /// What was evaluated: "flashcards", "summaries" or "overall".
    pub kind: String,
    pub metric: String,
    pub score: f64,
    /// Full metric set as JSON.
    pub details: String,
    pub created_at: i64,
}

/// One coordinator interaction, as recorded by the post-commit hook.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InteractionLog {
    pub id: i64,
    pub created_at: i64,
    pub input: String,
    pub intent: String,
    pub success: bool,
    pub action: String,
}
