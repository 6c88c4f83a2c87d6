//! Calendar intent handler.
//!
//! Turns natural-language scheduling requests into calendar events: parses
//! the event draft, mirrors it to the calendar provider when one is
//! configured, and always stores it locally. Also answers listing and
//! cancellation requests.

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use std::sync::LazyLock;
use tracing::warn;
use validator::Validate;

use crate::actors::messages::AppError;
use crate::actors::traits::{CalendarBackend, IntentHandler};
use crate::brain::temporal;
use crate::database;
use crate::models::{EventDraft, HandlerOutput, Request};

const DEFAULT_DURATION_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CalendarAction {
    Create,
    List,
    Cancel,
}

static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:schedule|create|add|book|remind me about)?\s*(?:a|an)?\s*([^:]+?)(?:\s+on\b|\s+at\b|\s+for\b|\s+tomorrow\b|\s+today\b|\s+next\b|$)",
    )
    .expect("Invalid regex: event title")
});

static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:about|regarding)\s+(.+)$").expect("Invalid regex: event description")
});

static EVENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:event|#)\s*(\d+)").expect("Invalid regex: event id")
});

pub struct ScheduleHandler {
    pool: SqlitePool,
    calendar: Option<Arc<dyn CalendarBackend>>,
}

impl ScheduleHandler {
    pub fn new(pool: SqlitePool, calendar: Option<Arc<dyn CalendarBackend>>) -> Self {
        Self { pool, calendar }
    }

    fn detect_action(text: &str) -> CalendarAction {
        let lower = text.to_lowercase();

        if ["delete", "remove", "cancel"].iter().any(|w| lower.contains(w)) {
            return CalendarAction::Cancel;
        }
        if ["list", "show", "view", "what", "upcoming"]
            .iter()
            .any(|w| lower.contains(w))
        {
            return CalendarAction::List;
        }

        // "create"-style words and everything else default to creation.
        CalendarAction::Create
    }

    /// Parses an event draft out of free text.
    fn parse_event_draft(text: &str) -> EventDraft {
        let today = Utc::now().date_naive();

        let title = TITLE
            .captures(text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| {
                // Fallback: first five words
                text.split_whitespace().take(5).collect::<Vec<_>>().join(" ")
            });

        let description = DESCRIPTION
            .captures(text)
            .map(|caps| caps[1].trim().to_string())
            .unwrap_or_default();

        EventDraft {
            title,
            date: temporal::resolve_date(text, today),
            time: temporal::parse_time(text),
            duration_minutes: temporal::parse_duration_minutes(text)
                .unwrap_or(DEFAULT_DURATION_MINUTES),
            description,
        }
    }

    async fn create_event(&self, request: &Request) -> Result<HandlerOutput, AppError> {
        let draft = Self::parse_event_draft(&request.raw_text);
        draft.validate()?;

        let (remote_event_id, note) = match &self.calendar {
            Some(calendar) => {
                let remote_id = calendar.create_event(&draft).await?;
                (Some(remote_id), None)
            }
            None => (None, Some("Calendar sync unavailable - stored locally only")),
        };

        let stored = database::save_event(&self.pool, &draft, remote_event_id.as_deref()).await?;

        let when = stored
            .time
            .clone()
            .unwrap_or_else(|| "all day".to_string());
        let mut message = format!("Created event: {} on {} at {}", stored.title, stored.date, when);
        if let Some(note) = note {
            message = format!("{} ({})", message, note);
        }

        Ok(HandlerOutput::new(
            message,
            serde_json::json!({ "event": stored }),
        ))
    }

    async fn list_events(&self, request: &Request) -> Result<HandlerOutput, AppError> {
        let today = Utc::now().date_naive();
        let lower = request.raw_text.to_lowercase();

        let events = if lower.contains("today") {
            database::events_for_date(&self.pool, today).await?
        } else if lower.contains("month") {
            database::upcoming_events(&self.pool, today, 30).await?
        } else {
            database::upcoming_events(&self.pool, today, 7).await?
        };

        let message = if events.is_empty() {
            "No upcoming events found".to_string()
        } else {
            format!("Found {} upcoming event(s)", events.len())
        };

        Ok(HandlerOutput::new(
            message,
            serde_json::json!({ "events": events }),
        ))
    }

    async fn cancel_event(&self, request: &Request) -> Result<HandlerOutput, AppError> {
        let id: i64 = EVENT_ID
            .captures(&request.raw_text)
            .and_then(|caps| caps[1].parse().ok())
            .ok_or_else(|| {
                AppError::Validation(
                    "Please specify which event to cancel (e.g., 'cancel event 3')".to_string(),
                )
            })?;

        let stored = database::get_event(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::Validation(format!("No event with id {}", id)))?;

        // Remote deletion is best effort; the local row is the source of truth.
        if let (Some(calendar), Some(remote_id)) = (&self.calendar, &stored.remote_event_id) {
            if let Err(e) = calendar.delete_event(remote_id).await {
                warn!("Failed to delete remote event {}: {}", remote_id, e);
            }
        }

        database::delete_event(&self.pool, id).await?;

        Ok(HandlerOutput::new(
            format!("Cancelled event {}: {}", id, stored.title),
            serde_json::json!({ "event": stored }),
        ))
    }
}

#[async_trait]
impl IntentHandler for ScheduleHandler {
    async fn handle(&self, request: &Request) -> Result<HandlerOutput, AppError> {
        match Self::detect_action(&request.raw_text) {
            CalendarAction::Create => self.create_event(request).await,
            CalendarAction::List => self.list_events(request).await,
            CalendarAction::Cancel => self.cancel_event(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_action() {
        assert_eq!(
            ScheduleHandler::detect_action("schedule a meeting tomorrow"),
            CalendarAction::Create
        );
        assert_eq!(
            ScheduleHandler::detect_action("show my upcoming events"),
            CalendarAction::List
        );
        assert_eq!(
            ScheduleHandler::detect_action("cancel event 3"),
            CalendarAction::Cancel
        );
        // Unrecognized phrasing defaults to creation
        assert_eq!(
            ScheduleHandler::detect_action("biology revision session tomorrow"),
            CalendarAction::Create
        );
    }

    #[test]
    fn test_parse_event_draft_title_and_time() {
        let draft =
            ScheduleHandler::parse_event_draft("Schedule a biology review at 3pm for 2 hours");

        assert_eq!(draft.title, "biology review");
        assert_eq!(draft.time.unwrap().format("%H:%M").to_string(), "15:00");
        assert_eq!(draft.duration_minutes, 120);
    }

    #[test]
    fn test_parse_event_draft_description() {
        let draft = ScheduleHandler::parse_event_draft(
            "Schedule a study group tomorrow about chapter four",
        );

        assert_eq!(draft.title, "study group");
        assert_eq!(draft.description, "chapter four");
    }

    #[test]
    fn test_parse_event_draft_defaults() {
        let draft = ScheduleHandler::parse_event_draft("quick sync");

        assert!(!draft.title.is_empty());
        assert_eq!(draft.duration_minutes, DEFAULT_DURATION_MINUTES);
        assert!(draft.time.is_none());
    }
}
