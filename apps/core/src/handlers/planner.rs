//! Study planning intent handler.
//!
//! Parses study goals from free text, packs topics into day slots with the
//! slot packer, mirrors the sessions to the calendar when available, and
//! persists the resulting plan.

use async_trait::async_trait;
use chrono::{Duration, NaiveTime, Utc};
use sqlx::sqlite::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

use crate::actors::messages::AppError;
use crate::actors::traits::{CalendarBackend, IntentHandler};
use crate::brain::{temporal, topics};
use crate::database;
use crate::models::{EventDraft, HandlerOutput, PlanTopic, Request, StudyPlan};
use crate::packer;

/// Default daily study budget when the text names none.
const DEFAULT_DAILY_HOURS: f64 = 3.0;
/// Rough per-topic effort estimate.
const HOURS_PER_TOPIC: f64 = 5.0;
/// Planning horizon bounds, in days.
const MIN_PLAN_DAYS: i64 = 1;
const MAX_PLAN_DAYS: i64 = 14;
/// Study sessions mirrored to the calendar start at this hour.
const SESSION_START: (u32, u32) = (9, 0);

pub struct PlanHandler {
    pool: SqlitePool,
    calendar: Option<Arc<dyn CalendarBackend>>,
}

impl PlanHandler {
    pub fn new(pool: SqlitePool, calendar: Option<Arc<dyn CalendarBackend>>) -> Self {
        Self { pool, calendar }
    }

    /// Mirrors study slots to the calendar provider. Best effort: failures
    /// are logged and never fail the plan.
    async fn sync_to_calendar(&self, plan: &StudyPlan) {
        let Some(calendar) = &self.calendar else {
            return;
        };

        for slot in &plan.slots {
            let draft = EventDraft {
                title: format!("Study {}", slot.topic),
                date: slot.day,
                time: NaiveTime::from_hms_opt(SESSION_START.0, SESSION_START.1, 0),
                duration_minutes: (slot.allocated_hours * 60.0).round() as i64,
                description: "ScholarMate study session".to_string(),
            };

            match calendar.create_event(&draft).await {
                Ok(remote_id) => {
                    if let Err(e) =
                        database::save_event(&self.pool, &draft, Some(&remote_id)).await
                    {
                        warn!("Failed to store synced study session: {}", e);
                    }
                }
                Err(e) => {
                    warn!("Failed to sync study session to calendar: {}", e);
                }
            }
        }
    }
}

#[async_trait]
impl IntentHandler for PlanHandler {
    async fn handle(&self, request: &Request) -> Result<HandlerOutput, AppError> {
        let today = Utc::now().date_naive();
        let text = &request.raw_text;

        let topic_names = topics::extract_topics(text);
        let daily_hours = temporal::parse_daily_hours(text).unwrap_or(DEFAULT_DAILY_HOURS);
        let deadline = temporal::parse_deadline(text, today)
            .unwrap_or(today + Duration::days(7));

        // Clamp the horizon so far-off deadlines do not produce sprawling plans.
        let days = (deadline - today).num_days().clamp(MIN_PLAN_DAYS, MAX_PLAN_DAYS);
        let horizon = today + Duration::days(days);

        let plan_topics: Vec<PlanTopic> = topic_names
            .iter()
            .map(|name| PlanTopic {
                name: name.clone(),
                priority: 1,
                estimated_hours: HOURS_PER_TOPIC,
            })
            .collect();

        let plan = packer::pack(&plan_topics, daily_hours, today, horizon);

        self.sync_to_calendar(&plan).await;

        if let Err(e) = database::save_plan(&self.pool, &plan).await {
            warn!("Failed to save study plan: {}", e);
        }

        let study_days: HashSet<_> = plan.slots.iter().map(|s| s.day).collect();
        let covered: HashSet<_> = plan.slots.iter().map(|s| s.topic.clone()).collect();
        let total_hours: f64 = plan.slots.iter().map(|s| s.allocated_hours).sum();
        let study_sessions = plan.slots.len();
        let feasible = plan.feasible;

        let mut message = format!(
            "Generated a {}-day study plan covering {} topic(s)",
            study_days.len(),
            covered.len()
        );
        if !feasible {
            message.push_str(
                "; warning: not everything fits before the deadline at this pace",
            );
        }

        Ok(HandlerOutput::new(
            message,
            serde_json::json!({
                "plan": plan,
                "stats": {
                    "total_days": study_days.len(),
                    "study_sessions": study_sessions,
                    "topics_covered": covered.len(),
                    "total_hours": total_hours,
                    "feasible": feasible,
                },
            }),
        ))
    }
}
