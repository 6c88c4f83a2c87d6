//! Database Module Tests
//!
//! CRUD coverage for events, flashcards, summaries, study plans and the
//! evaluation/interaction logs.

use chrono::{NaiveDate, NaiveTime};
use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::database;
use crate::models::{EventDraft, Flashcard, PlanTopic, StudyPlan};
use crate::packer;

/// Creates a test pool backed by a temp file; the directory must be kept
/// alive for the pool's lifetime.
async fn create_test_pool() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.sqlite");
    let db_url = format!("sqlite://{}", db_path.display());

    let pool = database::init_db(Some(&db_url))
        .await
        .expect("Failed to init test database");

    (pool, dir)
}

fn draft(title: &str, date: NaiveDate) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        date,
        time: NaiveTime::from_hms_opt(15, 0, 0),
        duration_minutes: 60,
        description: String::new(),
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

mod event_tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_get_event() {
        let (pool, _dir) = create_test_pool().await;

        let stored = database::save_event(&pool, &draft("Biology review", day(1)), Some("evt_1"))
            .await
            .expect("Failed to save event");

        assert_eq!(stored.title, "Biology review");
        assert_eq!(stored.date, "2025-06-01");
        assert_eq!(stored.time.as_deref(), Some("15:00"));
        assert_eq!(stored.remote_event_id.as_deref(), Some("evt_1"));

        let fetched = database::get_event(&pool, stored.id)
            .await
            .expect("Failed to get event")
            .expect("Event missing");
        assert_eq!(fetched.title, "Biology review");
    }

    #[tokio::test]
    async fn test_upcoming_events_window() {
        let (pool, _dir) = create_test_pool().await;

        database::save_event(&pool, &draft("Soon", day(2)), None)
            .await
            .unwrap();
        database::save_event(&pool, &draft("Far away", day(25)), None)
            .await
            .unwrap();

        let events = database::upcoming_events(&pool, day(1), 7).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Soon");
    }

    #[tokio::test]
    async fn test_events_for_date() {
        let (pool, _dir) = create_test_pool().await;

        database::save_event(&pool, &draft("Match", day(3)), None)
            .await
            .unwrap();
        database::save_event(&pool, &draft("Other day", day(4)), None)
            .await
            .unwrap();

        let events = database::events_for_date(&pool, day(3)).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Match");
    }

    #[tokio::test]
    async fn test_delete_event() {
        let (pool, _dir) = create_test_pool().await;

        let stored = database::save_event(&pool, &draft("Temp", day(1)), None)
            .await
            .unwrap();

        assert!(database::delete_event(&pool, stored.id).await.unwrap());
        assert!(!database::delete_event(&pool, stored.id).await.unwrap());
        assert!(database::get_event(&pool, stored.id).await.unwrap().is_none());
    }
}

mod flashcard_tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_list_flashcards() {
        let (pool, _dir) = create_test_pool().await;

        for i in 0..3 {
            let card = Flashcard {
                question: format!("Question {}?", i),
                answer: format!("Answer {}.", i),
                category: "test".to_string(),
            };
            database::save_flashcard(&pool, &card).await.unwrap();
        }

        let cards = database::recent_flashcards(&pool, 10).await.unwrap();
        assert_eq!(cards.len(), 3);
        // Newest first
        assert_eq!(cards[0].question, "Question 2?");
    }

    #[tokio::test]
    async fn test_recent_flashcards_limit() {
        let (pool, _dir) = create_test_pool().await;

        for i in 0..5 {
            let card = Flashcard {
                question: format!("Q{}?", i),
                answer: "A.".to_string(),
                category: "test".to_string(),
            };
            database::save_flashcard(&pool, &card).await.unwrap();
        }

        let cards = database::recent_flashcards(&pool, 2).await.unwrap();
        assert_eq!(cards.len(), 2);
    }
}

mod summary_tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_list_summaries() {
        let (pool, _dir) = create_test_pool().await;

        let stored = database::save_summary(&pool, "A concise summary.", 120, 3)
            .await
            .unwrap();
        assert_eq!(stored.original_words, 120);
        assert_eq!(stored.summary_words, 3);

        let summaries = database::recent_summaries(&pool, 10).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].content, "A concise summary.");
    }
}

mod plan_tests {
    use super::*;

    fn sample_plan() -> StudyPlan {
        let topics = vec![PlanTopic {
            name: "Physics".to_string(),
            priority: 1,
            estimated_hours: 4.0,
        }];
        packer::pack(&topics, 2.0, day(1), day(4))
    }

    #[tokio::test]
    async fn test_save_and_load_plan() {
        let (pool, _dir) = create_test_pool().await;

        let stored = database::save_plan(&pool, &sample_plan()).await.unwrap();
        assert!(!stored.id.is_empty());
        assert_eq!(stored.status, "active");

        let current = database::current_plan(&pool)
            .await
            .unwrap()
            .expect("Expected an active plan");
        assert_eq!(current.id, stored.id);
        assert!(current.plan.0.feasible);
        assert_eq!(current.plan.0.slots.len(), 2);
    }

    #[tokio::test]
    async fn test_current_plan_empty() {
        let (pool, _dir) = create_test_pool().await;
        assert!(database::current_plan(&pool).await.unwrap().is_none());
    }
}

mod evaluation_log_tests {
    use super::*;

    #[tokio::test]
    async fn test_log_and_list_evaluations() {
        let (pool, _dir) = create_test_pool().await;

        let details = serde_json::json!({ "clarity": 0.8 });
        database::log_evaluation(&pool, "flashcards", "overall", 0.8, &details)
            .await
            .unwrap();
        database::log_evaluation(&pool, "summaries", "overall", 0.6, &details)
            .await
            .unwrap();

        let logs = database::evaluation_logs(&pool, 10).await.unwrap();
        assert_eq!(logs.len(), 2);

        let averages = database::average_metric_scores(&pool).await.unwrap();
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].0, "overall");
        assert!((averages[0].1 - 0.7).abs() < 1e-9);
    }
}

mod interaction_log_tests {
    use super::*;

    #[tokio::test]
    async fn test_log_interaction_truncates_input() {
        let (pool, _dir) = create_test_pool().await;

        let long_input = "x".repeat(500);
        database::log_interaction(&pool, &long_input, "summarize", true, "done")
            .await
            .unwrap();

        let logs = database::recent_interactions(&pool, 10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].input.chars().count(), 200);
        assert!(logs[0].success);
        assert_eq!(logs[0].intent, "summarize");
    }
}
