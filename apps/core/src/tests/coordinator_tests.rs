//! Coordinator Tests
//!
//! Routing, dispatch and failure handling, using mock handlers in place of
//! the real ones.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::actors::coordinator::{CoordinatorHandle, HandlerSet};
use crate::actors::messages::AppError;
use crate::actors::traits::IntentHandler;
use crate::brain::intent::Intent;
use crate::models::{HandlerOutput, Request};

/// A scripted handler that records how often it was invoked.
struct StubHandler {
    message: Option<String>,
    error: Option<AppError>,
    calls: Arc<AtomicUsize>,
}

impl StubHandler {
    fn ok(message: &str) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            message: Some(message.to_string()),
            error: None,
            calls: calls.clone(),
        });
        (handler, calls)
    }

    fn failing(error: AppError) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            message: None,
            error: Some(error),
            calls: calls.clone(),
        });
        (handler, calls)
    }
}

#[async_trait]
impl IntentHandler for StubHandler {
    async fn handle(&self, _request: &Request) -> Result<HandlerOutput, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(HandlerOutput::new(
                self.message.clone().unwrap_or_default(),
                serde_json::Value::Null,
            )),
        }
    }
}

struct TestSetup {
    coordinator: CoordinatorHandle,
    scheduler_calls: Arc<AtomicUsize>,
    summarizer_calls: Arc<AtomicUsize>,
    planner_calls: Arc<AtomicUsize>,
    evaluator_calls: Arc<AtomicUsize>,
}

fn setup_with_failing_scheduler(error: AppError) -> TestSetup {
    let (scheduler, scheduler_calls) = StubHandler::failing(error);
    let (summarizer, summarizer_calls) = StubHandler::ok("summarized");
    let (planner, planner_calls) = StubHandler::ok("planned");
    let (evaluator, evaluator_calls) = StubHandler::ok("evaluated");

    let coordinator = CoordinatorHandle::new(
        HandlerSet {
            scheduler,
            summarizer,
            planner,
            evaluator,
        },
        None,
    );

    TestSetup {
        coordinator,
        scheduler_calls,
        summarizer_calls,
        planner_calls,
        evaluator_calls,
    }
}

fn setup() -> TestSetup {
    let (scheduler, scheduler_calls) = StubHandler::ok("scheduled");
    let (summarizer, summarizer_calls) = StubHandler::ok("summarized");
    let (planner, planner_calls) = StubHandler::ok("planned");
    let (evaluator, evaluator_calls) = StubHandler::ok("evaluated");

    let coordinator = CoordinatorHandle::new(
        HandlerSet {
            scheduler,
            summarizer,
            planner,
            evaluator,
        },
        None,
    );

    TestSetup {
        coordinator,
        scheduler_calls,
        summarizer_calls,
        planner_calls,
        evaluator_calls,
    }
}

#[tokio::test]
async fn test_schedule_text_routes_to_scheduler() {
    let setup = setup();

    let response = setup
        .coordinator
        .handle_request("schedule a meeting tomorrow".to_string(), None)
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.intent, Intent::Schedule);
    assert_eq!(response.message, "scheduled");
    assert_eq!(setup.scheduler_calls.load(Ordering::SeqCst), 1);
    assert_eq!(setup.summarizer_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_text_invokes_no_handler() {
    let setup = setup();

    let response = setup
        .coordinator
        .handle_request("the weather is nice".to_string(), None)
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.intent, Intent::Unknown);
    assert!(response.message.contains("more specific"));
    assert!(response.payload["suggestions"].is_array());

    assert_eq!(setup.scheduler_calls.load(Ordering::SeqCst), 0);
    assert_eq!(setup.summarizer_calls.load(Ordering::SeqCst), 0);
    assert_eq!(setup.planner_calls.load(Ordering::SeqCst), 0);
    assert_eq!(setup.evaluator_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_intent_override_skips_classification() {
    let setup = setup();

    // This text classifies as Unknown; the override must route it anyway.
    let response = setup
        .coordinator
        .handle_request("gibberish input".to_string(), Some(Intent::Plan))
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.intent, Intent::Plan);
    assert_eq!(setup.planner_calls.load(Ordering::SeqCst), 1);
    assert_eq!(setup.scheduler_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_override_beats_conflicting_keywords() {
    let setup = setup();

    // Text full of schedule keywords, but the override pins the evaluator.
    let response = setup
        .coordinator
        .handle_request(
            "schedule calendar meeting".to_string(),
            Some(Intent::Evaluate),
        )
        .await
        .unwrap();

    assert_eq!(response.intent, Intent::Evaluate);
    assert_eq!(setup.evaluator_calls.load(Ordering::SeqCst), 1);
    assert_eq!(setup.scheduler_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_handler_failure_becomes_unsuccessful_response() {
    let setup =
        setup_with_failing_scheduler(AppError::Internal("calendar exploded".to_string()));

    let result = setup
        .coordinator
        .handle_request("schedule a meeting".to_string(), None)
        .await;

    // The coordinator never raises; failures surface in the response.
    let response = result.unwrap();
    assert!(!response.success);
    assert_eq!(response.intent, Intent::Schedule);
    assert!(response
        .error_message
        .as_deref()
        .unwrap()
        .contains("calendar exploded"));
    assert_eq!(setup.scheduler_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_validation_failure_is_not_fatal() {
    let setup = setup_with_failing_scheduler(AppError::Validation(
        "Please specify which event to cancel".to_string(),
    ));

    let response = setup
        .coordinator
        .handle_request("cancel it".to_string(), Some(Intent::Schedule))
        .await
        .unwrap();

    assert!(!response.success);
    assert!(response.message.contains("Please specify"));

    // The coordinator keeps serving requests afterwards.
    let next = setup
        .coordinator
        .handle_request("summarize my notes".to_string(), None)
        .await
        .unwrap();
    assert!(next.success);
    assert_eq!(next.intent, Intent::Summarize);
}

#[tokio::test]
async fn test_interaction_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let db_url = format!("sqlite://{}", dir.path().join("coord.sqlite").display());
    let pool = crate::database::init_db(Some(&db_url)).await.unwrap();

    let (scheduler, _) = StubHandler::ok("scheduled");
    let (summarizer, _) = StubHandler::ok("summarized");
    let (planner, _) = StubHandler::ok("planned");
    let (evaluator, _) = StubHandler::ok("evaluated");

    let coordinator = CoordinatorHandle::new(
        HandlerSet {
            scheduler,
            summarizer,
            planner,
            evaluator,
        },
        Some(pool.clone()),
    );

    coordinator
        .handle_request("schedule a review".to_string(), None)
        .await
        .unwrap();

    let logs = crate::database::recent_interactions(&pool, 10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].intent, "schedule");
    assert!(logs[0].success);
    assert_eq!(logs[0].action, "scheduled");
}
