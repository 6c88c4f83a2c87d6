use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{error, info, instrument, warn};

use crate::actors::messages::{AppError, CoordinatorMessage};
use crate::actors::traits::IntentHandler;
use crate::brain::intent::{Intent, IntentClassifier};
use crate::database;
use crate::models::{HandlerOutput, Request, RoutedResponse};

const HANDLER_TIMEOUT: Duration = Duration::from_secs(60);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(90);

/// Immutable routing table handed to the coordinator at construction:
/// exactly one handler per intent.
pub struct HandlerSet {
    pub scheduler: Arc<dyn IntentHandler>,
    pub summarizer: Arc<dyn IntentHandler>,
    pub planner: Arc<dyn IntentHandler>,
    pub evaluator: Arc<dyn IntentHandler>,
}

/// A handle to the coordinator actor.
///
/// This is the primary entry point for all business logic: it classifies
/// user input, dispatches to the matching intent handler, aggregates the
/// result and records the interaction.
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::Sender<CoordinatorMessage>,
}

impl CoordinatorHandle {
    /// Spawns the coordinator runner and returns a handle to it.
    pub fn new(handlers: HandlerSet, db_pool: Option<SqlitePool>) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let runner = CoordinatorRunner {
            receiver,
            classifier: IntentClassifier::new(),
            handlers,
            db_pool,
        };
        tokio::spawn(async move { runner.run().await });
        Self { sender }
    }

    /// Routes a single user request and returns the aggregated response.
    ///
    /// Handler failures never surface as `Err` here; they come back as
    /// `RoutedResponse { success: false, .. }`. An `Err` means the actor
    /// itself is gone or unresponsive.
    #[instrument(skip(self))]
    pub async fn handle_request(
        &self,
        text: String,
        intent_override: Option<Intent>,
    ) -> Result<RoutedResponse, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = CoordinatorMessage::HandleRequest {
            text,
            intent_override,
            responder: send,
        };
        self.sender
            .send(msg)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        timeout(RESPONSE_TIMEOUT, recv)
            .await?
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}

// --- Actor Runner ---
struct CoordinatorRunner {
    receiver: mpsc::Receiver<CoordinatorMessage>,
    classifier: IntentClassifier,
    handlers: HandlerSet,
    db_pool: Option<SqlitePool>,
}

impl CoordinatorRunner {
    /// Drains the message queue; requests are processed strictly one at a time.
    async fn run(mut self) {
        info!("Coordinator started");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CoordinatorMessage::HandleRequest {
                    text,
                    intent_override,
                    responder,
                } => {
                    let response = self.route(text, intent_override).await;
                    let _ = responder.send(response);
                }
                CoordinatorMessage::Shutdown => {
                    info!("Coordinator shutting down...");
                    break;
                }
            }
        }
        info!("Coordinator stopped");
    }

    #[instrument(skip(self, text))]
    async fn route(&self, text: String, intent_override: Option<Intent>) -> RoutedResponse {
        let request = Request::new(text, intent_override);

        // An explicit override skips classification entirely.
        let intent = match request.intent_override {
            Some(intent) => intent,
            None => self.classifier.classify(&request.raw_text).intent,
        };

        info!("Processing request with intent: {}", intent);

        let response = match intent {
            Intent::Unknown => unknown_response(&request),
            Intent::Schedule => self.dispatch(intent, &self.handlers.scheduler, &request).await,
            Intent::Summarize => {
                self.dispatch(intent, &self.handlers.summarizer, &request).await
            }
            Intent::Plan => self.dispatch(intent, &self.handlers.planner, &request).await,
            Intent::Evaluate => self.dispatch(intent, &self.handlers.evaluator, &request).await,
        };

        self.record_interaction(&request, &response).await;

        response
    }

    /// Invokes one handler with a time bound, converting every failure mode
    /// into an unsuccessful response rather than an error.
    async fn dispatch(
        &self,
        intent: Intent,
        handler: &Arc<dyn IntentHandler>,
        request: &Request,
    ) -> RoutedResponse {
        match timeout(HANDLER_TIMEOUT, handler.handle(request)).await {
            Ok(Ok(output)) => success_response(intent, output, request.timestamp),
            Ok(Err(e)) => {
                error!("Handler failed for intent {}: {}", intent, e);
                failure_response(intent, e.to_string(), request.timestamp)
            }
            Err(_) => {
                error!("Handler timed out for intent {}", intent);
                failure_response(
                    intent,
                    format!(
                        "The {} handler did not answer within {} seconds",
                        intent,
                        HANDLER_TIMEOUT.as_secs()
                    ),
                    request.timestamp,
                )
            }
        }
    }

    /// Post-commit hook: records the interaction after the handler result is
    /// known. A persistence failure is logged and never surfaced.
    async fn record_interaction(&self, request: &Request, response: &RoutedResponse) {
        let Some(pool) = &self.db_pool else {
            return;
        };

        if let Err(e) = database::log_interaction(
            pool,
            &request.raw_text,
            response.intent.label(),
            response.success,
            &response.message,
        )
        .await
        {
            warn!("Failed to record interaction: {}", e);
        }
    }
}

fn unknown_response(request: &Request) -> RoutedResponse {
    RoutedResponse {
        intent: Intent::Unknown,
        success: true,
        message: format!(
            "I received your message: '{}'. Could you be more specific about what \
             you'd like me to help with? I can schedule events, summarize lectures, \
             create study plans, or evaluate content quality.",
            request.raw_text
        ),
        payload: serde_json::json!({
            "suggestions": [
                "Schedule a meeting",
                "Summarize these notes",
                "Create a study plan",
                "Show evaluation metrics"
            ]
        }),
        error_message: None,
        timestamp: request.timestamp,
    }
}

fn success_response(intent: Intent, output: HandlerOutput, timestamp: i64) -> RoutedResponse {
    RoutedResponse {
        intent,
        success: true,
        message: output.message,
        payload: output.payload,
        error_message: None,
        timestamp,
    }
}

fn failure_response(intent: Intent, error_message: String, timestamp: i64) -> RoutedResponse {
    RoutedResponse {
        intent,
        success: false,
        message: format!("Error processing request: {}", error_message),
        payload: serde_json::Value::Null,
        error_message: Some(error_message),
        timestamp,
    }
}
