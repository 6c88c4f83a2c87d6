use serde::Serialize;
use tokio::sync::oneshot;

use crate::brain::intent::Intent;
use crate::models::RoutedResponse;

/// Defines errors that can occur within the coordinator and its collaborators.
#[derive(Debug, thiserror::Error, Serialize, Clone)]
pub enum ActorError {
    /// An error originating from the model collaborator.
    #[error("Model request failed: {0}")]
    Model(String),
    /// An error originating from the calendar collaborator.
    #[error("Calendar request failed: {0}")]
    Calendar(String),
    /// An error indicating that an operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl From<tokio::time::error::Elapsed> for ActorError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        ActorError::Timeout(format!("Actor operation timed out: {}", err))
    }
}

// Re-export AppError for convenience
pub use crate::error::AppError;

/// Messages that can be sent to the coordinator actor.
#[derive(Debug)]
pub enum CoordinatorMessage {
    /// A request to route and handle one piece of user input.
    HandleRequest {
        text: String,
        /// Skips classification when set.
        intent_override: Option<Intent>,
        /// A channel to send the aggregated response back.
        responder: oneshot::Sender<RoutedResponse>,
    },
    /// A command to shut down the coordinator loop.
    #[allow(dead_code)]
    Shutdown,
}
