use async_trait::async_trait;

use crate::actors::messages::AppError;
use crate::models::{EventDraft, Flashcard, HandlerOutput, Request};

/// Defines the public interface for the model-inference collaborator.
///
/// This trait abstracts the specific backend (local llama-server, remote API)
/// so implementations can be swapped and mocked interchangeably.
#[async_trait]
pub trait ModelBackend: Send + Sync + 'static {
    /// Generates a concise summary of lecture content.
    async fn generate_summary(&self, content: &str) -> Result<String, AppError>;

    /// Generates question/answer flashcards from lecture content.
    ///
    /// `summary` is optional context; pass an empty string when unavailable.
    async fn generate_flashcards(
        &self,
        content: &str,
        summary: &str,
    ) -> Result<Vec<Flashcard>, AppError>;
}

/// Defines the public interface for the calendar-provider collaborator.
#[async_trait]
pub trait CalendarBackend: Send + Sync + 'static {
    /// Creates a remote calendar event and returns the provider's event id.
    async fn create_event(&self, draft: &EventDraft) -> Result<String, AppError>;

    /// Deletes a remote calendar event by provider id.
    async fn delete_event(&self, remote_id: &str) -> Result<(), AppError>;
}

/// One intent handler: the coordinator dispatches each classified request to
/// exactly one of these.
#[async_trait]
pub trait IntentHandler: Send + Sync + 'static {
    async fn handle(&self, request: &Request) -> Result<HandlerOutput, AppError>;
}
