//! Calendar port for application layer
//!
//! Defines the interface for calendar event CRUD.
//! Implemented by adapters in the infrastructure layer.

use async_trait::async_trait;
use domain::{CalendarEvent, EventId, EventPatch, EventRecord};
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// Calendar port errors
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Port for calendar operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CalendarPort: Send + Sync {
    /// Create an event and return its identifier
    async fn create_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<EventId, CalendarError>;

    /// Fetch an event
    async fn get_event(&self, calendar_id: &str, event_id: &EventId)
    -> Result<EventRecord, CalendarError>;

    /// Apply a partial update and return the stored event
    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &EventId,
        patch: &EventPatch,
    ) -> Result<EventRecord, CalendarError>;

    /// Delete an event
    async fn delete_event(&self, calendar_id: &str, event_id: &EventId) -> Result<bool, CalendarError>;

    /// Whether operations return synthetic data instead of calling the provider
    fn is_mock(&self) -> bool;
}
