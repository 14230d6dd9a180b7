//! Calendar service
//!
//! Business logic for calendar event management.

use std::{fmt, sync::Arc};

use domain::{CalendarEvent, DomainError, EventId, EventPatch, EventRecord};
use tracing::{debug, info, instrument};

use crate::{
    error::ApplicationError,
    ports::{CalendarError, CalendarPort},
};

/// Calendar that receives events added through the HTTP API
pub const PRIMARY_CALENDAR_ID: &str = "primary";

/// Calendar service for handling calendar operations
pub struct CalendarService {
    calendar_port: Arc<dyn CalendarPort>,
}

impl fmt::Debug for CalendarService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarService")
            .field("mock", &self.calendar_port.is_mock())
            .finish_non_exhaustive()
    }
}

impl CalendarService {
    /// Create a new calendar service
    pub fn new(calendar_port: Arc<dyn CalendarPort>) -> Self {
        Self { calendar_port }
    }

    /// Whether events go to a synthetic calendar
    pub fn is_mock(&self) -> bool {
        self.calendar_port.is_mock()
    }

    /// Create an event in the given calendar
    #[instrument(skip(self, event), fields(title = %event.title, start = %event.start))]
    pub async fn create_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<EventId, ApplicationError> {
        let id = self
            .calendar_port
            .create_event(calendar_id, event)
            .await
            .map_err(map_error)?;
        info!(event_id = %id, mock = self.is_mock(), "Created calendar event");
        Ok(id)
    }

    /// Create an event in the primary calendar
    pub async fn add_to_primary(&self, event: &CalendarEvent) -> Result<EventId, ApplicationError> {
        self.create_event(PRIMARY_CALENDAR_ID, event).await
    }

    /// Fetch an event
    #[instrument(skip(self))]
    pub async fn get_event(
        &self,
        calendar_id: &str,
        event_id: &EventId,
    ) -> Result<EventRecord, ApplicationError> {
        debug!("Fetching calendar event");
        self.calendar_port
            .get_event(calendar_id, event_id)
            .await
            .map_err(map_error)
    }

    /// Apply a partial update to an event
    #[instrument(skip(self, patch))]
    pub async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &EventId,
        patch: &EventPatch,
    ) -> Result<EventRecord, ApplicationError> {
        if patch.is_empty() {
            debug!("Update carries no changes");
        }
        let record = self
            .calendar_port
            .update_event(calendar_id, event_id, patch)
            .await
            .map_err(map_error)?;
        info!("Updated calendar event");
        Ok(record)
    }

    /// Delete an event
    #[instrument(skip(self))]
    pub async fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &EventId,
    ) -> Result<bool, ApplicationError> {
        let deleted = self
            .calendar_port
            .delete_event(calendar_id, event_id)
            .await
            .map_err(map_error)?;
        info!(deleted, "Deleted calendar event");
        Ok(deleted)
    }
}

/// Map calendar port errors to application errors
fn map_error(err: CalendarError) -> ApplicationError {
    match err {
        CalendarError::EventNotFound(id) => DomainError::not_found("event", id).into(),
        CalendarError::AuthenticationFailed(msg) => {
            ApplicationError::Provider(format!("Calendar authentication failed: {msg}"))
        },
        CalendarError::InvalidEvent(msg) => {
            ApplicationError::Provider(format!("Invalid event: {msg}"))
        },
        CalendarError::OperationFailed(msg) => ApplicationError::Provider(msg),
    }
}
