//! Google Calendar adapter - Implements CalendarPort using integration_google_calendar

use std::{fmt, sync::Arc};

use application::{
    error::ApplicationError,
    ports::{CalendarError, CalendarPort},
};
use async_trait::async_trait;
use domain::{CalendarEvent, EventId, EventPatch, EventRecord};
use integration_google_calendar::{
    CalendarClient, GoogleCalendarClient, GoogleCalendarConfig, GoogleCalendarError,
};
use tracing::{debug, info, instrument};

/// Adapter for the Google Calendar API
pub struct GoogleCalendarAdapter {
    client: Arc<dyn CalendarClient>,
}

impl fmt::Debug for GoogleCalendarAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleCalendarAdapter")
            .field("mock", &self.client.is_mock())
            .finish()
    }
}

impl GoogleCalendarAdapter {
    /// Wrap an existing calendar client
    pub fn new(client: Arc<dyn CalendarClient>) -> Self {
        Self { client }
    }

    /// Discover credentials and connect, falling back to mock mode
    ///
    /// Only an invalid configuration is an error.
    pub async fn connect(config: GoogleCalendarConfig) -> Result<Self, ApplicationError> {
        let client = GoogleCalendarClient::connect(config)
            .await
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;

        info!(mock = client.is_mock(), "Calendar client ready");
        Ok(Self::new(Arc::new(client)))
    }

    /// Convert integration error to calendar port error
    fn map_error(e: GoogleCalendarError) -> CalendarError {
        match e {
            GoogleCalendarError::AuthenticationFailed(_)
            | GoogleCalendarError::InvalidCredentials(_)
            | GoogleCalendarError::TokenRefresh(_) => CalendarError::AuthenticationFailed(e.to_string()),
            GoogleCalendarError::NotFound(id) => CalendarError::EventNotFound(id),
            GoogleCalendarError::InvalidEvent(msg) => CalendarError::InvalidEvent(msg),
            other => CalendarError::OperationFailed(other.to_string()),
        }
    }
}

#[async_trait]
impl CalendarPort for GoogleCalendarAdapter {
    #[instrument(skip(self, event), fields(title = %event.title))]
    async fn create_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<EventId, CalendarError> {
        let id = self
            .client
            .create_event(calendar_id, event)
            .await
            .map_err(Self::map_error)?;
        debug!(event_id = %id, "Created calendar event");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get_event(
        &self,
        calendar_id: &str,
        event_id: &EventId,
    ) -> Result<EventRecord, CalendarError> {
        self.client
            .get_event(calendar_id, event_id)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, patch))]
    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &EventId,
        patch: &EventPatch,
    ) -> Result<EventRecord, CalendarError> {
        self.client
            .update_event(calendar_id, event_id, patch)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    async fn delete_event(&self, calendar_id: &str, event_id: &EventId) -> Result<bool, CalendarError> {
        self.client
            .delete_event(calendar_id, event_id)
            .await
            .map_err(Self::map_error)
    }

    fn is_mock(&self) -> bool {
        self.client.is_mock()
    }
}

#[cfg(test)]
mod tests {
    use domain::EventTime;
    use integration_google_calendar::MOCK_EVENT_SUMMARY;

    use super::*;

    fn mock_adapter() -> GoogleCalendarAdapter {
        let client = GoogleCalendarClient::mock(GoogleCalendarConfig::default()).unwrap();
        GoogleCalendarAdapter::new(Arc::new(client))
    }

    /// Client failing every call with the error built by `error`
    struct FailingClient {
        error: fn() -> GoogleCalendarError,
    }

    #[async_trait]
    impl CalendarClient for FailingClient {
        async fn create_event(
            &self,
            _calendar_id: &str,
            _event: &CalendarEvent,
        ) -> Result<EventId, GoogleCalendarError> {
            Err((self.error)())
        }

        async fn get_event(
            &self,
            _calendar_id: &str,
            _event_id: &EventId,
        ) -> Result<EventRecord, GoogleCalendarError> {
            Err((self.error)())
        }

        async fn update_event(
            &self,
            _calendar_id: &str,
            _event_id: &EventId,
            _patch: &EventPatch,
        ) -> Result<EventRecord, GoogleCalendarError> {
            Err((self.error)())
        }

        async fn delete_event(
            &self,
            _calendar_id: &str,
            _event_id: &EventId,
        ) -> Result<bool, GoogleCalendarError> {
            Err((self.error)())
        }

        fn is_mock(&self) -> bool {
            false
        }
    }

    fn failing(error: fn() -> GoogleCalendarError) -> GoogleCalendarAdapter {
        GoogleCalendarAdapter::new(Arc::new(FailingClient { error }))
    }

    #[tokio::test]
    async fn mock_mode_round_trip() {
        let adapter = mock_adapter();
        assert!(adapter.is_mock());

        let event = CalendarEvent::new("Dentist", EventTime::parse("2025-03-01T10:00:00"));
        let id = adapter.create_event("primary", &event).await.unwrap();
        assert!(!id.as_str().is_empty());

        let record = adapter.get_event("primary", &id).await.unwrap();
        assert_eq!(record.summary.as_deref(), Some(MOCK_EVENT_SUMMARY));

        assert!(adapter.delete_event("primary", &id).await.unwrap());
    }

    #[tokio::test]
    async fn not_found_keeps_event_id() {
        let adapter = failing(|| GoogleCalendarError::NotFound("evt-9".to_string()));

        let err = adapter
            .get_event("primary", &EventId::new("evt-9"))
            .await
            .unwrap_err();
        assert!(matches!(err, CalendarError::EventNotFound(id) if id == "evt-9"));
    }

    #[tokio::test]
    async fn auth_failures_are_grouped() {
        let adapter = failing(|| GoogleCalendarError::TokenRefresh("invalid_grant".to_string()));

        let err = adapter
            .delete_event("primary", &EventId::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, CalendarError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn api_errors_are_operation_failures() {
        let adapter = failing(|| GoogleCalendarError::Api {
            status: 500,
            message: "backend error".to_string(),
        });

        let event = CalendarEvent::new("x", EventTime::parse("2025-03-01T10:00:00"));
        let err = adapter.create_event("primary", &event).await.unwrap_err();
        assert!(matches!(err, CalendarError::OperationFailed(msg) if msg.contains("backend error")));
    }

    #[tokio::test]
    async fn invalid_events_pass_through() {
        let adapter = failing(|| GoogleCalendarError::InvalidEvent("no end".to_string()));

        let err = adapter
            .update_event("primary", &EventId::new("x"), &EventPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CalendarError::InvalidEvent(msg) if msg == "no end"));
    }

    #[tokio::test]
    async fn connect_rejects_invalid_time_zone() {
        let config = GoogleCalendarConfig {
            time_zone: "Nowhere/Special".to_string(),
            ..GoogleCalendarConfig::default()
        };

        let err = GoogleCalendarAdapter::connect(config).await.unwrap_err();
        assert!(err.is_configuration());
    }
}
