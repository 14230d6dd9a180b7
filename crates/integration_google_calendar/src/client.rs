//! Google Calendar client
//!
//! HTTP client for the Calendar v3 events API, with an explicit mock mode.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use domain::{CalendarEvent, EventId, EventPatch, EventRecord, EventTime};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::{DEFAULT_EVENT_DURATION_MINUTES, GoogleCalendarConfig},
    credentials::{ClientSecret, StoredToken},
    error::GoogleCalendarError,
    models::{ApiErrorResponse, EventDateTime, EventResource},
};

/// Summary reported for events in mock mode
pub const MOCK_EVENT_SUMMARY: &str = "Mock event";

/// Status reported for events in mock mode
pub const MOCK_EVENT_STATUS: &str = "confirmed";

/// Authorized access to the provider
#[derive(Clone)]
pub struct LiveSession {
    access_token: String,
}

impl LiveSession {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

impl fmt::Debug for LiveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveSession")
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// How the client answers operations
#[derive(Debug, Clone)]
pub enum CalendarMode {
    /// Calls the Google Calendar API
    Live(LiveSession),
    /// Returns synthetic data without any network call
    Mock,
}

impl CalendarMode {
    pub const fn is_mock(&self) -> bool {
        matches!(self, Self::Mock)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Live(_) => "live",
            Self::Mock => "mock",
        }
    }
}

/// Calendar client trait for event CRUD
#[async_trait]
pub trait CalendarClient: Send + Sync {
    /// Create an event and return its identifier
    async fn create_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<EventId, GoogleCalendarError>;

    /// Fetch an event
    async fn get_event(
        &self,
        calendar_id: &str,
        event_id: &EventId,
    ) -> Result<EventRecord, GoogleCalendarError>;

    /// Apply non-empty patch fields to an event
    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &EventId,
        patch: &EventPatch,
    ) -> Result<EventRecord, GoogleCalendarError>;

    /// Delete an event
    async fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &EventId,
    ) -> Result<bool, GoogleCalendarError>;

    /// Whether the client runs in mock mode
    fn is_mock(&self) -> bool;
}

/// Google Calendar HTTP client implementation
#[derive(Debug)]
pub struct GoogleCalendarClient {
    client: Client,
    config: GoogleCalendarConfig,
    mode: CalendarMode,
}

impl GoogleCalendarClient {
    fn build(config: GoogleCalendarConfig, mode: CalendarMode) -> Result<Self, GoogleCalendarError> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| GoogleCalendarError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config,
            mode,
        })
    }

    /// Client that calls the provider with the given access token
    pub fn live(
        config: GoogleCalendarConfig,
        access_token: impl Into<String>,
    ) -> Result<Self, GoogleCalendarError> {
        Self::build(config, CalendarMode::Live(LiveSession::new(access_token)))
    }

    /// Client that never leaves the process
    pub fn mock(config: GoogleCalendarConfig) -> Result<Self, GoogleCalendarError> {
        Self::build(config, CalendarMode::Mock)
    }

    /// Discover credentials and pick the mode
    ///
    /// Uses the cached token when still valid, refreshes it with the client
    /// credentials when expired, and otherwise falls back to mock mode. Only
    /// an invalid configuration is an error.
    #[instrument(skip(config), fields(token_path = %config.token_path.display()))]
    pub async fn connect(config: GoogleCalendarConfig) -> Result<Self, GoogleCalendarError> {
        let mut client = Self::build(config, CalendarMode::Mock)?;

        match client.discover_session().await {
            Ok(Some(session)) => {
                client.mode = CalendarMode::Live(session);
                info!("Google Calendar client ready");
            },
            Ok(None) => {},
            Err(e) => {
                warn!(error = %e, "Google Calendar initialization failed, running in mock mode");
            },
        }

        Ok(client)
    }

    async fn discover_session(&self) -> Result<Option<LiveSession>, GoogleCalendarError> {
        let token = StoredToken::load(&self.config.token_path).await?;

        if let Some(valid) = token.as_ref().filter(|t| t.is_valid_at(Utc::now())) {
            debug!("Using cached access token");
            return Ok(Some(LiveSession::new(valid.access_token.clone())));
        }

        if !tokio::fs::try_exists(&self.config.credentials_path)
            .await
            .unwrap_or(false)
        {
            warn!(
                path = %self.config.credentials_path.display(),
                "Credentials file not found, running in mock mode"
            );
            return Ok(None);
        }

        let Some(token) = token.filter(StoredToken::can_refresh) else {
            warn!("No refreshable token cached and interactive authorization is not available, running in mock mode");
            return Ok(None);
        };

        let secret = ClientSecret::load(&self.config.credentials_path).await?;
        let refreshed = token
            .refresh(&self.client, &self.config.token_uri, &secret)
            .await?;
        refreshed.save(&self.config.token_path).await?;
        info!("Refreshed and cached access token");

        Ok(Some(LiveSession::new(refreshed.access_token)))
    }

    /// Current mode
    pub const fn mode(&self) -> &CalendarMode {
        &self.mode
    }

    fn url(&self, segments: &[&str]) -> Result<Url, GoogleCalendarError> {
        let mut url = Url::parse(&self.config.api_base_url)
            .map_err(|e| GoogleCalendarError::InvalidConfig(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| GoogleCalendarError::InvalidConfig("api_base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url, GoogleCalendarError> {
        self.url(&["calendars", calendar_id, "events"])
    }

    fn event_url(&self, calendar_id: &str, event_id: &EventId) -> Result<Url, GoogleCalendarError> {
        self.url(&["calendars", calendar_id, "events", event_id.as_str()])
    }

    fn authorized(&self, request: RequestBuilder, session: &LiveSession) -> RequestBuilder {
        request.bearer_auth(&session.access_token)
    }

    /// Build the insert body for a new event
    fn event_resource(&self, event: &CalendarEvent) -> Result<EventResource, GoogleCalendarError> {
        let end = match &event.end {
            Some(end) if !end.is_blank() => end.clone(),
            _ => event
                .start
                .checked_add(chrono::Duration::minutes(DEFAULT_EVENT_DURATION_MINUTES))
                .ok_or_else(|| {
                    GoogleCalendarError::InvalidEvent(format!(
                        "cannot derive an end time from start '{}'",
                        event.start
                    ))
                })?,
        };

        Ok(EventResource {
            summary: Some(event.title.clone()),
            start: Some(EventDateTime::zoned(event.start.to_string(), &self.config.time_zone)),
            end: Some(EventDateTime::zoned(end.to_string(), &self.config.time_zone)),
            color_id: Some(self.config.color_id.clone()),
            location: non_empty(&event.location),
            description: non_empty(&event.description),
            ..EventResource::default()
        })
    }

    async fn fetch_raw(
        &self,
        session: &LiveSession,
        calendar_id: &str,
        event_id: &EventId,
    ) -> Result<Map<String, Value>, GoogleCalendarError> {
        let response = self
            .authorized(self.client.get(self.event_url(calendar_id, event_id)?), session)
            .send()
            .await?;
        let response = check_status(response, event_id.as_str()).await?;

        match response.json::<Value>().await? {
            Value::Object(event) => Ok(event),
            other => Err(GoogleCalendarError::ParseError(format!(
                "expected an event object, got {other}"
            ))),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

/// Map error statuses, passing successful responses through
async fn check_status(response: Response, resource: &str) -> Result<Response, GoogleCalendarError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| format!("HTTP {status}"));

    warn!(status = %status, message = %message, "Google Calendar request failed");

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GoogleCalendarError::AuthenticationFailed(message)
        },
        StatusCode::NOT_FOUND | StatusCode::GONE => GoogleCalendarError::NotFound(resource.to_string()),
        _ => GoogleCalendarError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

/// Set a start/end slot to a zoned date-time, keeping other slot fields
fn set_time(event: &mut Map<String, Value>, key: &str, time: &EventTime, time_zone: &str) {
    match event.get_mut(key) {
        Some(Value::Object(slot)) => {
            slot.remove("date");
            slot.insert("dateTime".to_string(), Value::String(time.to_string()));
            slot.entry("timeZone")
                .or_insert_with(|| Value::String(time_zone.to_string()));
        },
        _ => {
            event.insert(
                key.to_string(),
                json!({"dateTime": time.to_string(), "timeZone": time_zone}),
            );
        },
    }
}

/// Apply the non-empty fields of a patch to a provider event document
pub(crate) fn apply_patch(event: &mut Map<String, Value>, patch: &EventPatch, time_zone: &str) {
    if let Some(title) = patch.title() {
        event.insert("summary".to_string(), Value::String(title.to_string()));
    }
    if let Some(start) = patch.start.as_ref().filter(|t| !t.is_blank()) {
        set_time(event, "start", start, time_zone);
    }
    if let Some(end) = patch.end.as_ref().filter(|t| !t.is_blank()) {
        set_time(event, "end", end, time_zone);
    }
    if let Some(location) = patch.location() {
        event.insert("location".to_string(), Value::String(location.to_string()));
    }
    if let Some(description) = patch.description() {
        event.insert("description".to_string(), Value::String(description.to_string()));
    }
}

#[async_trait]
impl CalendarClient for GoogleCalendarClient {
    #[instrument(skip(self, event), fields(mode = self.mode.label(), title = %event.title))]
    async fn create_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<EventId, GoogleCalendarError> {
        let session = match &self.mode {
            CalendarMode::Mock => {
                let id = EventId::generate();
                info!(
                    event_id = %id,
                    start = %event.start,
                    end = ?event.end.as_ref().map(ToString::to_string),
                    location = %event.location,
                    "Created mock event"
                );
                return Ok(id);
            },
            CalendarMode::Live(session) => session,
        };

        let body = self.event_resource(event)?;
        debug!(?body, "Inserting event");

        let response = self
            .authorized(self.client.post(self.events_url(calendar_id)?), session)
            .json(&body)
            .send()
            .await?;
        let created: EventResource = check_status(response, &format!("calendar {calendar_id}"))
            .await?
            .json()
            .await?;

        let id = created
            .id
            .map(EventId::from)
            .ok_or_else(|| GoogleCalendarError::ParseError("created event has no id".to_string()))?;

        info!(event_id = %id, link = ?created.html_link, "Event created");
        Ok(id)
    }

    #[instrument(skip(self), fields(mode = self.mode.label()))]
    async fn get_event(
        &self,
        calendar_id: &str,
        event_id: &EventId,
    ) -> Result<EventRecord, GoogleCalendarError> {
        let session = match &self.mode {
            CalendarMode::Mock => {
                return Ok(EventRecord::summary_only(
                    event_id.clone(),
                    MOCK_EVENT_SUMMARY,
                    MOCK_EVENT_STATUS,
                ));
            },
            CalendarMode::Live(session) => session,
        };

        let raw = self.fetch_raw(session, calendar_id, event_id).await?;
        let resource: EventResource = serde_json::from_value(Value::Object(raw))
            .map_err(|e| GoogleCalendarError::ParseError(e.to_string()))?;
        Ok(resource.into_record(event_id))
    }

    #[instrument(skip(self, patch), fields(mode = self.mode.label()))]
    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &EventId,
        patch: &EventPatch,
    ) -> Result<EventRecord, GoogleCalendarError> {
        let session = match &self.mode {
            CalendarMode::Mock => {
                info!("Updated mock event");
                return Ok(EventRecord::summary_only(
                    event_id.clone(),
                    patch.title().unwrap_or(MOCK_EVENT_SUMMARY),
                    MOCK_EVENT_STATUS,
                ));
            },
            CalendarMode::Live(session) => session,
        };

        let mut event = self.fetch_raw(session, calendar_id, event_id).await?;
        apply_patch(&mut event, patch, &self.config.time_zone);

        let response = self
            .authorized(self.client.put(self.event_url(calendar_id, event_id)?), session)
            .json(&event)
            .send()
            .await?;
        let updated: EventResource = check_status(response, event_id.as_str()).await?.json().await?;

        info!(link = ?updated.html_link, "Event updated");
        Ok(updated.into_record(event_id))
    }

    #[instrument(skip(self), fields(mode = self.mode.label()))]
    async fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &EventId,
    ) -> Result<bool, GoogleCalendarError> {
        let session = match &self.mode {
            CalendarMode::Mock => {
                info!("Deleted mock event");
                return Ok(true);
            },
            CalendarMode::Live(session) => session,
        };

        let response = self
            .authorized(self.client.delete(self.event_url(calendar_id, event_id)?), session)
            .send()
            .await?;
        check_status(response, event_id.as_str()).await?;

        info!("Event deleted");
        Ok(true)
    }

    fn is_mock(&self) -> bool {
        self.mode.is_mock()
    }
}
