//! Google Calendar integration
//!
//! Client for the Google Calendar v3 REST API
//! (<https://developers.google.com/calendar/api/v3/reference>).
//!
//! At connection time the client looks for a cached OAuth token and the
//! OAuth client credentials file. When no usable token can be obtained it runs
//! in [`CalendarMode::Mock`] and answers every operation with synthetic data.

pub mod client;
mod config;
mod credentials;
mod error;
mod models;

pub use client::{
    CalendarClient, CalendarMode, GoogleCalendarClient, LiveSession, MOCK_EVENT_STATUS,
    MOCK_EVENT_SUMMARY,
};
pub use config::{DEFAULT_EVENT_DURATION_MINUTES, GoogleCalendarConfig};
pub use credentials::{ClientSecret, StoredToken};
pub use error::GoogleCalendarError;
