//! Google Calendar configuration

use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::GoogleCalendarError;

/// Length of an event created without an end time
pub const DEFAULT_EVENT_DURATION_MINUTES: i64 = 60;

/// Google Calendar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleCalendarConfig {
    /// Calendar API base URL (default: <https://www.googleapis.com/calendar/v3>)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// OAuth token endpoint used for refreshing access tokens
    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    /// OAuth client credentials file as downloaded from the Google console
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Cached OAuth token (JSON)
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,

    /// IANA time zone attached to created events
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Display color of created events
    #[serde(default = "default_color_id")]
    pub color_id: String,

    /// Request timeout in seconds (none by default)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_path() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_time_zone() -> String {
    "Asia/Tokyo".to_string()
}

fn default_color_id() -> String {
    "2".to_string()
}

impl Default for GoogleCalendarConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token_uri: default_token_uri(),
            credentials_path: default_credentials_path(),
            token_path: default_token_path(),
            time_zone: default_time_zone(),
            color_id: default_color_id(),
            timeout_secs: None,
        }
    }
}

impl GoogleCalendarConfig {
    /// Check the time zone and URLs
    pub fn validate(&self) -> Result<(), GoogleCalendarError> {
        Tz::from_str(&self.time_zone).map_err(|_| {
            GoogleCalendarError::InvalidConfig(format!("unknown time zone '{}'", self.time_zone))
        })?;

        for (name, url) in [("api_base_url", &self.api_base_url), ("token_uri", &self.token_uri)] {
            reqwest::Url::parse(url).map_err(|e| {
                GoogleCalendarError::InvalidConfig(format!("{name} '{url}' is not a valid URL: {e}"))
            })?;
        }

        if self.color_id.trim().is_empty() {
            return Err(GoogleCalendarError::InvalidConfig("color_id must not be empty".to_string()));
        }

        Ok(())
    }
}
