//! Google Calendar errors

use thiserror::Error;

/// Google Calendar client errors
#[derive(Debug, Error)]
pub enum GoogleCalendarError {
    /// Configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// OAuth client credentials file could not be read
    #[error("Invalid credentials file: {0}")]
    InvalidCredentials(String),

    /// Cached token could not be read or written
    #[error("Token storage error: {0}")]
    TokenStorage(String),

    /// Refreshing the access token failed
    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),

    /// Connection to the calendar service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the calendar service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The provider rejected our credentials (HTTP 401/403)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Event or calendar does not exist (HTTP 404/410)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Event cannot be sent as given
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Any other non-success response
    #[error("Calendar API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a provider response
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for GoogleCalendarError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_shows_status_and_message() {
        let err = GoogleCalendarError::Api {
            status: 400,
            message: "Invalid time zone".to_string(),
        };
        assert_eq!(err.to_string(), "Calendar API error (400): Invalid time zone");
    }

    #[test]
    fn not_found_names_event() {
        let err = GoogleCalendarError::NotFound("abc".to_string());
        assert!(err.to_string().contains("abc"));
    }
}
