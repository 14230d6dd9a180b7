//! Inference errors

use thiserror::Error;

/// Errors that can occur during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    /// No API key configured
    #[error("API key is not configured; set OPENAI_API_KEY or complete setup")]
    MissingApiKey,

    /// API key does not look like a provider key
    #[error("Invalid API key format: the key must start with 'sk-'")]
    InvalidApiKeyFormat,

    /// Provider rejected the API key (HTTP 401)
    #[error("API key was rejected by the completion service")]
    InvalidApiKey,

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded; wait a moment and try again")]
    RateLimited,

    /// Failed to connect to the completion service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the completion service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Timeout during inference
    #[error("Inference timeout after {0}ms")]
    Timeout(u64),

    /// Non-success status carrying the provider's message
    #[error("Completion API error: {0}")]
    ServerError(String),

    /// Response parsing failed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl InferenceError {
    /// Classify a transport-level failure
    pub(crate) fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }

    /// Whether the error comes from local configuration rather than the provider
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::InvalidApiKeyFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_classified() {
        assert!(InferenceError::MissingApiKey.is_configuration());
        assert!(InferenceError::InvalidApiKeyFormat.is_configuration());
        assert!(!InferenceError::InvalidApiKey.is_configuration());
        assert!(!InferenceError::RateLimited.is_configuration());
    }

    #[test]
    fn server_error_carries_provider_message() {
        let err = InferenceError::ServerError("model overloaded".to_string());
        assert_eq!(err.to_string(), "Completion API error: model overloaded");
    }

    #[test]
    fn timeout_message_includes_duration() {
        assert_eq!(
            InferenceError::Timeout(30000).to_string(),
            "Inference timeout after 30000ms"
        );
    }
}
