//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Missing or unusable local configuration (API key, credentials)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Completion provider rejected the API key
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    /// Completion provider rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Network failure, timeout or non-success response from the completion provider
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Model output could not be turned into a task
    #[error("Parse error: {0}")]
    Parse(String),

    /// Calendar provider failure
    #[error("Calendar provider error: {0}")]
    Provider(String),
}

impl ApplicationError {
    /// Whether the caller can fix this by completing setup
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::InvalidApiKey(_))
    }
}
