//! Completion port
//!
//! Single-shot text completion used by the extraction pipeline.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Text returned by a completion call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Generated text, trimmed
    pub content: String,
    /// Model that produced it
    pub model: String,
}

impl CompletionResult {
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
        }
    }
}

/// Port for completion providers
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Run a completion with a system instruction and a user prompt
    async fn complete(&self, system: &str, prompt: &str) -> Result<CompletionResult, ApplicationError>;

    /// Model used when none is requested
    fn model_name(&self) -> &str;
}
