//! OpenAI completion adapter - Implements CompletionPort using ai_core

use std::{fmt, sync::Arc, time::Instant};

use ai_core::{InferenceConfig, InferenceEngine, InferenceError, InferenceRequest, OpenAiInferenceEngine};
use application::{
    error::ApplicationError,
    ports::{CompletionPort, CompletionResult},
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Adapter for OpenAI-compatible chat completion APIs
pub struct OpenAiCompletionAdapter {
    engine: Arc<dyn InferenceEngine>,
}

impl fmt::Debug for OpenAiCompletionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompletionAdapter")
            .field("model", &self.engine.default_model())
            .finish_non_exhaustive()
    }
}

impl OpenAiCompletionAdapter {
    /// Create an adapter backed by the HTTP client
    ///
    /// Fails when the configured API key is missing or malformed.
    pub fn new(config: InferenceConfig) -> Result<Self, ApplicationError> {
        let engine = OpenAiInferenceEngine::new(config).map_err(Self::map_error)?;
        Ok(Self::with_engine(Arc::new(engine)))
    }

    /// Create an adapter around any inference engine
    pub fn with_engine(engine: Arc<dyn InferenceEngine>) -> Self {
        Self { engine }
    }

    /// Convert ai_core error to application error
    fn map_error(e: InferenceError) -> ApplicationError {
        match e {
            InferenceError::MissingApiKey | InferenceError::InvalidApiKeyFormat => {
                ApplicationError::Configuration(e.to_string())
            },
            InferenceError::InvalidApiKey => ApplicationError::InvalidApiKey(e.to_string()),
            InferenceError::RateLimited => ApplicationError::RateLimited(e.to_string()),
            other => ApplicationError::Upstream(other.to_string()),
        }
    }
}

#[async_trait]
impl CompletionPort for OpenAiCompletionAdapter {
    #[instrument(skip(self, system, prompt), fields(prompt_len = prompt.len()))]
    async fn complete(&self, system: &str, prompt: &str) -> Result<CompletionResult, ApplicationError> {
        let start = Instant::now();

        let response = self
            .engine
            .generate(InferenceRequest::with_system(system, prompt))
            .await
            .map_err(Self::map_error)?;

        debug!(
            model = %response.model,
            latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            tokens = response.usage.map(|u| u.total_tokens),
            "Completion received"
        );

        Ok(CompletionResult::new(response.content, response.model))
    }

    fn model_name(&self) -> &str {
        self.engine.default_model()
    }
}
