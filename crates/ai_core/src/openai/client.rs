//! Chat completions client implementation

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::ports::{InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage};

/// Inference engine backed by an OpenAI-compatible chat completions API
pub struct OpenAiInferenceEngine {
    client: Client,
    config: InferenceConfig,
    api_key: SecretString,
}

impl fmt::Debug for OpenAiInferenceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiInferenceEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenAiInferenceEngine {
    /// Create a new engine
    ///
    /// Fails with a configuration error when the API key is absent or malformed,
    /// so no request is ever sent with a bad key.
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        let api_key = config.validated_api_key()?.clone();

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::ConnectionFailed(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.default_model,
            "Initialized chat completions engine"
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn resolve_model<'a>(&'a self, request: &'a InferenceRequest) -> &'a str {
        request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [InferenceMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Pull `error.message` out of a provider error body
fn provider_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "unknown error".to_string())
}

#[async_trait]
impl InferenceEngine for OpenAiInferenceEngine {
    #[instrument(skip(self, request), fields(model = %self.resolve_model(&request)))]
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        let model = self.resolve_model(&request);

        let body = ChatCompletionRequest {
            model,
            messages: &request.messages,
            temperature: request.temperature.unwrap_or(self.config.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
        };

        debug!("Sending chat completion request");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::from_transport(&e, self.config.timeout_ms))?;

        let status = response.status();
        match status {
            StatusCode::OK => {},
            StatusCode::UNAUTHORIZED => {
                warn!("Completion API rejected the API key");
                return Err(InferenceError::InvalidApiKey);
            },
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Completion API rate limit hit");
                return Err(InferenceError::RateLimited);
            },
            _ => {
                let text = response.text().await.unwrap_or_default();
                let message = provider_message(&text);
                warn!(status = %status, message = %message, "Chat completion request failed");
                return Err(InferenceError::ServerError(message));
            },
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::InvalidResponse("response contained no choices".to_string()))?;

        let content = choice
            .message
            .content
            .ok_or_else(|| InferenceError::InvalidResponse("choice has no message content".to_string()))?;

        debug!(tokens = ?parsed.usage, "Chat completion finished");

        Ok(InferenceResponse {
            content: content.trim().to_string(),
            model: parsed.model.unwrap_or_else(|| model.to_string()),
            usage: parsed.usage,
            finish_reason: choice.finish_reason,
        })
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
