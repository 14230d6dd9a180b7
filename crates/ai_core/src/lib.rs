//! AI Core - Chat completion client
//!
//! Provides abstractions for LLM inference against an OpenAI-compatible
//! chat completions API (bearer-token authenticated).

pub mod config;
pub mod error;
pub mod openai;
pub mod ports;

pub use config::InferenceConfig;
pub use error::InferenceError;
pub use openai::OpenAiInferenceEngine;
pub use ports::{InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage};
