//! OpenAI chat completions engine
//!
//! Works against any server exposing `POST {base_url}/chat/completions`
//! with bearer authentication.

mod client;

pub use client::OpenAiInferenceEngine;
