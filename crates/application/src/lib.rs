//! Application layer - Use cases and orchestration
//!
//! Contains the task extraction pipeline, port definitions and the services
//! that orchestrate domain objects and infrastructure adapters.

pub mod error;
pub mod ports;
pub mod prompt;
pub mod services;
pub mod task_parser;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
pub use task_parser::{ParseFailure, ParseOutcome, normalize_time, parse_model_output};
