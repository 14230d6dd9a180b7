//! Infrastructure layer
//!
//! Configuration loading, setup state storage, logging initialization and the
//! adapters connecting application ports to the completion and calendar APIs.

pub mod adapters;
pub mod config;
pub mod factory;
pub mod settings;
pub mod telemetry;

pub use ::config::ConfigError;
pub use adapters::*;
pub use config::{AppConfig, ServerConfig, StorageConfig};
pub use factory::{DefaultServiceFactory, ServiceFactory};
pub use settings::{SettingsError, SettingsStore};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
