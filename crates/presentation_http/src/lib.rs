//! Todo calendar HTTP presentation layer
//!
//! This crate provides the HTTP API used by the browser extension.

pub mod config_reload;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod shutdown;
pub mod state;

pub use config_reload::{ConfigLoader, ReloadableConfig, spawn_config_reload_handler};
pub use error::ApiError;
pub use routes::create_router;
pub use shutdown::{serve_with_drain_deadline, shutdown_signal};
pub use state::AppState;
