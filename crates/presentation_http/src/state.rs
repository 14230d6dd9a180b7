//! Application state shared across handlers

use std::{fmt, sync::Arc};

use infrastructure::ServiceFactory;

use crate::config_reload::ReloadableConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Current configuration snapshot holder
    pub config: ReloadableConfig,
    /// Builds per-request services from a configuration snapshot
    pub services: Arc<dyn ServiceFactory>,
}

impl AppState {
    pub fn new(config: ReloadableConfig, services: Arc<dyn ServiceFactory>) -> Self {
        Self { config, services }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
