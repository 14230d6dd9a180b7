//! Application configuration
//!
//! Layers, lowest precedence first:
//! - built-in defaults
//! - optional `config.toml` (or any format the `config` crate detects)
//! - `TODOCAL_*` environment variables, `__` separating sections
//!   (e.g. `TODOCAL_SERVER__PORT=9000`)
//! - the flat keys `OPENAI_API_KEY`, `GOOGLE_CREDENTIALS_PATH` and
//!   `GOOGLE_TOKEN_PATH` from the process environment
//! - the same flat keys from the settings file written by setup

mod server;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ai_core::InferenceConfig;
use integration_google_calendar::GoogleCalendarConfig;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use server::ServerConfig;

use crate::settings::SettingsStore;
use crate::telemetry::TelemetryConfig;

/// Environment variable prefix for layered configuration
pub const ENV_PREFIX: &str = "TODOCAL";

/// Flat key holding the completion API key
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Flat key holding the OAuth client credentials path
pub const GOOGLE_CREDENTIALS_PATH: &str = "GOOGLE_CREDENTIALS_PATH";

/// Flat key holding the cached token path
pub const GOOGLE_TOKEN_PATH: &str = "GOOGLE_TOKEN_PATH";

/// Where setup state lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key=value settings file written by setup
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,
}

fn default_settings_path() -> PathBuf {
    PathBuf::from(".env")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion API configuration
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Google Calendar configuration
    #[serde(default)]
    pub calendar: GoogleCalendarConfig,

    /// Setup state storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from `config.*` and the process environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new("config"), std::env::vars())
    }

    /// Load configuration from an explicit config file stem and environment
    pub fn load_from<I>(config_file: &Path, env: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env: HashMap<String, String> = env.into_iter().collect();
        let prefixed: config::Map<String, String> = env
            .iter()
            .filter(|(key, _)| key.starts_with(&format!("{ENV_PREFIX}_")))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let builder = config::Config::builder()
            .add_source(config::File::with_name(&config_file.to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(prefixed)),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.apply_flat_settings(&env);
        match SettingsStore::read_entries(&config.storage.settings_path) {
            Ok(entries) => {
                let entries: HashMap<String, String> = entries.into_iter().collect();
                config.apply_flat_settings(&entries);
            },
            Err(e) => {
                warn!(
                    path = %config.storage.settings_path.display(),
                    error = %e,
                    "Ignoring unreadable settings file"
                );
            },
        }

        config.validate()?;
        Ok(config)
    }

    /// Override from flat `KEY=value` settings, ignoring empty values
    pub fn apply_flat_settings(&mut self, settings: &HashMap<String, String>) {
        let get = |key: &str| {
            settings
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = get(OPENAI_API_KEY) {
            self.inference.api_key = Some(SecretString::from(key.to_string()));
            debug!("API key taken from flat settings");
        }
        if let Some(path) = get(GOOGLE_CREDENTIALS_PATH) {
            self.calendar.credentials_path = PathBuf::from(path);
        }
        if let Some(path) = get(GOOGLE_TOKEN_PATH) {
            self.calendar.token_path = PathBuf::from(path);
        }
    }

    /// Check values that would only fail later at request time
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.calendar
            .validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;

        if !(0.0..=2.0).contains(&self.inference.temperature) {
            return Err(config::ConfigError::Message(format!(
                "inference.temperature must be between 0.0 and 2.0, got {}",
                self.inference.temperature
            )));
        }
        if self.inference.timeout_ms == 0 {
            return Err(config::ConfigError::Message(
                "inference.timeout_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
