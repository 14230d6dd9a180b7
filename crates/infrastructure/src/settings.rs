//! Setup state storage
//!
//! Setup writes the API key and credentials locations to a key=value settings
//! file and saves the uploaded OAuth client credentials verbatim. Other keys
//! already present in the settings file are preserved.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::{AppConfig, GOOGLE_CREDENTIALS_PATH, GOOGLE_TOKEN_PATH, OPENAI_API_KEY};

/// Settings storage errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Submitted values are unusable
    #[error("Invalid setup input: {0}")]
    InvalidInput(String),

    /// Settings file has a malformed line
    #[error("Cannot parse settings file: {0}")]
    Parse(String),

    /// Filesystem failure
    #[error("Failed to write {path}: {reason}")]
    Io { path: String, reason: String },
}

impl SettingsError {
    fn io(path: &Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Reads and writes setup state
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings_path: PathBuf,
    credentials_path: PathBuf,
    token_path: PathBuf,
}

impl SettingsStore {
    pub fn new(
        settings_path: impl Into<PathBuf>,
        credentials_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            settings_path: settings_path.into(),
            credentials_path: credentials_path.into(),
            token_path: token_path.into(),
        }
    }

    /// Store using the locations of the given configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.storage.settings_path,
            &config.calendar.credentials_path,
            &config.calendar.token_path,
        )
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    /// Read all entries of a settings file; a missing file has none
    pub fn read_entries(path: &Path) -> Result<Vec<(String, String)>, SettingsError> {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => return Ok(Vec::new()),
            Err(e) => return Err(SettingsError::Parse(e.to_string())),
        };
        iter.collect::<Result<Vec<_>, _>>()
            .map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Persist the API key and the uploaded credentials
    ///
    /// The credentials file is written first so the settings file never
    /// points at a file that does not exist yet.
    #[instrument(skip_all, fields(settings = %self.settings_path.display(), credentials = %self.credentials_path.display()))]
    pub async fn save_setup(
        &self,
        api_key: &SecretString,
        credentials: &[u8],
    ) -> Result<(), SettingsError> {
        let key = api_key.expose_secret().trim();
        if key.is_empty() {
            return Err(SettingsError::InvalidInput("API key must not be empty".to_string()));
        }
        if key.contains(['\n', '\r']) {
            return Err(SettingsError::InvalidInput(
                "API key must be a single line".to_string(),
            ));
        }
        if credentials.is_empty() {
            return Err(SettingsError::InvalidInput(
                "credentials file must not be empty".to_string(),
            ));
        }

        write_file(&self.credentials_path, credentials).await?;

        let mut entries = Self::read_entries(&self.settings_path).unwrap_or_else(|e| {
            warn!(error = %e, "Replacing unreadable settings file");
            Vec::new()
        });
        upsert(&mut entries, OPENAI_API_KEY, key);
        upsert(
            &mut entries,
            GOOGLE_CREDENTIALS_PATH,
            &self.credentials_path.to_string_lossy(),
        );
        upsert(&mut entries, GOOGLE_TOKEN_PATH, &self.token_path.to_string_lossy());

        write_file(&self.settings_path, render(&entries).as_bytes()).await?;
        restrict_permissions(&self.settings_path).await;

        info!("Setup state saved");
        Ok(())
    }
}

fn upsert(entries: &mut Vec<(String, String)>, key: &str, value: &str) {
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value.to_string(),
        None => entries.push((key.to_string(), value.to_string())),
    }
}

/// Render entries as `KEY=value` lines
fn render(entries: &[(String, String)]) -> String {
    entries
        .iter()
        .map(|(key, value)| format!("{key}={}\n", quote(value)))
        .collect()
}

/// Quote a value so the settings parser reads it back unchanged
fn quote(value: &str) -> String {
    let bare = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:+@,".contains(c));
    if bare {
        value.to_string()
    } else if !value.contains('\'') {
        // Single quotes are literal: no escapes, no `$` expansion
        format!("'{value}'")
    } else {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('$', "\\$");
        format!("\"{escaped}\"")
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SettingsError::io(parent, &e))?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| SettingsError::io(path, &e))
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await {
        warn!(error = %e, "Could not restrict settings file permissions");
    }
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) {}
