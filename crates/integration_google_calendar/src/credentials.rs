//! OAuth credentials and cached tokens
//!
//! The credentials file is the OAuth client JSON downloaded from the Google
//! console (`installed` or `web` application). The token file caches the
//! access and refresh tokens between runs.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::GoogleCalendarError;

/// Tokens this close to expiry are treated as expired
const EXPIRY_SKEW_SECONDS: i64 = 60;

/// OAuth client identity from the credentials file
#[derive(Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecret")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    #[serde(default)]
    installed: Option<ClientSecret>,
    #[serde(default)]
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Parse a credentials document
    pub fn from_json(json: &str) -> Result<Self, GoogleCalendarError> {
        let file: ClientSecretsFile = serde_json::from_str(json)
            .map_err(|e| GoogleCalendarError::InvalidCredentials(e.to_string()))?;

        file.installed.or(file.web).ok_or_else(|| {
            GoogleCalendarError::InvalidCredentials(
                "expected an 'installed' or 'web' client section".to_string(),
            )
        })
    }

    /// Read a credentials file
    pub async fn load(path: &Path) -> Result<Self, GoogleCalendarError> {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            GoogleCalendarError::InvalidCredentials(format!("{}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

/// Cached OAuth token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absent when the provider did not report a lifetime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredToken")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Token endpoint response
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl StoredToken {
    /// Whether the access token can still be used at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty()
            && self
                .expires_at
                .is_none_or(|expiry| expiry - Duration::seconds(EXPIRY_SKEW_SECONDS) > now)
    }

    /// Whether a refresh is possible
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Read the cached token; `None` when the file does not exist
    pub async fn load(path: &Path) -> Result<Option<Self>, GoogleCalendarError> {
        match tokio::fs::read_to_string(path).await {
            Ok(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| GoogleCalendarError::TokenStorage(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GoogleCalendarError::TokenStorage(format!("{}: {e}", path.display()))),
        }
    }

    /// Write the token to disk
    pub async fn save(&self, path: &Path) -> Result<(), GoogleCalendarError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| GoogleCalendarError::TokenStorage(e.to_string()))?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| GoogleCalendarError::TokenStorage(format!("{}: {e}", path.display())))
    }

    /// Exchange the refresh token for a new access token
    ///
    /// The refresh token is kept when the provider does not rotate it.
    #[instrument(skip(self, client, secret))]
    pub async fn refresh(
        &self,
        client: &Client,
        token_uri: &str,
        secret: &ClientSecret,
    ) -> Result<Self, GoogleCalendarError> {
        let refresh_token = self
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GoogleCalendarError::TokenRefresh("no refresh token cached".to_string()))?;

        debug!("Refreshing access token");

        let response = client
            .post(token_uri)
            .form(&[
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| GoogleCalendarError::TokenRefresh(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {description}", e.error),
                    None => e.error,
                })
                .unwrap_or_else(|_| format!("HTTP {status}"));
            return Err(GoogleCalendarError::TokenRefresh(message));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GoogleCalendarError::TokenRefresh(e.to_string()))?;

        Ok(Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token.or_else(|| self.refresh_token.clone()),
            expires_at: token
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
            token_type: token.token_type.unwrap_or_else(default_token_type),
            scope: token.scope.or_else(|| self.scope.clone()),
        })
    }
}
