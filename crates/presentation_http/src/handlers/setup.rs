//! One-time setup handlers
//!
//! The setup page posts the completion API key and the OAuth client
//! credentials file as multipart form data.

use axum::{
    Json,
    extract::{Multipart, State},
    response::Html,
};
use infrastructure::SettingsStore;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{error::ApiError, state::AppState};

/// Multipart field holding the API key
pub const API_KEY_FIELD: &str = "openai_key";

/// Multipart field holding the credentials file
pub const CREDENTIALS_FIELD: &str = "credentials_file";

const SETUP_PAGE: &str = include_str!("../../static/setup.html");

/// Setup confirmation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupResponse {
    pub message: String,
}

/// Serve the setup page
pub async fn setup_page() -> Html<&'static str> {
    Html(SETUP_PAGE)
}

/// Persist the API key and credentials, then reload configuration
#[instrument(skip_all)]
pub async fn submit_setup(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SetupResponse>, ApiError> {
    let mut api_key: Option<SecretString> = None;
    let mut credentials: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(API_KEY_FIELD) => api_key = Some(SecretString::from(field.text().await?)),
            Some(CREDENTIALS_FIELD) => credentials = Some(field.bytes().await?.to_vec()),
            _ => {},
        }
    }

    let api_key = api_key.ok_or_else(|| missing_field(API_KEY_FIELD))?;
    let credentials = credentials.ok_or_else(|| missing_field(CREDENTIALS_FIELD))?;

    let config = state.config.load();
    SettingsStore::from_config(&config)
        .save_setup(&api_key, &credentials)
        .await?;
    state.config.reload()?;

    info!(credentials_bytes = credentials.len(), "Setup completed");
    Ok(Json(SetupResponse {
        message: "Setup completed successfully".to_string(),
    }))
}

fn missing_field(name: &str) -> ApiError {
    ApiError::UnprocessableEntity(format!("missing form field '{name}'"))
}
