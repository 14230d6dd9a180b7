//! Text analysis handler

use axum::{Json, extract::State};
use domain::TaskRecord;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{error::ApiError, state::AppState};

/// Request body for `/analyze`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Free text to extract a task from
    pub text: String,
}

/// Extract a task from free text
#[instrument(skip(state, request), fields(text_len = request.text.len()))]
pub async fn analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<TaskRecord>, ApiError> {
    let config = state.config.load();
    let service = state.services.extraction_service(&config).await?;

    let task = service.extract_task(&request.text).await?;
    info!(title = %task.title, "Analyzed text");

    Ok(Json(task))
}
