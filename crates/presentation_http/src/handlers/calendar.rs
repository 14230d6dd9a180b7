//! Calendar handlers

use axum::{Json, extract::State};
use domain::{CalendarEvent, EventId};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{error::ApiError, state::AppState};

/// Response for a created event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddEventResponse {
    pub status: String,
    pub event_id: EventId,
}

/// Add an event to the primary calendar
#[instrument(skip(state, event), fields(title = %event.title))]
pub async fn add_to_calendar(
    State(state): State<AppState>,
    Json(event): Json<CalendarEvent>,
) -> Result<Json<AddEventResponse>, ApiError> {
    let config = state.config.load();
    let service = state.services.calendar_service(&config).await?;

    let event_id = service.add_to_primary(&event).await?;
    info!(event_id = %event_id, mock = service.is_mock(), "Event added");

    Ok(Json(AddEventResponse {
        status: "success".to_string(),
        event_id,
    }))
}
