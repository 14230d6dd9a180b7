//! Route definitions

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::{handlers, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.load().server.max_body_size_bytes;

    Router::new()
        // Health endpoints
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        // Task extraction
        .route("/analyze", post(handlers::analyze::analyze_text))
        // Calendar
        .route("/calendar/add", post(handlers::calendar::add_to_calendar))
        // Setup
        .route(
            "/setup",
            get(handlers::setup::setup_page).post(handlers::setup::submit_setup),
        )
        .route("/api/setup", post(handlers::setup::submit_setup))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        // Attach state
        .with_state(state)
}
