//! Todo calendar HTTP server
//!
//! Main entry point for the HTTP API server.

use std::{future::IntoFuture, sync::Arc, time::Duration};

use axum::http::{HeaderValue, Method};
use infrastructure::{AppConfig, DefaultServiceFactory, init_telemetry};
use presentation_http::{
    ReloadableConfig, routes, serve_with_drain_deadline, shutdown_signal, spawn_config_reload_handler,
    state::AppState,
};
use tokio::{net::TcpListener, sync::oneshot};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let initial_config = AppConfig::load()?;
    init_telemetry(&initial_config.telemetry)?;

    info!("Todo calendar server v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        host = %initial_config.server.host,
        port = %initial_config.server.port,
        model = %initial_config.inference.default_model,
        api_key_set = initial_config.inference.api_key.is_some(),
        credentials = %initial_config.calendar.credentials_path.display(),
        "Configuration loaded"
    );
    if initial_config.inference.api_key.is_none() {
        warn!("No API key configured, complete setup at /setup");
    }

    let reloadable_config = spawn_config_reload_handler(ReloadableConfig::new(initial_config.clone()));
    let state = AppState::new(reloadable_config, Arc::new(DefaultServiceFactory));

    let cors_layer = cors_layer(&initial_config.server.allowed_origins);

    let app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer);

    let addr = initial_config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Setup page: http://{}/setup", addr);

    let shutdown_timeout =
        Duration::from_secs(initial_config.server.shutdown_timeout_secs.unwrap_or(30));

    let (signalled_tx, signalled_rx) = oneshot::channel();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(signalled_tx))
        .into_future();
    serve_with_drain_deadline(server, signalled_rx, shutdown_timeout).await?;

    info!("Server shutdown complete");

    Ok(())
}

/// Open CORS when no origins are configured
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
