//! Hot-reloadable configuration support
//!
//! The configuration is reloaded after a completed setup and on SIGHUP.
//! Requests take one snapshot and keep it for their whole lifetime.

use std::{fmt, sync::Arc};

use arc_swap::ArcSwap;
use infrastructure::{AppConfig, ConfigError};
use tracing::{error, info, warn};

/// Function producing a fresh configuration
pub type ConfigLoader = Arc<dyn Fn() -> Result<AppConfig, ConfigError> + Send + Sync>;

/// A wrapper around `AppConfig` that supports atomic reload
#[derive(Clone)]
pub struct ReloadableConfig {
    inner: Arc<ArcSwap<AppConfig>>,
    loader: ConfigLoader,
}

impl fmt::Debug for ReloadableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadableConfig")
            .field("current", &self.inner.load_full())
            .finish_non_exhaustive()
    }
}

impl ReloadableConfig {
    /// Create a reloadable configuration that reloads via [`AppConfig::load`]
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self::with_loader(config, Arc::new(AppConfig::load))
    }

    /// Create a reloadable configuration with a custom loader
    #[must_use]
    pub fn with_loader(config: AppConfig, loader: ConfigLoader) -> Self {
        Self {
            inner: Arc::new(ArcSwap::new(Arc::new(config))),
            loader,
        }
    }

    /// Get the current configuration
    #[must_use]
    pub fn load(&self) -> Arc<AppConfig> {
        self.inner.load_full()
    }

    /// Reload configuration; the previous snapshot stays on failure
    pub fn reload(&self) -> Result<(), ConfigError> {
        let new_config = (self.loader)().inspect_err(|e| {
            error!(error = %e, "Failed to reload configuration");
        })?;

        let old_config = self.inner.swap(Arc::new(new_config));
        info!(
            old_host = %old_config.server.host,
            old_port = %old_config.server.port,
            "Configuration reloaded successfully"
        );
        Ok(())
    }
}

/// Spawn a background task that listens for SIGHUP and reloads configuration
#[cfg(unix)]
pub fn spawn_config_reload_handler(config: ReloadableConfig) -> ReloadableConfig {
    use tokio::signal::unix::{SignalKind, signal};

    let config_clone = config.clone();
    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to install SIGHUP handler: {}", e);
                return;
            },
        };

        loop {
            sighup.recv().await;
            info!("Received SIGHUP, reloading configuration...");
            if config_clone.reload().is_err() {
                warn!("Configuration reload failed, keeping previous config");
            }
        }
    });

    config
}

/// No-op on non-Unix systems
#[cfg(not(unix))]
pub fn spawn_config_reload_handler(config: ReloadableConfig) -> ReloadableConfig {
    warn!("SIGHUP config reload not supported on this platform");
    config
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU16, Ordering};

    use super::*;

    fn counting_loader(counter: Arc<AtomicU16>) -> ConfigLoader {
        Arc::new(move || -> Result<AppConfig, ConfigError> {
            let mut config = AppConfig::default();
            config.server.port = 9000 + counter.fetch_add(1, Ordering::SeqCst);
            Ok(config)
        })
    }

    #[test]
    fn load_returns_initial_config() {
        let mut config = AppConfig::default();
        config.server.port = 8080;
        let reloadable = ReloadableConfig::new(config);

        assert_eq!(reloadable.load().server.port, 8080);
    }

    #[test]
    fn reload_swaps_snapshot() {
        let counter = Arc::new(AtomicU16::new(0));
        let reloadable = ReloadableConfig::with_loader(AppConfig::default(), counting_loader(counter));

        let before = reloadable.load();
        reloadable.reload().unwrap();

        assert_eq!(before.server.port, 8000);
        assert_eq!(reloadable.load().server.port, 9000);
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let reloadable = ReloadableConfig::with_loader(
            AppConfig::default(),
            Arc::new(|| -> Result<AppConfig, ConfigError> {
                Err(ConfigError::Message("broken".to_string()))
            }),
        );

        assert!(reloadable.reload().is_err());
        assert_eq!(reloadable.load().server.port, 8000);
    }

    #[test]
    fn debug_shows_current_snapshot_port() {
        let reloadable = ReloadableConfig::new(AppConfig::default());
        let debug = format!("{reloadable:?}");

        assert!(debug.starts_with("ReloadableConfig"));
        assert!(debug.contains("8000"));
    }

    #[test]
    fn clones_share_state() {
        let counter = Arc::new(AtomicU16::new(0));
        let reloadable = ReloadableConfig::with_loader(AppConfig::default(), counting_loader(counter));
        let clone = reloadable.clone();

        clone.reload().unwrap();
        assert_eq!(reloadable.load().server.port, 9000);
    }
}
