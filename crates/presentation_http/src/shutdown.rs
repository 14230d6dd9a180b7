//! Graceful shutdown with a drain deadline
//!
//! Once a shutdown signal arrives, in-flight connections get
//! `server.shutdown_timeout_secs` to finish before the server stops waiting.

use std::{future::Future, time::Duration};

use tokio::{signal, sync::oneshot};
use tracing::{error, info, warn};

/// Drive `server` to completion, bounding the drain after `signalled` fires
///
/// Returns the server's own result when it finishes first or drains in time.
/// When the deadline passes, the remaining connections are dropped and
/// `Ok(())` is returned.
pub async fn serve_with_drain_deadline<S, E>(
    server: S,
    signalled: oneshot::Receiver<()>,
    timeout: Duration,
) -> Result<(), E>
where
    S: Future<Output = Result<(), E>>,
{
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        Ok(()) = signalled => {},
    }

    info!("Waiting up to {:?} for connections to close...", timeout);
    if let Ok(result) = tokio::time::timeout(timeout, server).await {
        result
    } else {
        warn!(timeout_secs = timeout.as_secs(), "Shutdown deadline passed, dropping open connections");
        Ok(())
    }
}

/// Wait for SIGINT or SIGTERM, then notify `signalled`
pub async fn shutdown_signal(signalled: oneshot::Sender<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    // The receiver is gone only when the server already stopped
    let _ = signalled.send(());
}

#[cfg(test)]
mod tests {
    use std::{future::pending, io, time::Instant};

    use super::*;

    #[tokio::test]
    async fn stuck_drain_stops_at_deadline() {
        let (tx, rx) = oneshot::channel();
        tx.send(()).unwrap();

        let started = Instant::now();
        let result: Result<(), io::Error> =
            serve_with_drain_deadline(pending(), rx, Duration::from_millis(50)).await;

        assert!(result.is_ok());
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn drain_within_deadline_returns_server_result() {
        let (tx, rx) = oneshot::channel();
        tx.send(()).unwrap();

        let server = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err::<(), _>(io::Error::other("listener closed"))
        };
        let result = serve_with_drain_deadline(server, rx, Duration::from_secs(5)).await;

        assert_eq!(result.unwrap_err().to_string(), "listener closed");
    }

    #[tokio::test]
    async fn server_finishing_before_signal_is_not_delayed() {
        let (_tx, rx) = oneshot::channel();

        let started = Instant::now();
        let result: Result<(), io::Error> =
            serve_with_drain_deadline(async { Ok(()) }, rx, Duration::from_secs(30)).await;

        assert!(result.is_ok());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn dropped_signal_sender_does_not_start_the_deadline() {
        let (tx, rx) = oneshot::channel::<()>();
        drop(tx);

        let server = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Err::<(), _>(io::Error::other("stopped"))
        };
        let result = serve_with_drain_deadline(server, rx, Duration::from_millis(1)).await;

        assert!(result.is_err());
    }
}
