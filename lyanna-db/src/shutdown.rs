//! Ctrl-C / SIGTERM handling.
//!
//! A signal cancels the shared token; running dump/restore children are
//! killed and the operation fails with a process error.

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Wait for SIGINT or SIGTERM and cancel `cancel`. Returns early if the
/// token is cancelled by someone else.
pub async fn cancel_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, cancelling"),
        _ = terminate => info!("Received SIGTERM, cancelling"),
        _ = cancel.cancelled() => return,
    }

    cancel.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_returns_when_token_cancelled_elsewhere() {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(cancel_on_signal(cancel.clone()));

        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("signal watcher did not stop")
            .unwrap();
    }
}
