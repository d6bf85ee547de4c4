//! Signal handling for the `watch` command
//!
//! Resolves once CTRL-C or SIGTERM arrives so the poller can be cancelled
//! cleanly.

use tokio::signal;
use tracing::{info, warn};

/// Wait for CTRL-C or (on Unix) SIGTERM
///
/// If a handler cannot be installed the failure is logged and that signal
/// source is treated as never firing.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Ctrl+C signal received"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("SIGTERM signal received");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
