//! Process plumbing shared by the binary and tests.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

/// Default file the ephemeral-port mode writes the bound address to.
pub const DEFAULT_PORT_FILE: &str = "final-port.txt";

/// Resolve when the process receives Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}

/// Write the bound address (e.g. `127.0.0.1:49152`) for test harnesses.
pub fn write_port_file(path: &Path, addr: SocketAddr) -> std::io::Result<()> {
    std::fs::write(path, addr.to_string())
}

/// Shared HTTP client for upstream APIs.
///
/// No timeout unless one is configured.
pub fn build_http_client(timeout: Option<Duration>) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        // Keep connections alive for reuse
        .tcp_keepalive(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90));

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}
