//! NCache - An in-memory key-value cache over a plain-text TCP protocol
//!
//! Serves a single client connection, then exits.

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ncache::{Config, Server};

/// Main entry point for the NCache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Bind the TCP listener
/// 4. Serve one connection until the client disconnects
/// 5. Stop early on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ncache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting NCache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: addr={}, buffer_size={}, byte_limit={}, perm_chunk={}, ttl_step={}s",
        config.socket_addr(),
        config.buffer_size,
        config.byte_limit(),
        config.clear_perm_chunk,
        config.clear_ttl_step
    );

    let server = Server::bind(&config)
        .await
        .with_context(|| format!("failed to start server on {}", config.socket_addr()))?;

    tokio::select! {
        result = server.serve_once() => {
            result.context("session failed")?;
        }
        _ = shutdown_signal() => {
            warn!("Session interrupted");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
