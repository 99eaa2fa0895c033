//! Server Module
//!
//! TCP listener serving exactly one client session per process.
//!
//! The listener accepts a single connection and does not go back to accept
//! another once it closes. All commands run sequentially against a store
//! the session owns outright, so no locking is involved.

mod connection;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cache::{CacheStore, EvictionPolicy};
use crate::config::Config;
use crate::error::Result;

pub use connection::handle_connection;

// == Server ==
/// Bound listener plus the settings the session runs with.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    policy: EvictionPolicy,
    buffer_size: usize,
}

impl Server {
    // == Bind ==
    /// Validates `config` and binds the listener to its address.
    pub async fn bind(config: &Config) -> Result<Self> {
        config.validate()?;
        let listener = TcpListener::bind(config.socket_addr()).await?;
        info!(addr = %listener.local_addr()?, "Server listening");

        Ok(Self {
            listener,
            policy: EvictionPolicy::from_config(config),
            buffer_size: config.buffer_size,
        })
    }

    /// Address actually bound, useful when the configured port is 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn policy(&self) -> &EvictionPolicy {
        &self.policy
    }

    // == Serve Once ==
    /// Accepts one connection, serves it until the peer disconnects and
    /// hands back the store.
    pub async fn serve_once(self) -> Result<CacheStore> {
        let (stream, addr) = self.listener.accept().await?;
        info!(%addr, "Connection accepted");

        let mut store = CacheStore::new();
        let outcome = handle_connection(stream, &mut store, &self.policy, self.buffer_size).await;
        finish_session(outcome, store)
    }
}

/// Logs the end-of-session statistics, whether or not the session failed,
/// then passes the outcome on.
fn finish_session(outcome: Result<()>, store: CacheStore) -> Result<CacheStore> {
    if let Err(err) = &outcome {
        warn!(error = %err, "Session ended by socket error");
    }

    let stats = store.stats();
    match serde_json::to_string(&stats) {
        Ok(snapshot) => info!(stats = %snapshot, hit_rate = stats.hit_rate(), "Session closed"),
        Err(err) => warn!(error = %err, "Session closed, stats not serializable"),
    }

    outcome.map(|()| store)
}
