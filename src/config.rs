//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::error::{CacheError, Result};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the listener binds to
    pub bind_address: String,
    /// TCP server port
    pub server_port: u16,
    /// Bytes requested per socket read; one read is one command
    pub buffer_size: usize,
    /// Memory budget in bytes
    pub max_memory: u64,
    /// Fraction of `max_memory` that triggers eviction
    pub memory_tolerance: f64,
    /// Permanent keys removed per eviction pass
    pub clear_perm_chunk: usize,
    /// Horizon increment in seconds when draining TTL keys
    pub clear_ttl_step: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BIND_ADDRESS` - Listen address (default: 127.0.0.1)
    /// - `SERVER_PORT` - TCP port (default: 5005)
    /// - `BUFFER_SIZE` - Read buffer in bytes (default: 1024)
    /// - `MAX_MEMORY` - Memory budget in bytes (default: 1933000000)
    /// - `MEMORY_TOLERANCE` - Fraction of the budget used as limit (default: 0.95)
    /// - `CLEAR_PERM_CHUNK` - Permanent keys evicted per pass (default: 1)
    /// - `CLEAR_TTL_STEP` - TTL eviction step in seconds (default: 300)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            buffer_size: env_or("BUFFER_SIZE", defaults.buffer_size),
            max_memory: env_or("MAX_MEMORY", defaults.max_memory),
            memory_tolerance: env_or("MEMORY_TOLERANCE", defaults.memory_tolerance),
            clear_perm_chunk: env_or("CLEAR_PERM_CHUNK", defaults.clear_perm_chunk),
            clear_ttl_step: env_or("CLEAR_TTL_STEP", defaults.clear_ttl_step),
        }
    }

    /// Effective eviction threshold: `max_memory * memory_tolerance`, truncated.
    pub fn byte_limit(&self) -> u64 {
        (self.max_memory as f64 * self.memory_tolerance) as u64
    }

    /// `host:port` string for the listener.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.server_port)
    }

    /// Rejects settings under which the server cannot read or the
    /// eviction loop cannot make progress.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(CacheError::Config("BUFFER_SIZE must be at least 1".to_string()));
        }
        if self.clear_perm_chunk == 0 {
            return Err(CacheError::Config(
                "CLEAR_PERM_CHUNK must be at least 1".to_string(),
            ));
        }
        if self.clear_ttl_step == 0 {
            return Err(CacheError::Config(
                "CLEAR_TTL_STEP must be at least 1 second".to_string(),
            ));
        }
        if !self.memory_tolerance.is_finite()
            || self.memory_tolerance <= 0.0
            || self.memory_tolerance > 1.0
        {
            return Err(CacheError::Config(format!(
                "MEMORY_TOLERANCE must be in (0, 1], got {}",
                self.memory_tolerance
            )));
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            server_port: 5005,
            buffer_size: 1024,
            max_memory: 1_933_000_000,
            memory_tolerance: 0.95,
            clear_perm_chunk: 1,
            clear_ttl_step: 300,
        }
    }
}
