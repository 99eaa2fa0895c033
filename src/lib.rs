//! NCache - An in-memory key-value cache over a plain-text TCP protocol
//!
//! Stores permanent and TTL entries under a byte budget, evicting old
//! permanent data first and then TTL data by a widening expiry horizon.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;

pub use cache::{CacheStore, EvictionPolicy};
pub use client::{CacheClient, ClientOptions};
pub use config::Config;
pub use error::{CacheError, CommandError, Result};
pub use server::Server;
