//! Cache Module
//!
//! Provides in-memory caching of permanent and TTL entries under a byte
//! budget.

mod entry;
mod eviction;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{is_alive, Entry, Timeout, Timestamp};
pub use eviction::{EvictionPolicy, EvictionReport};
pub use stats::CacheStats;
pub use store::CacheStore;
