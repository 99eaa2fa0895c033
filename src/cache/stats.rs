//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, expirations and
//! evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// TTL entries dropped because a read found them expired
    pub expired: u64,
    /// Permanent entries removed by the eviction manager
    pub evicted_permanent: u64,
    /// TTL entries removed by the eviction manager
    pub evicted_ttl: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Current value of the byte counter
    pub size_bytes: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expired(&mut self) {
        self.expired += 1;
    }

    pub fn record_permanent_evictions(&mut self, count: usize) {
        self.evicted_permanent += count as u64;
    }

    pub fn record_ttl_evictions(&mut self, count: usize) {
        self.evicted_ttl += count as u64;
    }

    /// Total entries removed under memory pressure.
    pub fn evictions(&self) -> u64 {
        self.evicted_permanent + self.evicted_ttl
    }
}
