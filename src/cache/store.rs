//! Cache Store Module
//!
//! Main cache engine: one owned map from key to entry plus an incrementally
//! maintained byte counter used as the memory budget measure.

use std::collections::HashMap;

use chrono::Utc;
use tracing::debug;

use crate::cache::entry::{is_alive, Entry, Timeout, Timestamp};
use crate::cache::CacheStats;

// == Cache Store ==
/// Key-value storage holding permanent and TTL entries.
///
/// Value and timeout live in the same [`Entry`], so a key can never have one
/// without the other.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, Entry>,
    /// Sum of key and value lengths over all entries
    size_bytes: u64,
    /// Performance statistics
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty CacheStore.
    pub fn new() -> Self {
        Self::default()
    }

    // == Put ==
    /// Stores a key-value pair, permanent when `ttl_seconds` is `None`.
    ///
    /// Any existing entry for the key is replaced and its descriptor reset.
    pub fn put(&mut self, key: String, value: Vec<u8>, ttl_seconds: Option<u64>) {
        self.put_at(key, value, ttl_seconds, Utc::now());
    }

    /// [`put`](Self::put) with an explicit clock reading.
    pub fn put_at(&mut self, key: String, value: Vec<u8>, ttl_seconds: Option<u64>, now: Timestamp) {
        let entry = Entry::new(value, Timeout::at(now, ttl_seconds));
        self.size_bytes += entry.footprint(&key);
        if let Some(previous) = self.entries.insert(key.clone(), entry) {
            self.size_bytes -= previous.footprint(&key);
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired TTL entries are removed and reported as missing. Repeated
    /// reads of a live entry leave it untouched.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        self.get_at(key, Utc::now())
    }

    /// [`get`](Self::get) with an explicit clock reading.
    pub fn get_at(&mut self, key: &str, now: Timestamp) -> Option<Vec<u8>> {
        let alive = match self.entries.get(key) {
            Some(entry) => is_alive(&entry.timeout, now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if !alive {
            self.remove(key);
            self.stats.record_expired();
            self.stats.record_miss();
            debug!(key, "dropped expired entry on read");
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Remove ==
    /// Removes an entry, keeping the byte counter in step.
    pub(crate) fn remove(&mut self, key: &str) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        self.size_bytes -= entry.footprint(key);
        Some(entry)
    }

    // == Evict Oldest Permanent ==
    /// Removes up to `chunk_size` permanent entries, oldest `created_at` first.
    ///
    /// Entries created at the same instant leave in key order. Returns the
    /// number of entries removed.
    pub fn evict_oldest_permanent(&mut self, chunk_size: usize) -> usize {
        let mut permanent: Vec<(Timestamp, String)> = self
            .entries
            .iter()
            .filter_map(|(key, entry)| match entry.timeout {
                Timeout::Permanent { created_at } => Some((created_at, key.clone())),
                Timeout::TimeToLive { .. } => None,
            })
            .collect();
        permanent.sort();

        let mut removed = 0;
        for (_, key) in permanent.into_iter().take(chunk_size) {
            if self.remove(&key).is_some() {
                removed += 1;
            }
        }
        self.stats.record_permanent_evictions(removed);
        removed
    }

    // == Evict TTL Before ==
    /// Removes every TTL entry whose expiry is strictly before `horizon`.
    ///
    /// Returns the number of entries removed.
    pub fn evict_ttl_before(&mut self, horizon: Timestamp) -> usize {
        self.evict_ttl_matching(|expires_at| expires_at < horizon)
    }

    /// Removes every TTL entry regardless of expiry.
    pub fn evict_all_ttl(&mut self) -> usize {
        self.evict_ttl_matching(|_| true)
    }

    fn evict_ttl_matching(&mut self, doomed_if: impl Fn(Timestamp) -> bool) -> usize {
        let doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| {
                matches!(entry.timeout, Timeout::TimeToLive { expires_at } if doomed_if(expires_at))
            })
            .map(|(key, _)| key.clone())
            .collect();

        let removed = doomed.len();
        for key in doomed {
            self.remove(&key);
        }
        self.stats.record_ttl_evictions(removed);
        removed
    }

    /// Earliest expiry among TTL entries, if any remain.
    pub fn earliest_ttl_expiry(&self) -> Option<Timestamp> {
        self.entries
            .values()
            .filter_map(|entry| match entry.timeout {
                Timeout::TimeToLive { expires_at } => Some(expires_at),
                Timeout::Permanent { .. } => None,
            })
            .min()
    }

    // == Size ==
    /// Memory footprint proxy used by the eviction manager.
    pub fn approx_size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Descriptor stored for `key`, without applying expiry.
    pub fn timeout_of(&self, key: &str) -> Option<Timeout> {
        self.entries.get(key).map(|entry| entry.timeout)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats.size_bytes = self.size_bytes;
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
