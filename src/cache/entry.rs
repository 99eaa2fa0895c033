//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and the expiration
//! policy applied to them.

use chrono::{DateTime, TimeDelta, Utc};

/// Point in time used for creation and expiry stamps.
pub type Timestamp = DateTime<Utc>;

// == Timeout Descriptor ==
/// How long an entry lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Never expires; remembers when it was written so eviction can go oldest-first
    Permanent { created_at: Timestamp },
    /// Expires once `expires_at` is no longer in the future
    TimeToLive { expires_at: Timestamp },
}

impl Timeout {
    // == Constructor ==
    /// Builds the descriptor for a write happening at `now`.
    ///
    /// A TTL too large for the timestamp range saturates to the latest
    /// representable instant.
    pub fn at(now: Timestamp, ttl_seconds: Option<u64>) -> Self {
        match ttl_seconds {
            Some(ttl) => Timeout::TimeToLive {
                expires_at: expiry_after(now, ttl),
            },
            None => Timeout::Permanent { created_at: now },
        }
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, Timeout::Permanent { .. })
    }
}

fn expiry_after(now: Timestamp, ttl_seconds: u64) -> Timestamp {
    i64::try_from(ttl_seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// == Expiration Policy ==
/// Returns whether an entry with this descriptor is alive at `now`.
///
/// Permanent entries are always alive as far as TTL goes; a TTL entry is
/// alive only while its expiry is strictly in the future.
pub fn is_alive(timeout: &Timeout, now: Timestamp) -> bool {
    match timeout {
        Timeout::Permanent { .. } => true,
        Timeout::TimeToLive { expires_at } => *expires_at > now,
    }
}

// == Cache Entry ==
/// Represents a single cache entry with value and timeout descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The stored value
    pub value: Vec<u8>,
    /// Lifetime class of the entry
    pub timeout: Timeout,
}

impl Entry {
    pub fn new(value: Vec<u8>, timeout: Timeout) -> Self {
        Self { value, timeout }
    }

    /// Bytes this entry contributes to the store's size counter, key included.
    pub fn footprint(&self, key: &str) -> u64 {
        (key.len() + self.value.len()) as u64
    }
}
