//! Eviction Module
//!
//! Keeps the store under its byte budget. Old permanent entries go first,
//! a chunk at a time; once none are left, TTL entries are drained by an
//! expiry horizon that widens one step per pass.

use chrono::{TimeDelta, Utc};
use tracing::{debug, info};

use crate::cache::entry::Timestamp;
use crate::cache::CacheStore;
use crate::config::Config;

// == Eviction Policy ==
/// Parameters of the memory manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    /// Permanent entries removed per pass
    pub chunk_size: usize,
    /// Horizon increment in seconds when draining TTL entries
    pub step_seconds: u64,
    /// Size the store must be brought back under
    pub byte_limit: u64,
}

/// What one [`EvictionPolicy::manage_memory`] call removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionReport {
    pub permanent_removed: usize,
    pub ttl_removed: usize,
}

impl EvictionReport {
    pub fn is_empty(&self) -> bool {
        self.permanent_removed == 0 && self.ttl_removed == 0
    }
}

impl EvictionPolicy {
    pub fn new(chunk_size: usize, step_seconds: u64, byte_limit: u64) -> Self {
        Self {
            chunk_size,
            step_seconds,
            byte_limit,
        }
    }

    /// Builds the policy from a validated [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.clear_perm_chunk,
            config.clear_ttl_step,
            config.byte_limit(),
        )
    }

    // == Manage Memory ==
    /// Evicts entries until the store is at or under `byte_limit`.
    pub fn manage_memory(&self, store: &mut CacheStore) -> EvictionReport {
        self.manage_memory_at(store, Utc::now())
    }

    /// [`manage_memory`](Self::manage_memory) with an explicit clock reading.
    ///
    /// Terminates for any limit: the byte counter of an empty store is zero.
    /// A `chunk_size` of zero never removes permanent entries, so such a
    /// policy can spin forever once only permanent data remains;
    /// [`Config::validate`] rejects it.
    pub fn manage_memory_at(&self, store: &mut CacheStore, now: Timestamp) -> EvictionReport {
        let mut report = EvictionReport::default();

        while self.over_budget(store) && !store.is_empty() {
            let removed = store.evict_oldest_permanent(self.chunk_size);
            report.permanent_removed += removed;
            debug!(
                removed,
                size_bytes = store.approx_size_bytes(),
                "evicted oldest permanent chunk"
            );

            if removed == 0 {
                report.ttl_removed += self.drain_ttl(store, now);
            }
        }

        if !report.is_empty() {
            info!(
                permanent = report.permanent_removed,
                ttl = report.ttl_removed,
                size_bytes = store.approx_size_bytes(),
                limit = self.byte_limit,
                "memory budget enforced"
            );
        }
        report
    }

    fn over_budget(&self, store: &CacheStore) -> bool {
        store.approx_size_bytes() > self.byte_limit
    }

    /// Removes TTL entries expiring before `now + n * step_seconds` for
    /// n = 1, 2, ... until the store fits or no TTL entry is left.
    fn drain_ttl(&self, store: &mut CacheStore, now: Timestamp) -> usize {
        let step = step_delta(self.step_seconds);
        let mut horizon = now.checked_add_signed(step);
        let mut removed = 0;

        while self.over_budget(store) {
            let Some(earliest) = store.earliest_ttl_expiry() else {
                break;
            };
            let Some(current) = horizon else {
                // Horizon ran off the end of the timestamp range
                removed += store.evict_all_ttl();
                break;
            };

            // Passes that would remove nothing are skipped in one jump
            let current = if earliest >= current {
                skip_to_cover(current, earliest, self.step_seconds)
            } else {
                Some(current)
            };
            let Some(current) = current else {
                removed += store.evict_all_ttl();
                break;
            };

            let n = store.evict_ttl_before(current);
            removed += n;
            debug!(
                removed = n,
                horizon = %current,
                size_bytes = store.approx_size_bytes(),
                "drained ttl entries"
            );
            horizon = current.checked_add_signed(step);
        }
        removed
    }
}

fn step_delta(step_seconds: u64) -> TimeDelta {
    i64::try_from(step_seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

/// First horizon on the `horizon + k * step` grid lying strictly after `earliest`.
fn skip_to_cover(horizon: Timestamp, earliest: Timestamp, step_seconds: u64) -> Option<Timestamp> {
    let gap = (earliest - horizon).num_seconds().max(0) as u64;
    let steps = gap / step_seconds.max(1) + 1;
    let jump = steps.checked_mul(step_seconds.max(1))?;
    let jump = TimeDelta::try_seconds(i64::try_from(jump).ok()?)?;
    horizon.checked_add_signed(jump)
}
