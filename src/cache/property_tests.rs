//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check store accounting and eviction ordering over
//! arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;

use chrono::{TimeDelta, Utc};

use crate::cache::{CacheStore, EvictionPolicy};

// == Strategies ==
/// Generates cache keys (non-empty, no spaces)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,16}".prop_map(|s| s)
}

/// Generates arbitrary byte values
fn valid_value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..128)
}

/// Long TTLs only, so nothing expires while a case runs
fn ttl_strategy() -> impl Strategy<Value = Option<u64>> {
    prop_oneof![Just(None), (3_600u64..86_400).prop_map(Some)]
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Put {
        key: String,
        value: Vec<u8>,
        ttl: Option<u64>,
    },
    Get {
        key: String,
    },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy(), ttl_strategy())
            .prop_map(|(key, value, ttl)| CacheOp::Put { key, value, ttl }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The byte counter always equals the sum of live key and value lengths,
    // and every read agrees with a plain map model.
    #[test]
    fn prop_store_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store = CacheStore::new();
        let mut model: HashMap<String, Vec<u8>> = HashMap::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Put { key, value, ttl } => {
                    store.put(key.clone(), value.clone(), ttl);
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    let got = store.get(&key);
                    prop_assert_eq!(got.as_ref(), model.get(&key));
                    if got.is_some() {
                        expected_hits += 1;
                    } else {
                        expected_misses += 1;
                    }
                }
            }

            let expected_size: usize = model.iter().map(|(k, v)| k.len() + v.len()).sum();
            prop_assert_eq!(store.approx_size_bytes(), expected_size as u64);
            prop_assert_eq!(store.len(), model.len());
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
    }

    // Storing and then retrieving before expiry returns the exact value.
    #[test]
    fn prop_roundtrip_storage(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        ttl in ttl_strategy()
    ) {
        let mut store = CacheStore::new();
        store.put(key.clone(), value.clone(), ttl);

        prop_assert_eq!(store.get(&key), Some(value.clone()));
        prop_assert_eq!(store.get(&key), Some(value));
    }

    // A second put for the same key wins and leaves a single entry.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy(),
        ttl1 in ttl_strategy(),
        ttl2 in ttl_strategy()
    ) {
        let mut store = CacheStore::new();
        store.put(key.clone(), value1, ttl1);
        store.put(key.clone(), value2.clone(), ttl2);

        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.approx_size_bytes(), (key.len() + value2.len()) as u64);
        prop_assert_eq!(store.timeout_of(&key).map(|t| t.is_permanent()), Some(ttl2.is_none()));
        prop_assert_eq!(store.get(&key), Some(value2));
    }

    // A memory pass always ends at or under the limit.
    #[test]
    fn prop_eviction_respects_limit(
        ops in prop::collection::vec(cache_op_strategy(), 1..60),
        limit in 0u64..2_000,
        chunk_size in 1usize..5,
        step_seconds in 1u64..1_000
    ) {
        let mut store = CacheStore::new();
        let policy = EvictionPolicy::new(chunk_size, step_seconds, limit);

        for op in ops {
            policy.manage_memory(&mut store);
            prop_assert!(store.approx_size_bytes() <= limit);
            match op {
                CacheOp::Put { key, value, ttl } => store.put(key, value, ttl),
                CacheOp::Get { key } => { store.get(&key); }
            }
        }
    }

    // Permanent entries leave strictly oldest-first, and TTL entries are
    // untouched while any permanent entry remains.
    #[test]
    fn prop_permanent_evicted_oldest_first(
        ages in prop::collection::hash_set(0i64..100_000, 2..20),
        ttl_count in 0usize..5,
        chunk_size in 1usize..4
    ) {
        let mut store = CacheStore::new();
        let now = Utc::now();
        for age in &ages {
            store.put_at(format!("p{}", age), vec![0; 8], None, now - TimeDelta::seconds(*age));
        }
        for i in 0..ttl_count {
            store.put_at(format!("t{}", i), vec![0; 8], Some(60), now);
        }

        let mut by_age: Vec<i64> = ages.iter().copied().collect();
        by_age.sort_unstable_by(|a, b| b.cmp(a));

        while !by_age.is_empty() {
            let removed = store.evict_oldest_permanent(chunk_size);
            let expected: Vec<i64> = by_age.drain(..removed).collect();
            prop_assert_eq!(removed, chunk_size.min(expected.len() + by_age.len()));
            for age in expected {
                let key = format!("p{}", age);
                prop_assert!(store.timeout_of(&key).is_none());
            }
            for age in &by_age {
                let key = format!("p{}", age);
                prop_assert!(store.timeout_of(&key).is_some());
            }
            prop_assert_eq!(store.len(), by_age.len() + ttl_count);
        }
    }
}
