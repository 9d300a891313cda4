//! Property-Based Tests for Cache Module
//!
//! Store calls are async; `tokio_test::block_on` drives them from the
//! synchronous proptest bodies.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use proptest::prelude::*;
use serde_json::{Map, Value};
use tokio_test::block_on;

use crate::cache::{generate_key, CacheClient, CacheStore, KeyParams, MemoryStore};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_DEFAULT_TTL: u64 = 300;

// == Strategies ==
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:-]{1,64}"
}

fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,256}"
}

/// Query-string style parameter pairs with unique names.
fn param_pairs_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::btree_map("[a-zA-Z]{1,12}", "[a-zA-Z0-9 %&=]{0,16}", 0..8)
        .prop_map(|map| map.into_iter().collect())
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
    Flush,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
        Just(CacheOp::Flush),
    ]
}

// == Key Builder ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The key depends on parameter names and values, never on the order
    /// they were inserted in.
    #[test]
    fn prop_key_independent_of_insertion_order(
        pairs in param_pairs_strategy(),
        path in param_pairs_strategy(),
    ) {
        let forward: HashMap<String, String> = pairs.iter().cloned().collect();
        let backward: BTreeMap<String, String> = pairs.iter().rev().cloned().collect();

        let mut forward_map = Map::new();
        for (k, v) in &pairs {
            forward_map.insert(k.clone(), Value::String(v.clone()));
        }
        let mut backward_map = Map::new();
        for (k, v) in pairs.iter().rev() {
            backward_map.insert(k.clone(), Value::String(v.clone()));
        }

        let a = generate_key("albums-list", &forward);
        let b = generate_key("albums-list", &backward);
        let c = generate_key("albums-list", &Value::Object(forward_map));
        let d = generate_key("albums-list", &Value::Object(backward_map));
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(&a, &c);
        prop_assert_eq!(&a, &d);

        let bag = |q: Vec<(String, String)>| {
            KeyParams::new(q.into_iter().collect(), path.iter().cloned().collect())
        };
        prop_assert_eq!(
            generate_key("album-detail", &bag(pairs.clone())),
            generate_key("album-detail", &bag(pairs.iter().rev().cloned().collect()))
        );
    }

    /// Different values or different prefixes never collide.
    #[test]
    fn prop_key_distinguishes_inputs(
        pairs in param_pairs_strategy(),
        name in "[a-zA-Z]{1,12}",
        v1 in "[a-z0-9]{1,8}",
        v2 in "[a-z0-9]{1,8}",
    ) {
        prop_assume!(v1 != v2);
        let mut first: BTreeMap<String, String> = pairs.into_iter().collect();
        let mut second = first.clone();
        first.insert(name.clone(), v1);
        second.insert(name, v2);

        prop_assert_ne!(generate_key("p", &first), generate_key("p", &second));
        prop_assert_ne!(generate_key("p", &first), generate_key("q", &first));
    }
}

// == Memory Store ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in valid_value_strategy()) {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);

        block_on(store.set(&key, value.clone(), TEST_DEFAULT_TTL)).unwrap();
        let retrieved = block_on(store.get(&key)).unwrap();

        prop_assert_eq!(retrieved, Some(value));
    }

    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);

        block_on(store.set(&key, value1, TEST_DEFAULT_TTL)).unwrap();
        block_on(store.set(&key, value2.clone(), TEST_DEFAULT_TTL)).unwrap();

        prop_assert_eq!(block_on(store.get(&key)).unwrap(), Some(value2));
        prop_assert_eq!(block_on(store.len()).unwrap(), 1);
    }

    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec(
            (valid_key_strategy(), valid_value_strategy()),
            1..200
        )
    ) {
        let max_entries = 50;
        let store = MemoryStore::new(max_entries);

        for (key, value) in entries {
            block_on(store.set(&key, value, TEST_DEFAULT_TTL)).unwrap();
            let len = block_on(store.len()).unwrap();
            prop_assert!(len <= max_entries, "cache size {} exceeds max {}", len, max_entries);
        }
    }

    /// Flushing once or many times leaves the same empty store.
    #[test]
    fn prop_flush_is_idempotent(
        entries in prop::collection::vec(
            (valid_key_strategy(), valid_value_strategy()),
            0..50
        ),
        flushes in 1usize..5,
    ) {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);
        for (key, value) in &entries {
            block_on(store.set(key, value.clone(), TEST_DEFAULT_TTL)).unwrap();
        }

        for _ in 0..flushes {
            block_on(store.flush_all()).unwrap();
            prop_assert_eq!(block_on(store.len()).unwrap(), 0);
        }
        for (key, _) in &entries {
            prop_assert_eq!(block_on(store.get(key)).unwrap(), None);
        }
    }

    /// Client counters match what a model of the store predicts.
    #[test]
    fn prop_client_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let client = CacheClient::new(Arc::new(MemoryStore::new(TEST_MAX_ENTRIES)), TEST_DEFAULT_TTL);
        let mut model: HashSet<String> = HashSet::new();
        let (mut hits, mut misses, mut sets, mut flushes) = (0u64, 0u64, 0u64, 0u64);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    prop_assert!(block_on(client.set(&key, value, None)));
                    model.insert(key);
                    sets += 1;
                }
                CacheOp::Get { key } => {
                    let found = block_on(client.get(&key)).is_some();
                    prop_assert_eq!(found, model.contains(&key));
                    if found { hits += 1 } else { misses += 1 }
                }
                CacheOp::Delete { key } => {
                    prop_assert!(block_on(client.delete(&key)));
                    model.remove(&key);
                }
                CacheOp::Flush => {
                    prop_assert!(block_on(client.flush_all()));
                    model.clear();
                    flushes += 1;
                }
            }
        }

        let stats = client.stats();
        prop_assert_eq!(stats.hits, hits);
        prop_assert_eq!(stats.misses, misses);
        prop_assert_eq!(stats.sets, sets);
        prop_assert_eq!(stats.flushes, flushes);
        prop_assert_eq!(stats.errors, 0);
        prop_assert_eq!(block_on(client.len()), Some(model.len()));
    }
}

// Fewer cases for the time-sensitive TTL property
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    #[test]
    fn prop_ttl_expiration_behavior(
        key in valid_key_strategy(),
        value in valid_value_strategy()
    ) {
        let store = MemoryStore::new(TEST_MAX_ENTRIES);

        block_on(store.set(&key, value.clone(), 1)).unwrap();
        prop_assert_eq!(block_on(store.get(&key)).unwrap(), Some(value));

        sleep(Duration::from_millis(1100));

        prop_assert_eq!(block_on(store.get(&key)).unwrap(), None);
    }
}

// == LRU Eviction ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_lru_eviction_order(
        initial_keys in prop::collection::vec(valid_key_strategy(), 3..10),
        new_key in valid_key_strategy(),
        new_value in valid_value_strategy()
    ) {
        let mut seen = HashSet::new();
        let unique_keys: Vec<String> = initial_keys
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect();

        prop_assume!(unique_keys.len() >= 2);
        prop_assume!(!unique_keys.contains(&new_key));

        let capacity = unique_keys.len();
        let store = MemoryStore::new(capacity);

        for key in &unique_keys {
            block_on(store.set(key, format!("value_{}", key), TEST_DEFAULT_TTL)).unwrap();
        }
        // Touch the first key so the second becomes least recently used
        let oldest_key = unique_keys[1].clone();
        prop_assert!(block_on(store.get(&unique_keys[0])).unwrap().is_some());

        block_on(store.set(&new_key, new_value, TEST_DEFAULT_TTL)).unwrap();

        prop_assert_eq!(block_on(store.len()).unwrap(), capacity);
        prop_assert_eq!(block_on(store.get(&oldest_key)).unwrap(), None);
        prop_assert!(block_on(store.get(&unique_keys[0])).unwrap().is_some());
        prop_assert!(block_on(store.get(&new_key)).unwrap().is_some());
        prop_assert_eq!(block_on(store.evictions()), 1);
    }
}
