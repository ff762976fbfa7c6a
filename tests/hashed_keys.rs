//! # Hashed Key Tests
//!
//! Identifiers are hashed into the key domain with xxHash before indexing.
//! These tests cover the collision-free 64-bit case and the forced-collision
//! case where many identifiers share a narrow u16 key and must all remain
//! retrievable from that key's value slots.

use std::collections::HashMap;

use sbtree::hash::{hash_key, hash_str};
use sbtree::{IndexBuilder, IndexKey, SearchIndex};

const INPUTS: u32 = 5000;

#[test]
fn every_decimal_string_found_by_its_hash() {
    for block_size in [4, 8] {
        let mut builder = IndexBuilder::<u64, u32>::new().block_size(block_size);
        for i in 0..INPUTS {
            builder.insert(hash_str(&i.to_string()), i);
        }
        let bytes = builder.build().unwrap().encode();
        let index = SearchIndex::<u64, u32>::open(&bytes, 1).unwrap();

        assert_eq!(index.len(), INPUTS as usize);
        for i in 0..INPUTS {
            let key = hash_str(&i.to_string());
            assert_eq!(index.get(key).and_then(|v| v.first()), Some(i), "input {i}");
        }
        for i in INPUTS..INPUTS + 200 {
            assert!(index.get(hash_str(&i.to_string())).is_none());
        }
    }
}

#[test]
fn forced_collisions_keep_every_value() {
    // 5000 inputs over 2^8 buckets guarantees heavy collisions
    let narrow = |s: &str| hash_key::<u16>(s.as_bytes()) & 0x00FF;

    let mut buckets: HashMap<u16, Vec<u32>> = HashMap::new();
    for i in 0..INPUTS {
        buckets.entry(narrow(&i.to_string())).or_default().push(i);
    }
    let dimension = buckets.values().map(Vec::len).max().unwrap();
    assert!(dimension > 1);

    let mut builder = IndexBuilder::<u16, u32>::new()
        .block_size(16)
        .dimension(dimension)
        .fill(u32::MAX);
    for (key, values) in &buckets {
        builder.insert_values(*key, values);
    }
    let bytes = builder.build().unwrap().encode();
    let index = SearchIndex::<u16, u32>::open(&bytes, dimension).unwrap();

    assert_eq!(index.len(), buckets.len());
    for i in 0..INPUTS {
        let values = index.get(narrow(&i.to_string())).unwrap();
        assert_eq!(values.len(), dimension);
        assert!(values.iter().any(|v| v == i), "input {i} lost in its bucket");
    }

    for (key, values) in &buckets {
        let stored = index.get(*key).unwrap();
        let live: Vec<u32> = stored.iter().filter(|&v| v != u32::MAX).collect();
        assert_eq!(&live, values);
    }
}

#[test]
fn narrowing_is_stable_across_widths() {
    let full = hash_str("stable");
    assert_eq!(hash_key::<u64>(b"stable"), full);
    assert_eq!(hash_key::<u32>(b"stable"), <u32 as IndexKey>::from_hash(full));
}
