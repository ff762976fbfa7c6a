//! Fuzz testing for index building and searching.
//!
//! Arbitrary entries are built into an index with an arbitrary block size and
//! every inserted key must be found with its value. Arbitrary raw bytes are
//! also opened directly, which must either fail cleanly or search without
//! panicking.

#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use sbtree::{CpuFeatures, IndexBuilder, SearchIndex};

#[derive(Debug, Arbitrary)]
struct SearchInput {
    block_size: u8,
    entries: Vec<(u32, u16)>,
    probes: Vec<u32>,
    raw: Vec<u8>,
}

fuzz_target!(|input: SearchInput| {
    let block_size = (input.block_size as usize % 64) + 1;

    let mut model = BTreeMap::new();
    let mut builder = IndexBuilder::<u32, u16>::new().block_size(block_size);
    for &(key, value) in input.entries.iter().take(4096) {
        if model.insert(key, value).is_none() {
            builder.insert(key, value);
        }
    }

    if let Ok(image) = builder.build() {
        let bytes = image.encode();
        let detected = SearchIndex::<u32, u16>::open(&bytes, 1).unwrap();
        let scalar = SearchIndex::<u32, u16>::open_with(&bytes, 1, CpuFeatures::none()).unwrap();

        for (&key, &value) in &model {
            assert_eq!(detected.get(key).and_then(|v| v.first()), Some(value));
        }
        for &probe in &input.probes {
            assert_eq!(detected.position(probe), scalar.position(probe));
            assert_eq!(detected.contains(probe), model.contains_key(&probe));
        }
    }

    if let Ok(index) = SearchIndex::<u16, u8>::open(&input.raw, 1) {
        for &probe in input.probes.iter().take(64) {
            let _ = index.get(probe as u16);
        }
    }
});
