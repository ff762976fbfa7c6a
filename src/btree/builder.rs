//! # Index Builder
//!
//! [`IndexBuilder`] collects `key -> [values]` pairs and arranges them into the
//! implicit tree layout, producing a [`TreeImage`] that the encoder serializes.
//!
//! ## Usage
//!
//! ```ignore
//! use sbtree::btree::IndexBuilder;
//!
//! let mut builder = IndexBuilder::<u64, u32>::new()
//!     .block_size(8)
//!     .dimension(2)
//!     .fill(u32::MAX);
//!
//! builder.insert(42, 7);
//! builder.insert(42, 9);        // second value for the same key
//! builder.insert_values(10, &[1, 2]);
//!
//! let bytes = builder.build()?.encode();
//! ```
//!
//! ## Multi-Value Keys
//!
//! Every key owns exactly `dimension` value slots. Inserting the same key again
//! appends to its list. Lists shorter than `dimension` are padded with the fill
//! value (default `V::default()`); lists longer than `dimension` fail the build.
//!
//! ## Ordering
//!
//! Entries are kept in a `BTreeMap`, so insertion order does not matter and
//! keys are unique. The builder is single-threaded and allocates; it is meant
//! to run once, offline from the query path.

use std::collections::BTreeMap;

use eyre::{bail, ensure, Result};
use smallvec::SmallVec;

use super::layout::TreeShape;
use crate::config::{DEFAULT_BLOCK_SIZE, DEFAULT_DIMENSION, MAX_BLOCK_SIZE};
use crate::encoding::{IndexKey, IndexValue};

/// Values per key stored inline before the list spills to the heap.
const INLINE_VALUES: usize = 4;

type ValueList<V> = SmallVec<[V; INLINE_VALUES]>;

/// Collects entries and lays them out as an implicit B-tree.
#[derive(Debug, Clone)]
pub struct IndexBuilder<K: IndexKey, V: IndexValue> {
    block_size: usize,
    dimension: usize,
    fill: V,
    entries: BTreeMap<K, ValueList<V>>,
}

impl<K: IndexKey, V: IndexValue> Default for IndexBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: IndexKey, V: IndexValue> IndexBuilder<K, V> {
    /// Creates a builder with `DEFAULT_BLOCK_SIZE` keys per node and
    /// `DEFAULT_DIMENSION` value slots per key.
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            dimension: DEFAULT_DIMENSION,
            fill: V::default(),
            entries: BTreeMap::new(),
        }
    }

    /// Sets the number of keys per node.
    ///
    /// The SIMD search paths need `block_size * K::WIDTH * 8` to be 256 or 512;
    /// any other value builds fine but is searched with the scalar scan.
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets the number of value slots stored per key.
    pub fn dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Sets the value used to pad keys that have fewer than `dimension` values.
    pub fn fill(mut self, fill: V) -> Self {
        self.fill = fill;
        self
    }

    /// Appends `value` to the value list of `key`.
    pub fn insert(&mut self, key: K, value: V) -> &mut Self {
        self.entries.entry(key).or_default().push(value);
        self
    }

    /// Appends every value in `values` to the value list of `key`.
    pub fn insert_values(&mut self, key: K, values: &[V]) -> &mut Self {
        self.entries
            .entry(key)
            .or_default()
            .extend_from_slice(values);
        self
    }

    /// Number of distinct keys collected so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lays the collected entries out in tree order.
    pub fn build(&self) -> Result<TreeImage<K, V>> {
        ensure!(
            self.block_size > 0 && self.block_size <= MAX_BLOCK_SIZE,
            "block_size must be within 1..={}, got {}",
            MAX_BLOCK_SIZE,
            self.block_size
        );
        ensure!(self.dimension > 0, "dimension must be at least 1");

        let sorted: Vec<(&K, &ValueList<V>)> = self.entries.iter().collect();
        for (key, values) in &sorted {
            if values.is_empty() {
                bail!("key {:?} has no values", key);
            }
            if values.len() > self.dimension {
                bail!(
                    "key {:?} has {} values but dimension is {}",
                    key,
                    values.len(),
                    self.dimension
                );
            }
        }

        let shape = TreeShape::new(sorted.len(), self.block_size);
        let ranks = shape.slot_ranks();

        let mut keys = Vec::with_capacity(shape.key_num());
        let mut values = Vec::with_capacity(shape.key_num() * self.dimension);
        for &rank in &ranks {
            let (key, list) = sorted[rank];
            keys.push(*key);
            values.extend_from_slice(list);
            values.extend(std::iter::repeat_n(self.fill, self.dimension - list.len()));
        }

        tracing::debug!(
            key_type = K::NAME,
            keys = shape.key_num(),
            block_size = shape.block_size(),
            blocks = shape.block_count(),
            depth = shape.depth(),
            dimension = self.dimension,
            "built index layout"
        );

        Ok(TreeImage {
            shape,
            dimension: self.dimension,
            keys,
            values,
        })
    }
}

impl<K: IndexKey, V: IndexValue> Extend<(K, V)> for IndexBuilder<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: IndexKey, V: IndexValue> FromIterator<(K, V)> for IndexBuilder<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut builder = Self::new();
        builder.extend(iter);
        builder
    }
}

/// Keys and values arranged in node-array order, ready to encode.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeImage<K: IndexKey, V: IndexValue> {
    pub(crate) shape: TreeShape,
    pub(crate) dimension: usize,
    pub(crate) keys: Vec<K>,
    pub(crate) values: Vec<V>,
}

impl<K: IndexKey, V: IndexValue> TreeImage<K, V> {
    #[inline]
    pub fn shape(&self) -> TreeShape {
        self.shape
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.shape.block_size()
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Keys in flat node-array order.
    #[inline]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Values in flat node-array order, `dimension` per key.
    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Keys of `node` (1-based id).
    pub fn node_keys(&self, node: usize) -> &[K] {
        let offset = self.shape.node_offset(node);
        &self.keys[offset..offset + self.shape.node_len(node)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential(n: u32, block_size: usize) -> TreeImage<u32, u32> {
        let mut builder = IndexBuilder::new().block_size(block_size);
        for k in 1..=n {
            builder.insert(k, k);
        }
        builder.build().unwrap()
    }

    #[test]
    fn build_empty() {
        let image = IndexBuilder::<u32, u32>::new().build().unwrap();
        assert!(image.is_empty());
        assert_eq!(image.shape().block_count(), 0);
        assert!(image.values().is_empty());
    }

    #[test]
    fn build_seven_keys_block_three() {
        let image = sequential(7, 3);
        assert_eq!(image.keys(), &[4, 6, 7, 1, 2, 3, 5]);
        assert_eq!(image.values(), image.keys());
        assert_eq!(image.node_keys(1), &[4, 6, 7]);
        assert_eq!(image.node_keys(3), &[5]);
    }

    #[test]
    fn every_node_is_sorted() {
        for block_size in [2, 3, 4, 8, 16, 32] {
            for n in [1, 7, 22, 50, 88, 513] {
                let image = sequential(n, block_size);
                for node in 1..=image.shape().block_count() {
                    let keys = image.node_keys(node);
                    assert!(keys.windows(2).all(|w| w[0] <= w[1]));
                }
            }
        }
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let forward: IndexBuilder<u16, u8> = (0..40u16).map(|k| (k, k as u8)).collect();
        let backward: IndexBuilder<u16, u8> = (0..40u16).rev().map(|k| (k, k as u8)).collect();

        assert_eq!(forward.build().unwrap(), backward.build().unwrap());
    }

    #[test]
    fn repeated_key_appends_and_pads() {
        let mut builder = IndexBuilder::<u64, i32>::new().dimension(3).fill(-1);
        builder.insert(9, 10).insert(9, 20);
        builder.insert_values(3, &[1, 2, 3]);

        let image = builder.build().unwrap();
        assert_eq!(image.len(), 2);
        assert_eq!(image.keys(), &[3, 9]);
        assert_eq!(image.values(), &[1, 2, 3, 10, 20, -1]);
    }

    #[test]
    fn too_many_values_fails() {
        let mut builder = IndexBuilder::<u32, u32>::new().dimension(1);
        builder.insert(1, 1).insert(1, 2);

        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("dimension is 1"));
    }

    #[test]
    fn empty_value_list_fails() {
        let mut builder = IndexBuilder::<u32, u32>::new();
        builder.insert_values(5, &[]);
        assert!(builder.build().is_err());
    }

    #[test]
    fn invalid_options_fail() {
        let mut zero_block = IndexBuilder::<u32, u32>::new().block_size(0);
        zero_block.insert(1, 1);
        assert!(zero_block.build().is_err());

        let huge_block = IndexBuilder::<u32, u32>::new().block_size(MAX_BLOCK_SIZE + 1);
        assert!(huge_block.build().is_err());

        let zero_dim = IndexBuilder::<u32, u32>::new().dimension(0);
        assert!(zero_dim.build().is_err());
    }

    #[test]
    fn len_counts_distinct_keys() {
        let mut builder = IndexBuilder::<u32, u32>::new().dimension(2);
        assert!(builder.is_empty());
        builder.insert(1, 1).insert(1, 2).insert(2, 3);
        assert_eq!(builder.len(), 2);
    }
}
