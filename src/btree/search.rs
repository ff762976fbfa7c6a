//! # Index Search
//!
//! [`SearchIndex`] answers point lookups against an encoded buffer without
//! copying or allocating. It borrows the buffer, so it works the same over a
//! `Vec<u8>`, a bump arena or a memory-mapped file.
//!
//! ## Descent
//!
//! ```text
//! node = 1
//! loop:
//!   node >  block_count  -> not found
//!   node == block_count  -> bounded scalar scan of the last block
//!   otherwise:
//!     idx = lower_bound(block(node), key)      (scalar or AVX-512)
//!     block[idx] == key  -> found at (node - 1) * block_size + idx
//!     node = node * (block_size + 1) + 1 - (block_size - idx)
//! ```
//!
//! The last block may hold fewer than `block_size` keys, and the bytes after it
//! belong to the value array. Loading it as a full vector would compare value
//! bytes as keys, so it is always scanned one key at a time up to `key_num`.
//!
//! ## Performance Characteristics
//!
//! - One lower-bound per level; depth is `O(log_{B+1} n)`
//! - Kernel selection happens once, in `open`
//! - No allocation, locking or logging on the lookup path
//!
//! ## Thread Safety
//!
//! `SearchIndex` only holds shared borrows and a function pointer, so it is
//! `Send + Sync` and can be shared freely across threads.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use eyre::{ensure, Result};

use super::layout::{InOrderSlots, TreeShape};
use super::lower_bound::{self, LowerBound, SearchPath};
use crate::cpu::CpuFeatures;
use crate::encoding::{IndexKey, IndexValue};
use crate::storage::IndexBytes;

/// A read-only searcher over an encoded index.
pub struct SearchIndex<'a, K: IndexKey, V: IndexValue> {
    bytes: IndexBytes<'a>,
    shape: TreeShape,
    dimension: usize,
    lower_bound: LowerBound<K>,
    _values: PhantomData<V>,
}

impl<'a, K: IndexKey, V: IndexValue> SearchIndex<'a, K, V> {
    /// Opens `bytes` with the CPU features detected on this machine.
    ///
    /// `dimension` must match the value used when building.
    pub fn open(bytes: &'a [u8], dimension: usize) -> Result<Self> {
        Self::open_with(bytes, dimension, CpuFeatures::detect())
    }

    /// Opens `bytes`, selecting the lower-bound kernel from `features`.
    pub fn open_with(bytes: &'a [u8], dimension: usize, features: CpuFeatures) -> Result<Self> {
        ensure!(dimension > 0, "dimension must be at least 1");

        let value_group_width = dimension
            .checked_mul(V::WIDTH)
            .ok_or_else(|| eyre::eyre!("dimension {} overflows value width", dimension))?;
        let bytes = IndexBytes::parse(bytes, K::WIDTH, value_group_width)?;
        let shape = TreeShape::new(bytes.key_num(), bytes.block_size());
        let lower_bound = lower_bound::select::<K>(shape.block_size(), features);

        tracing::debug!(
            key_type = K::NAME,
            keys = shape.key_num(),
            block_size = shape.block_size(),
            dimension,
            path = %lower_bound.path(),
            "opened index"
        );

        Ok(Self {
            bytes,
            shape,
            dimension,
            lower_bound,
            _values: PhantomData,
        })
    }

    /// Number of keys in the index.
    #[inline]
    pub fn len(&self) -> usize {
        self.shape.key_num()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.shape.block_size()
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.shape.block_count()
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn shape(&self) -> TreeShape {
        self.shape
    }

    /// The lower-bound implementation chosen at open time.
    #[inline]
    pub fn path(&self) -> SearchPath {
        self.lower_bound.path()
    }

    /// Bytes of the encoded index (header, keys and values).
    #[inline]
    pub fn encoded_len(&self) -> usize {
        self.bytes.encoded_len()
    }

    /// Key at flat position `index`.
    #[inline(always)]
    pub fn key_at(&self, index: usize) -> K {
        K::read_le(self.bytes.key(index))
    }

    /// Values of the key at flat position `index`.
    #[inline]
    pub fn values_at(&self, index: usize) -> ValueSlice<'a, V> {
        ValueSlice::new(self.bytes.value_group(index))
    }

    /// Flat position of `key`, if present.
    #[inline]
    pub fn position(&self, key: K) -> Option<usize> {
        let block_size = self.shape.block_size();
        let block_count = self.shape.block_count();
        let mut node = 1usize;

        while node <= block_count {
            let offset = self.shape.node_offset(node);

            if node == block_count {
                return self.scan_last_block(offset, key);
            }

            let block = self.bytes.key_run(offset, block_size);
            let idx = self.lower_bound.find(block, key);
            if idx < block_size && self.key_at(offset + idx) == key {
                return Some(offset + idx);
            }
            node = self.shape.child(node, idx);
        }

        None
    }

    fn scan_last_block(&self, offset: usize, key: K) -> Option<usize> {
        let end = (offset + self.shape.block_size()).min(self.shape.key_num());
        for index in offset..end {
            let candidate = self.key_at(index);
            if candidate >= key {
                return (candidate == key).then_some(index);
            }
        }
        None
    }

    /// Values stored for `key`, or `None` if the key is absent.
    #[inline]
    pub fn get(&self, key: K) -> Option<ValueSlice<'a, V>> {
        self.position(key).map(|index| self.values_at(index))
    }

    #[inline]
    pub fn contains(&self, key: K) -> bool {
        self.position(key).is_some()
    }

    /// All keys in flat node-array order.
    pub fn keys(&self) -> Keys<'a, K> {
        Keys {
            bytes: self.bytes,
            range: 0..self.len(),
            _marker: PhantomData,
        }
    }

    /// `(key, values)` pairs in ascending key order.
    pub fn iter_sorted(&self) -> SortedEntries<'_, 'a, K, V> {
        SortedEntries {
            index: self,
            slots: self.shape.in_order(),
            remaining: self.len(),
        }
    }
}

impl<K: IndexKey, V: IndexValue> fmt::Debug for SearchIndex<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchIndex")
            .field("key_type", &K::NAME)
            .field("keys", &self.len())
            .field("block_size", &self.block_size())
            .field("dimension", &self.dimension)
            .field("path", &format_args!("{}", self.path()))
            .finish()
    }
}

/// Iterator over keys in flat node-array order.
pub struct Keys<'a, K: IndexKey> {
    bytes: IndexBytes<'a>,
    range: std::ops::Range<usize>,
    _marker: PhantomData<K>,
}

impl<K: IndexKey> Iterator for Keys<'_, K> {
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<K> {
        self.range.next().map(|index| K::read_le(self.bytes.key(index)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<K: IndexKey> ExactSizeIterator for Keys<'_, K> {}

/// Iterator over index entries in ascending key order.
pub struct SortedEntries<'s, 'a, K: IndexKey, V: IndexValue> {
    index: &'s SearchIndex<'a, K, V>,
    slots: InOrderSlots,
    remaining: usize,
}

impl<'a, K: IndexKey, V: IndexValue> Iterator for SortedEntries<'_, 'a, K, V> {
    type Item = (K, ValueSlice<'a, V>);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.next()?;
        self.remaining -= 1;
        Some((self.index.key_at(slot), self.index.values_at(slot)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: IndexKey, V: IndexValue> ExactSizeIterator for SortedEntries<'_, '_, K, V> {}

impl<K: IndexKey, V: IndexValue> FusedIterator for SortedEntries<'_, '_, K, V> {}

/// Zero-copy view over the `dimension` values stored for one key.
#[derive(Clone, Copy)]
pub struct ValueSlice<'a, V: IndexValue> {
    bytes: &'a [u8],
    _marker: PhantomData<V>,
}

impl<'a, V: IndexValue> ValueSlice<'a, V> {
    #[inline]
    fn new(bytes: &'a [u8]) -> Self {
        debug_assert_eq!(bytes.len() % V::WIDTH, 0);
        Self {
            bytes,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / V::WIDTH
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<V> {
        if index >= self.len() {
            return None;
        }
        Some(V::read_le(&self.bytes[index * V::WIDTH..]))
    }

    #[inline]
    pub fn first(&self) -> Option<V> {
        self.get(0)
    }

    /// Raw little-endian bytes of the values.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn iter(&self) -> ValueIter<'a, V> {
        ValueIter {
            chunks: self.bytes.chunks_exact(V::WIDTH),
            _marker: PhantomData,
        }
    }

    pub fn to_vec(&self) -> Vec<V> {
        self.iter().collect()
    }
}

impl<V: IndexValue> fmt::Debug for ValueSlice<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<V: IndexValue> PartialEq<[V]> for ValueSlice<'_, V> {
    fn eq(&self, other: &[V]) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a == *b)
    }
}

impl<'a, V: IndexValue> IntoIterator for ValueSlice<'a, V> {
    type Item = V;
    type IntoIter = ValueIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator decoding the values of a [`ValueSlice`].
#[derive(Clone)]
pub struct ValueIter<'a, V: IndexValue> {
    chunks: std::slice::ChunksExact<'a, u8>,
    _marker: PhantomData<V>,
}

impl<V: IndexValue> Iterator for ValueIter<'_, V> {
    type Item = V;

    #[inline]
    fn next(&mut self) -> Option<V> {
        self.chunks.next().map(V::read_le)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<V: IndexValue> ExactSizeIterator for ValueIter<'_, V> {}
