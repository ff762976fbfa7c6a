//! # Index Byte View
//!
//! [`IndexBytes`] splits an encoded buffer into its header, key array and value
//! array without copying. The split is validated once, when the view is
//! created; afterwards every accessor is a plain offset computation over the
//! borrowed slices.
//!
//! ## Length Contract
//!
//! ```text
//! required = INDEX_HEADER_SIZE
//!          + key_num * key_width
//!          + key_num * value_group_width
//! ```
//!
//! Buffers longer than `required` are accepted and the tail is ignored, so an
//! index can sit inside a larger page-aligned or pooled allocation. Shorter
//! buffers are rejected.

use eyre::{ensure, Result};

use super::headers::IndexHeader;
use crate::config::INDEX_HEADER_SIZE;

/// A validated, borrowed view over an encoded index.
#[derive(Debug, Clone, Copy)]
pub struct IndexBytes<'a> {
    header: &'a IndexHeader,
    keys: &'a [u8],
    values: &'a [u8],
    key_width: usize,
    value_group_width: usize,
}

impl<'a> IndexBytes<'a> {
    /// Splits `bytes` into header, keys and values.
    ///
    /// `value_group_width` is the byte size of all value slots of one key,
    /// i.e. `dimension * V::WIDTH`.
    pub fn parse(bytes: &'a [u8], key_width: usize, value_group_width: usize) -> Result<Self> {
        ensure!(key_width > 0, "key width must be non-zero");
        ensure!(value_group_width > 0, "value group width must be non-zero");

        let header = IndexHeader::from_bytes(bytes)?;
        let key_num = usize::try_from(header.key_num())
            .map_err(|_| eyre::eyre!("key_num {} exceeds address space", header.key_num()))?;

        let key_len = key_num
            .checked_mul(key_width)
            .ok_or_else(|| eyre::eyre!("key array size overflows for {} keys", key_num))?;
        let value_len = key_num
            .checked_mul(value_group_width)
            .ok_or_else(|| eyre::eyre!("value array size overflows for {} keys", key_num))?;
        let required = INDEX_HEADER_SIZE
            .checked_add(key_len)
            .and_then(|n| n.checked_add(value_len))
            .ok_or_else(|| eyre::eyre!("index size overflows for {} keys", key_num))?;

        ensure!(
            bytes.len() >= required,
            "index buffer truncated: {} bytes, expected {} for {} keys",
            bytes.len(),
            required,
            key_num
        );

        let keys_end = INDEX_HEADER_SIZE + key_len;
        Ok(Self {
            header,
            keys: &bytes[INDEX_HEADER_SIZE..keys_end],
            values: &bytes[keys_end..keys_end + value_len],
            key_width,
            value_group_width,
        })
    }

    #[inline]
    pub fn header(&self) -> &'a IndexHeader {
        self.header
    }

    #[inline]
    pub fn key_num(&self) -> usize {
        self.keys.len() / self.key_width
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.header.block_size() as usize
    }

    #[inline]
    pub fn key_bytes(&self) -> &'a [u8] {
        self.keys
    }

    #[inline]
    pub fn value_bytes(&self) -> &'a [u8] {
        self.values
    }

    /// Bytes of the key at flat position `index`.
    #[inline(always)]
    pub fn key(&self, index: usize) -> &'a [u8] {
        debug_assert!(index < self.key_num());
        let start = index * self.key_width;
        &self.keys[start..start + self.key_width]
    }

    /// Bytes of `count` consecutive keys starting at flat position `start`.
    #[inline(always)]
    pub fn key_run(&self, start: usize, count: usize) -> &'a [u8] {
        debug_assert!(start + count <= self.key_num());
        let from = start * self.key_width;
        &self.keys[from..from + count * self.key_width]
    }

    /// Bytes of every value slot belonging to the key at `index`.
    #[inline(always)]
    pub fn value_group(&self, index: usize) -> &'a [u8] {
        debug_assert!(index < self.key_num());
        let start = index * self.value_group_width;
        &self.values[start..start + self.value_group_width]
    }

    /// Number of bytes the index actually occupies.
    pub fn encoded_len(&self) -> usize {
        INDEX_HEADER_SIZE + self.keys.len() + self.values.len()
    }
}
