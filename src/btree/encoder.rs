//! # Binary Encoder
//!
//! Serializes a [`TreeImage`] into the wire format described in
//! [`storage`](crate::storage): header, then keys, then values, with no padding
//! and no length prefixes beyond the header.
//!
//! ## Output Sinks
//!
//! | Method          | Destination                              |
//! |-----------------|------------------------------------------|
//! | `encode`        | a fresh, exactly sized `Vec<u8>`         |
//! | `encode_into`   | appended to a caller-owned `Vec<u8>`     |
//! | `encode_in`     | a slice allocated from a `bumpalo::Bump` |
//!
//! All three write through [`TreeImage::write_to`], which fills a pre-sized
//! slice, so the bytes are identical regardless of where they land.

use bumpalo::Bump;
use zerocopy::IntoBytes;

use super::builder::TreeImage;
use crate::config::INDEX_HEADER_SIZE;
use crate::encoding::{IndexKey, IndexValue};
use crate::storage::IndexHeader;

impl<K: IndexKey, V: IndexValue> TreeImage<K, V> {
    /// Exact number of bytes `encode` produces.
    pub fn encoded_len(&self) -> usize {
        INDEX_HEADER_SIZE + self.keys.len() * K::WIDTH + self.values.len() * V::WIDTH
    }

    pub fn header(&self) -> IndexHeader {
        IndexHeader::new(self.keys.len() as u64, self.shape.block_size() as u32)
    }

    /// Serializes into a new buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.encoded_len()];
        self.write_to(&mut out);
        out
    }

    /// Appends the serialized index to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + self.encoded_len(), 0);
        self.write_to(&mut out[start..]);
    }

    /// Serializes into memory owned by `arena`.
    pub fn encode_in<'b>(&self, arena: &'b Bump) -> &'b [u8] {
        let out = arena.alloc_slice_fill_copy(self.encoded_len(), 0u8);
        self.write_to(out);
        out
    }

    /// Writes the index into the first `encoded_len()` bytes of `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `encoded_len()`.
    pub fn write_to(&self, out: &mut [u8]) {
        let total = self.encoded_len();
        assert!(
            out.len() >= total,
            "output buffer too small: {} < {}",
            out.len(),
            total
        );

        out[..INDEX_HEADER_SIZE].copy_from_slice(self.header().as_bytes());

        let mut pos = INDEX_HEADER_SIZE;
        for &key in &self.keys {
            key.write_le(&mut out[pos..]);
            pos += K::WIDTH;
        }
        for &value in &self.values {
            value.write_le(&mut out[pos..]);
            pos += V::WIDTH;
        }
        debug_assert_eq!(pos, total);

        tracing::trace!(
            keys = self.keys.len(),
            bytes = total,
            key_width = K::WIDTH,
            value_width = V::WIDTH,
            "encoded index"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree::IndexBuilder;

    #[test]
    fn empty_index_is_header_only() {
        let image = IndexBuilder::<u64, u64>::new().build().unwrap();
        let bytes = image.encode();

        assert_eq!(bytes.len(), INDEX_HEADER_SIZE);
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[..8], &[0u8; 8]);
        assert_eq!(&bytes[8..12], &16u32.to_le_bytes());
    }

    #[test]
    fn layout_is_header_keys_values() {
        let mut builder = IndexBuilder::<u16, u32>::new().block_size(2);
        builder.insert(0x0102, 0xAABBCCDD);

        let bytes = builder.build().unwrap().encode();
        assert_eq!(
            bytes,
            vec![
                1, 0, 0, 0, 0, 0, 0, 0, // key_num
                2, 0, 0, 0, // block_size
                0x02, 0x01, // key
                0xDD, 0xCC, 0xBB, 0xAA, // value
            ]
        );
    }

    #[test]
    fn encoded_len_matches_output() {
        let mut builder = IndexBuilder::<u32, f64>::new().block_size(4).dimension(3);
        for k in 0..19u32 {
            builder.insert(k, k as f64);
        }
        let image = builder.build().unwrap();

        assert_eq!(image.encoded_len(), 12 + 19 * 4 + 19 * 3 * 8);
        assert_eq!(image.encode().len(), image.encoded_len());
    }

    #[test]
    fn all_sinks_produce_identical_bytes() {
        let mut builder = IndexBuilder::<u64, u16>::new().block_size(8);
        for k in 0..37u64 {
            builder.insert(k * 3, k as u16);
        }
        let image = builder.build().unwrap();
        let owned = image.encode();

        let mut appended = vec![0xEE, 0xFF];
        image.encode_into(&mut appended);
        assert_eq!(&appended[..2], &[0xEE, 0xFF]);
        assert_eq!(&appended[2..], owned.as_slice());

        let arena = Bump::new();
        assert_eq!(image.encode_in(&arena), owned.as_slice());
    }

    #[test]
    #[should_panic(expected = "output buffer too small")]
    fn write_to_short_buffer_panics() {
        let mut builder = IndexBuilder::<u32, u32>::new();
        builder.insert(1, 1);
        let image = builder.build().unwrap();

        let mut out = vec![0u8; image.encoded_len() - 1];
        image.write_to(&mut out);
    }
}
