//! # Index Header Definition
//!
//! Every encoded index starts with a 12-byte header. It carries only what the
//! decoder cannot know from its type parameters: how many keys there are and
//! how many keys make up one node.
//!
//! ## Header Layout
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  ----------------------------------
//!   0      8    key_num     (u64, little-endian)
//!   8      4    block_size  (u32, little-endian)
//!  12      ..   key array   (key_num * K::WIDTH)
//!  ..      ..   value array (key_num * dimension * V::WIDTH)
//! ```
//!
//! Key width, value width and dimension are agreed out of band through the
//! `K`/`V` type parameters and the `dimension` argument on open. There is no
//! magic number and no version field: the buffer is an in-process artifact,
//! not a self-describing file format.
//!
//! ## Zerocopy Safety
//!
//! The header derives the zerocopy traits and uses `U32`/`U64` little-endian
//! wrappers, so it can be read straight out of an unaligned mmap region:
//! - `FromBytes`: Safe to read from arbitrary bytes
//! - `IntoBytes`: Safe to write as bytes
//! - `Immutable`: No interior mutability
//! - `KnownLayout`: Compile-time size verification
//! - `Unaligned`: Works with unaligned memory (mmap, bump arenas)

use eyre::{ensure, Result};
use zerocopy::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::{BLOCK_SIZE_OFFSET, INDEX_HEADER_SIZE, MAX_BLOCK_SIZE};

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct IndexHeader {
    key_num: U64,
    block_size: U32,
}

const _: () = assert!(std::mem::size_of::<IndexHeader>() == INDEX_HEADER_SIZE);
const _: () = assert!(std::mem::offset_of!(IndexHeader, block_size) == BLOCK_SIZE_OFFSET);

impl IndexHeader {
    pub fn new(key_num: u64, block_size: u32) -> Self {
        Self {
            key_num: U64::new(key_num),
            block_size: U32::new(block_size),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        ensure!(
            bytes.len() >= INDEX_HEADER_SIZE,
            "buffer too small for IndexHeader: {} < {}",
            bytes.len(),
            INDEX_HEADER_SIZE
        );

        let header = Self::ref_from_bytes(&bytes[..INDEX_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to parse IndexHeader: {:?}", e))?;

        ensure!(
            header.key_num() == 0 || header.block_size() > 0,
            "index header has {} keys but block_size 0",
            header.key_num()
        );
        ensure!(
            header.block_size() as usize <= MAX_BLOCK_SIZE,
            "index header block_size {} exceeds maximum {}",
            header.block_size(),
            MAX_BLOCK_SIZE
        );

        Ok(header)
    }

    zerocopy_accessors! {
        key_num: u64,
        block_size: u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_header_size_is_12() {
        assert_eq!(std::mem::size_of::<IndexHeader>(), 12);
    }

    #[test]
    fn header_roundtrip() {
        let mut header = IndexHeader::new(7, 3);
        header.set_key_num(88);
        header.set_block_size(16);

        let parsed = IndexHeader::from_bytes(header.as_bytes()).unwrap();
        assert_eq!(parsed.key_num(), 88);
        assert_eq!(parsed.block_size(), 16);
    }

    #[test]
    fn fields_sit_at_fixed_offsets() {
        let header = IndexHeader::new(0x0102_0304_0506_0708, 0x0A0B_0C0D);
        let bytes = header.as_bytes();

        assert_eq!(
            &bytes[..8],
            &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(&bytes[BLOCK_SIZE_OFFSET..], &[0x0D, 0x0C, 0x0B, 0x0A]);
    }

    #[test]
    fn from_bytes_reads_unaligned() {
        let header = IndexHeader::new(5, 4);
        let mut buf = vec![0xFFu8];
        buf.extend_from_slice(header.as_bytes());

        let parsed = IndexHeader::from_bytes(&buf[1..]).unwrap();
        assert_eq!(parsed.key_num(), 5);
        assert_eq!(parsed.block_size(), 4);
    }

    #[test]
    fn from_bytes_rejects_short_buffer() {
        let result = IndexHeader::from_bytes(&[0u8; 11]);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("buffer too small"));
    }

    #[test]
    fn from_bytes_rejects_zero_block_size_with_keys() {
        let header = IndexHeader::new(3, 0);
        assert!(IndexHeader::from_bytes(header.as_bytes()).is_err());
    }

    #[test]
    fn from_bytes_rejects_oversized_block_size() {
        let at_max = IndexHeader::new(10, MAX_BLOCK_SIZE as u32);
        assert!(IndexHeader::from_bytes(at_max.as_bytes()).is_ok());

        for block_size in [MAX_BLOCK_SIZE as u32 + 1, 1 << 30, u32::MAX] {
            let header = IndexHeader::new(10, block_size);
            let err = IndexHeader::from_bytes(header.as_bytes()).unwrap_err();
            assert!(err.to_string().contains("exceeds maximum"));
        }
    }

    #[test]
    fn empty_header_allows_zero_block_size() {
        let header = IndexHeader::new(0, 0);
        assert!(IndexHeader::from_bytes(header.as_bytes()).is_ok());
    }
}
