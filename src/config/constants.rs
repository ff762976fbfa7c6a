//! # sbtree Configuration Constants
//!
//! This module centralizes the numeric constants that the builder, encoder and
//! searcher must agree on. Constants that depend on each other are co-located
//! and their relationships are enforced by compile-time assertions.
//!
//! ## Dependency Graph
//!
//! ```text
//! KEY_NUM_FIELD_SIZE (8 bytes) + BLOCK_SIZE_FIELD_SIZE (4 bytes)
//!       │
//!       └─> INDEX_HEADER_SIZE (12 bytes, derived)
//!             Key array starts at this offset. An empty index is exactly
//!             this many bytes long.
//!
//! VECTOR_BITS_256 / VECTOR_BITS_512
//!       │
//!       └─> block_size * key_width * 8 must equal one of these for a SIMD
//!           lower-bound path to be selected. Every other block size uses the
//!           scalar scan.
//!
//! MAX_BLOCK_SIZE (64)
//!       │
//!       └─> Upper bound accepted by the builder. Large enough for a 512-bit
//!           block of u16 keys (32) with headroom for scalar-only layouts.
//! ```
//!
//! ## Critical Invariants
//!
//! 1. `INDEX_HEADER_SIZE == KEY_NUM_FIELD_SIZE + BLOCK_SIZE_FIELD_SIZE`
//! 2. `DEFAULT_BLOCK_SIZE <= MAX_BLOCK_SIZE`
//! 3. `MAX_BLOCK_SIZE` keys of the widest key type fit in a 512-bit lane group
//!    at least once (otherwise no SIMD path could ever be reached for u64).

// ============================================================================
// WIRE FORMAT
// Fixed contract between encoder and decoder
// ============================================================================

/// Width of the `key_num` header field (little-endian u64).
pub const KEY_NUM_FIELD_SIZE: usize = 8;

/// Width of the `block_size` header field (little-endian u32).
pub const BLOCK_SIZE_FIELD_SIZE: usize = 4;

/// Total header size. The key array begins at this offset.
pub const INDEX_HEADER_SIZE: usize = KEY_NUM_FIELD_SIZE + BLOCK_SIZE_FIELD_SIZE;

/// Offset of `block_size` within the header.
pub const BLOCK_SIZE_OFFSET: usize = KEY_NUM_FIELD_SIZE;

const _: () = assert!(
    INDEX_HEADER_SIZE == 12,
    "INDEX_HEADER_SIZE is part of the wire format and must stay 12 bytes"
);

// ============================================================================
// TREE SHAPE
// ============================================================================

/// Block size used when the builder is not configured explicitly.
/// 16 keys fill one 512-bit register for u32 keys.
pub const DEFAULT_BLOCK_SIZE: usize = 16;

/// Largest block size the builder accepts.
pub const MAX_BLOCK_SIZE: usize = 64;

/// Value slots per key when the builder is not configured explicitly.
pub const DEFAULT_DIMENSION: usize = 1;

const _: () = assert!(
    DEFAULT_BLOCK_SIZE > 0 && DEFAULT_BLOCK_SIZE <= MAX_BLOCK_SIZE,
    "DEFAULT_BLOCK_SIZE must be within 1..=MAX_BLOCK_SIZE"
);

// ============================================================================
// SIMD WIDTHS
// ============================================================================

/// Bit width of a ymm register (AVX512VL lower-bound path).
pub const VECTOR_BITS_256: usize = 256;

/// Bit width of a zmm register (AVX512F/BW lower-bound path).
pub const VECTOR_BITS_512: usize = 512;

const _: () = assert!(
    MAX_BLOCK_SIZE * 8 * 8 >= VECTOR_BITS_512,
    "MAX_BLOCK_SIZE must admit at least one 512-bit block of u64 keys"
);
