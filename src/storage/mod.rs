//! # Storage Module
//!
//! This module owns the byte-level side of an index: the fixed header, the
//! zero-copy view that splits a buffer into its segments, and file-backed
//! loading through `mmap`.
//!
//! ## Buffer Layout
//!
//! ```text
//! +--------------------+  offset 0
//! | IndexHeader (12B)  |  key_num: u64, block_size: u32
//! +--------------------+  offset 12
//! | Key array          |  key_num * K::WIDTH bytes, node-array order
//! +--------------------+
//! | Value array        |  key_num * dimension * V::WIDTH bytes
//! +--------------------+
//! ```
//!
//! ## Trust Boundary
//!
//! Lengths are checked exactly once, in [`IndexBytes::parse`]. After that the
//! search path only slices within the validated segments. A buffer that passes
//! validation but was encoded with a different key width than the reader
//! assumes is still well-defined (no out-of-bounds access); it simply returns
//! wrong or missing results.
//!
//! ## Module Overview
//!
//! - [`headers`]: zerocopy `IndexHeader`
//! - [`view`]: `IndexBytes`, the validated segment view
//! - [`mmap`]: `MappedIndex` and `write_index` for file persistence

pub mod headers;
pub mod mmap;
pub mod view;

pub use headers::IndexHeader;
pub use mmap::{write_index, MappedIndex};
pub use view::IndexBytes;
