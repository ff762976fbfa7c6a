//! # sbtree - Static SIMD B-Tree Index
//!
//! sbtree is an immutable lookup index that maps fixed-width unsigned integer
//! keys to fixed-width value arrays. It is built once, serialized into a single
//! contiguous buffer, and queried in place. This implementation prioritizes:
//!
//! - **Zero-copy access**: lookups read directly from the encoded bytes, whether
//!   they live in a `Vec`, a bump arena or a memory-mapped file
//! - **Zero allocation during search**: no heap, no locks, no logging on the
//!   lookup path
//! - **Vectorized node search**: one AVX-512 compare-and-popcount per tree level
//!
//! ## Quick Start
//!
//! ```ignore
//! use sbtree::{IndexBuilder, SearchIndex};
//!
//! let mut builder = IndexBuilder::<u64, u32>::new().block_size(8);
//! for id in 0..1000u64 {
//!     builder.insert(id * 7, id as u32);
//! }
//! let bytes = builder.build()?.encode();
//!
//! let index = SearchIndex::<u64, u32>::open(&bytes, 1)?;
//! assert_eq!(index.get(70).and_then(|v| v.first()), Some(10));
//! assert!(index.get(71).is_none());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  IndexBuilder -> TreeImage -> bytes  │  btree::{builder, encoder}
//! ├─────────────────────────────────────┤
//! │  SearchIndex (descent + last scan)   │  btree::search
//! ├──────────────────┬──────────────────┤
//! │  Implicit layout │ Lower-bound      │  btree::{layout, lower_bound}
//! │                  │ kernels + cpu    │
//! ├──────────────────┴──────────────────┤
//! │  Header, byte view, mmap files       │  storage
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Key and Value Types
//!
//! | Keys            | Values                                  |
//! |-----------------|-----------------------------------------|
//! | u16, u32, u64   | u8..u64, i8..i64, f32, f64              |
//!
//! Widths are carried by type parameters and are not recorded in the buffer;
//! the reader must use the same `K`, `V` and `dimension` as the writer.
//!
//! ## Module Overview
//!
//! - [`btree`]: builder, encoder, layout, kernels and searcher
//! - [`cpu`]: AVX-512 capability detection
//! - [`encoding`]: `IndexKey` / `IndexValue` traits
//! - [`hash`]: xxHash adapters into the key domain
//! - [`storage`]: header, byte view, memory-mapped files
//! - [`config`]: constants and limits

#[macro_use]
mod macros;

pub mod btree;
pub mod config;
pub mod cpu;
pub mod encoding;
pub mod hash;
pub mod storage;

pub use btree::{IndexBuilder, SearchIndex, SearchPath, TreeImage, ValueSlice};
pub use cpu::CpuFeatures;
pub use encoding::{IndexKey, IndexValue};
pub use storage::{write_index, MappedIndex};
