//! # Static B-Tree Index
//!
//! This module implements an immutable, pointer-free B-tree whose nodes are
//! searched with AVX-512 mask compares. An index is built once from a set of
//! `key -> [value; dimension]` entries, serialized into one contiguous buffer,
//! and then queried in place.
//!
//! ## Pipeline
//!
//! ```text
//! IndexBuilder<K, V>   collect entries, validate options
//!        │ build()
//!        ▼
//! TreeImage<K, V>      keys/values in node-array order
//!        │ encode() / encode_into() / encode_in(&Bump)
//!        ▼
//! [u8]                 header | keys | values
//!        │ SearchIndex::open()
//!        ▼
//! SearchIndex<'_, K, V>  zero-copy lookups
//! ```
//!
//! ## Module Overview
//!
//! - [`layout`]: implicit tree addressing and the two placement passes
//! - [`lower_bound`]: scalar and AVX-512 block lower-bound kernels
//! - `builder`: [`IndexBuilder`] and [`TreeImage`]
//! - `encoder`: serialization of a [`TreeImage`]
//! - `search`: [`SearchIndex`] and [`ValueSlice`]
//!
//! ## Example
//!
//! ```ignore
//! use sbtree::btree::{IndexBuilder, SearchIndex};
//!
//! let mut builder = IndexBuilder::<u32, u64>::new().block_size(16);
//! builder.insert(7, 700).insert(3, 300);
//! let bytes = builder.build()?.encode();
//!
//! let index = SearchIndex::<u32, u64>::open(&bytes, 1)?;
//! assert_eq!(index.get(7).and_then(|v| v.first()), Some(700));
//! ```

mod builder;
mod encoder;
pub mod layout;
pub mod lower_bound;
mod search;

pub use builder::{IndexBuilder, TreeImage};
pub use layout::{InOrderSlots, TreeShape};
pub use lower_bound::{
    lower_bound_scalar, select, LowerBound, LowerBoundFn, SearchPath, SimdKernels,
};
pub use search::{Keys, SearchIndex, SortedEntries, ValueIter, ValueSlice};
