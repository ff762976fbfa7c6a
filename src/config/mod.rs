//! # sbtree Configuration Module
//!
//! This module centralizes all configuration constants for sbtree. The wire
//! format, tree shape limits and SIMD widths live together so that the builder,
//! encoder and searcher cannot drift apart.
//!
//! Per-index options (block size, dimension, fill value) are chosen on
//! [`IndexBuilder`](crate::btree::IndexBuilder); this module only holds the
//! defaults and bounds.
//!
//! ## Module Organization
//!
//! - [`constants`]: All numeric configuration values with dependency documentation

pub mod constants;
pub use constants::*;
