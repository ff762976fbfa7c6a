//! # Encoding Module
//!
//! This module defines how keys and values are laid out in an index buffer:
//!
//! - **Key encoding**: fixed-width little-endian unsigned integers ([`IndexKey`])
//! - **Value encoding**: fixed-width little-endian scalars ([`IndexValue`])
//!
//! Widths are type parameters, never stored in the buffer.

pub mod key;
pub mod value;

pub use key::IndexKey;
pub use value::IndexValue;
