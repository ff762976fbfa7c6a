//! # Internal Macros
//!
//! ## zerocopy_accessors!
//!
//! The index header keeps its fields as `U64`/`U32` little-endian wrappers so
//! it can be read in place from an unaligned mmap. Callers want plain `u64` and
//! `u32`, so this macro expands each `field: type` pair into a native-typed
//! getter and a `set_field` setter:
//!
//! ```ignore
//! impl IndexHeader {
//!     zerocopy_accessors! {
//!         key_num: u64,     // key_num() / set_key_num()
//!         block_size: u32,  // block_size() / set_block_size()
//!     }
//! }
//! ```
//!
//! Only the `u32` and `u64` wrappers are supported; the header has no other
//! field widths.

/// Generates getter and setter methods for zerocopy little-endian fields.
#[macro_export]
macro_rules! zerocopy_accessors {
    (@impl $field:ident, u32) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> u32 {
                self.$field.get()
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: u32) {
                self.$field = ::zerocopy::little_endian::U32::new(val);
            }
        }
    };
    (@impl $field:ident, u64) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> u64 {
                self.$field.get()
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: u64) {
                self.$field = ::zerocopy::little_endian::U64::new(val);
            }
        }
    };
    ($($field:ident : $ty:tt),* $(,)?) => {
        $(
            $crate::zerocopy_accessors!(@impl $field, $ty);
        )*
    };
}
