//! # Fixed-Width Index Values
//!
//! Every key owns `dimension` value slots of `V::WIDTH` bytes each. Values are
//! stored little-endian and decoded on access, so the value array can live at
//! any alignment (an mmap region, a bump arena, a `Vec<u8>`).

use std::fmt::Debug;

/// A fixed-width value type storable in the value array.
pub trait IndexValue: Copy + PartialEq + Debug + Default + Send + Sync + 'static {
    /// Width of one value slot in bytes.
    const WIDTH: usize;

    /// Decodes a value from the first `WIDTH` bytes of `bytes`.
    fn read_le(bytes: &[u8]) -> Self;

    /// Writes the little-endian encoding of `self` into the first `WIDTH`
    /// bytes of `out`.
    fn write_le(self, out: &mut [u8]);
}

macro_rules! impl_index_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IndexValue for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                #[inline(always)]
                fn read_le(bytes: &[u8]) -> Self {
                    debug_assert!(bytes.len() >= Self::WIDTH);
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::WIDTH]);
                    <$ty>::from_le_bytes(raw)
                }

                #[inline]
                fn write_le(self, out: &mut [u8]) {
                    out[..Self::WIDTH].copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_index_value!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
