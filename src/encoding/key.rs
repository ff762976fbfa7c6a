//! # Fixed-Width Index Keys
//!
//! Keys are unsigned integers of 16, 32 or 64 bits stored little-endian in the
//! key array. The key width is never written to the buffer: producer and
//! consumer agree on it through the `K` type parameter of
//! [`IndexBuilder`](crate::btree::IndexBuilder) and
//! [`SearchIndex`](crate::btree::SearchIndex).
//!
//! ## Why unsigned only
//!
//! The AVX-512 lower-bound kernels use unsigned compares
//! (`_mm512_cmplt_epu*_mask`). Their lane order must match `Ord` on the Rust
//! type bit for bit, otherwise the scalar and SIMD paths disagree on blocks that
//! straddle the sign boundary.
//!
//! ## Hash Folding
//!
//! [`IndexKey::from_hash`] narrows a 64-bit hash to the key domain by XOR-folding
//! the upper halves into the lower bits, so a u16 key still depends on every
//! bit of the hash.

use std::fmt::Debug;
use std::hash::Hash;

use crate::btree::lower_bound::{SimdKernels, U16_KERNELS, U32_KERNELS, U64_KERNELS};

/// A fixed-width unsigned key type usable in the index.
pub trait IndexKey: Copy + Ord + Hash + Debug + Send + Sync + 'static {
    /// Width of one key in bytes.
    const WIDTH: usize;

    /// Human-readable name used in log events.
    const NAME: &'static str;

    /// AVX-512 lower-bound kernels for this width.
    const KERNELS: SimdKernels<Self>;

    /// Decodes a key from the first `WIDTH` bytes of `bytes`.
    fn read_le(bytes: &[u8]) -> Self;

    /// Writes the little-endian encoding of `self` into the first `WIDTH`
    /// bytes of `out`.
    fn write_le(self, out: &mut [u8]);

    /// Narrows a 64-bit hash into the key domain.
    fn from_hash(hash: u64) -> Self;
}

macro_rules! impl_index_key {
    ($ty:ty, $kernels:expr, $fold:expr) => {
        impl IndexKey for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            const NAME: &'static str = stringify!($ty);
            const KERNELS: SimdKernels<Self> = $kernels;

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

            #[inline]
            fn from_hash(hash: u64) -> Self {
                let fold: fn(u64) -> $ty = $fold;
                fold(hash)
            }
        }
    };
}

impl_index_key!(u16, U16_KERNELS, |h| {
    let h = h ^ (h >> 32);
    (h ^ (h >> 16)) as u16
});
impl_index_key!(u32, U32_KERNELS, |h| (h ^ (h >> 32)) as u32);
impl_index_key!(u64, U64_KERNELS, |h| h);
