//! # Block Lower-Bound Kernels
//!
//! Every full node of the index is a contiguous run of `block_size` sorted keys.
//! Descending one level means finding the first key in that run that is not
//! less than the needle. This module provides the scalar scan and the AVX-512
//! kernels that do it, plus the dispatch that picks one.
//!
//! ## Mask Popcount
//!
//! The SIMD kernels broadcast the needle, compare it against the whole block
//! with an unsigned less-than, and count the set bits of the resulting mask:
//!
//! ```text
//! block:   [ 3 | 5 | 9 | 12 | 17 | 20 | 31 | 40 ]
//! needle:    12
//! lt mask:   1   1   1   0    0    0    0    0    -> popcount = 3
//! ```
//!
//! Because the block is sorted, the number of keys below the needle is exactly
//! the lower-bound index. No branch depends on the data.
//!
//! ## Path Selection
//!
//! | Key width | block bits | Required features      | Kernel     |
//! |-----------|------------|------------------------|------------|
//! | 16-bit    | 512        | AVX512F + AVX512BW     | zmm        |
//! | 16-bit    | 256        | F + BW + VL            | ymm        |
//! | 32/64-bit | 512        | AVX512F                | zmm        |
//! | 32/64-bit | 256        | AVX512F + AVX512VL     | ymm        |
//! | any       | other      | none                   | scalar     |
//!
//! The choice is made once per opened index by [`select`] and stored as a
//! function pointer, so queries never re-branch on CPU features.

use std::fmt;

use crate::config::{VECTOR_BITS_256, VECTOR_BITS_512};
use crate::cpu::CpuFeatures;
use crate::encoding::IndexKey;

/// Lower bound over one full block.
///
/// `block` holds exactly `block_size * K::WIDTH` bytes of little-endian keys.
///
/// # Safety
///
/// SIMD kernels must only be called on a CPU that has the features they were
/// selected for. [`select`] guarantees this for the pointers it returns.
pub type LowerBoundFn<K> = unsafe fn(&[u8], K) -> usize;

/// The AVX-512 kernels available for one key width.
pub struct SimdKernels<K> {
    pub ymm: Option<LowerBoundFn<K>>,
    pub zmm: Option<LowerBoundFn<K>>,
}

impl<K> SimdKernels<K> {
    pub const NONE: Self = Self {
        ymm: None,
        zmm: None,
    };
}

/// Which lower-bound implementation an index searches with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchPath {
    Scalar,
    Avx512Ymm,
    Avx512Zmm,
}

impl SearchPath {
    pub fn name(&self) -> &'static str {
        match self {
            SearchPath::Scalar => "scalar",
            SearchPath::Avx512Ymm => "avx512-256",
            SearchPath::Avx512Zmm => "avx512-512",
        }
    }

    pub fn is_simd(&self) -> bool {
        !matches!(self, SearchPath::Scalar)
    }
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A selected kernel together with the path it implements.
pub struct LowerBound<K> {
    path: SearchPath,
    kernel: LowerBoundFn<K>,
}

impl<K: IndexKey> LowerBound<K> {
    pub fn path(&self) -> SearchPath {
        self.path
    }

    /// Runs the selected kernel over one full block.
    #[inline(always)]
    pub fn find(&self, block: &[u8], key: K) -> usize {
        // SAFETY: `select` only stores a SIMD kernel after checking the
        // features it was compiled for. The scalar kernel has no requirements.
        unsafe { (self.kernel)(block, key) }
    }
}

impl<K> Clone for LowerBound<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for LowerBound<K> {}

impl<K> fmt::Debug for LowerBound<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LowerBound").field("path", &self.path).finish()
    }
}

/// Width in bits of one block of `block_size` keys of type `K`.
#[inline]
pub fn block_bits<K: IndexKey>(block_size: usize) -> usize {
    block_size * K::WIDTH * 8
}

/// Picks the lower-bound kernel for `K` keys in blocks of `block_size`.
pub fn select<K: IndexKey>(block_size: usize, features: CpuFeatures) -> LowerBound<K> {
    let scalar = LowerBound {
        path: SearchPath::Scalar,
        kernel: lower_bound_scalar::<K> as LowerBoundFn<K>,
    };

    // 16-bit lanes are an AVX512BW extension on top of AVX512F
    let has_lane_support = features.avx512f() && (K::WIDTH > 2 || features.avx512bw());
    if !has_lane_support {
        return scalar;
    }

    let bits = block_bits::<K>(block_size);
    let kernels = K::KERNELS;

    if bits == VECTOR_BITS_512 {
        if let Some(kernel) = kernels.zmm {
            return LowerBound {
                path: SearchPath::Avx512Zmm,
                kernel,
            };
        }
    } else if bits == VECTOR_BITS_256 && features.avx512vl() {
        if let Some(kernel) = kernels.ymm {
            return LowerBound {
                path: SearchPath::Avx512Ymm,
                kernel,
            };
        }
    }

    scalar
}

/// Linear scan returning the first index whose key is `>= key`, or the block
/// length if none is.
#[inline]
pub fn lower_bound_scalar<K: IndexKey>(block: &[u8], key: K) -> usize {
    let count = block.len() / K::WIDTH;
    for i in 0..count {
        if K::read_le(&block[i * K::WIDTH..]) >= key {
            return i;
        }
    }
    count
}

/// Generates the zmm and ymm kernels for one key width.
///
/// `$lane` is the signed integer type the `set1` intrinsic takes; the compare
/// itself is unsigned, so the cast only reinterprets bits.
macro_rules! avx512_kernels {
    (
        $ty:ty, $lane:ty,
        zmm: $zmm:ident [$zfeat:tt] $zset:ident $zcmp:ident,
        ymm: $ymm:ident [$yfeat:tt] $yset:ident $ycmp:ident $(,)?
    ) => {
        #[cfg(target_arch = "x86_64")]
        #[target_feature(enable = $zfeat)]
        unsafe fn $zmm(block: &[u8], key: $ty) -> usize {
            use std::arch::x86_64::*;

            debug_assert!(block.len() * 8 >= VECTOR_BITS_512);
            let keys = _mm512_loadu_si512(block.as_ptr().cast());
            let needle = $zset(key as $lane);
            $zcmp(keys, needle).count_ones() as usize
        }

        #[cfg(target_arch = "x86_64")]
        #[target_feature(enable = $yfeat)]
        unsafe fn $ymm(block: &[u8], key: $ty) -> usize {
            use std::arch::x86_64::*;

            debug_assert!(block.len() * 8 >= VECTOR_BITS_256);
            let keys = _mm256_loadu_si256(block.as_ptr().cast());
            let needle = $yset(key as $lane);
            $ycmp(keys, needle).count_ones() as usize
        }
    };
}

avx512_kernels!(
    u16, i16,
    zmm: lower_bound_zmm_u16 ["avx512f,avx512bw"] _mm512_set1_epi16 _mm512_cmplt_epu16_mask,
    ymm: lower_bound_ymm_u16 ["avx512f,avx512bw,avx512vl"] _mm256_set1_epi16 _mm256_cmplt_epu16_mask,
);

avx512_kernels!(
    u32, i32,
    zmm: lower_bound_zmm_u32 ["avx512f"] _mm512_set1_epi32 _mm512_cmplt_epu32_mask,
    ymm: lower_bound_ymm_u32 ["avx512f,avx512vl"] _mm256_set1_epi32 _mm256_cmplt_epu32_mask,
);

avx512_kernels!(
    u64, i64,
    zmm: lower_bound_zmm_u64 ["avx512f"] _mm512_set1_epi64 _mm512_cmplt_epu64_mask,
    ymm: lower_bound_ymm_u64 ["avx512f,avx512vl"] _mm256_set1_epi64x _mm256_cmplt_epu64_mask,
);

#[cfg(target_arch = "x86_64")]
pub const U16_KERNELS: SimdKernels<u16> = SimdKernels {
    ymm: Some(lower_bound_ymm_u16 as LowerBoundFn<u16>),
    zmm: Some(lower_bound_zmm_u16 as LowerBoundFn<u16>),
};

#[cfg(target_arch = "x86_64")]
pub const U32_KERNELS: SimdKernels<u32> = SimdKernels {
    ymm: Some(lower_bound_ymm_u32 as LowerBoundFn<u32>),
    zmm: Some(lower_bound_zmm_u32 as LowerBoundFn<u32>),
};

#[cfg(target_arch = "x86_64")]
pub const U64_KERNELS: SimdKernels<u64> = SimdKernels {
    ymm: Some(lower_bound_ymm_u64 as LowerBoundFn<u64>),
    zmm: Some(lower_bound_zmm_u64 as LowerBoundFn<u64>),
};

#[cfg(not(target_arch = "x86_64"))]
pub const U16_KERNELS: SimdKernels<u16> = SimdKernels::NONE;

#[cfg(not(target_arch = "x86_64"))]
pub const U32_KERNELS: SimdKernels<u32> = SimdKernels::NONE;

#[cfg(not(target_arch = "x86_64"))]
pub const U64_KERNELS: SimdKernels<u64> = SimdKernels::NONE;

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<K: IndexKey>(keys: &[K]) -> Vec<u8> {
        let mut out = vec![0u8; keys.len() * K::WIDTH];
        for (i, &k) in keys.iter().enumerate() {
            k.write_le(&mut out[i * K::WIDTH..]);
        }
        out
    }

    #[test]
    fn scalar_lower_bound_semantics() {
        let block = encode(&[3u32, 5, 9, 12, 17, 20, 31, 40]);

        assert_eq!(lower_bound_scalar(&block, 0u32), 0);
        assert_eq!(lower_bound_scalar(&block, 3u32), 0);
        assert_eq!(lower_bound_scalar(&block, 4u32), 1);
        assert_eq!(lower_bound_scalar(&block, 12u32), 3);
        assert_eq!(lower_bound_scalar(&block, 40u32), 7);
        assert_eq!(lower_bound_scalar(&block, 41u32), 8);
    }

    #[test]
    fn scalar_handles_duplicates() {
        let block = encode(&[1u16, 2, 2, 2]);
        assert_eq!(lower_bound_scalar(&block, 2u16), 1);
        assert_eq!(lower_bound_scalar(&block, 3u16), 4);
    }

    #[test]
    fn no_features_selects_scalar() {
        let none = CpuFeatures::none();
        assert_eq!(select::<u16>(32, none).path(), SearchPath::Scalar);
        assert_eq!(select::<u32>(16, none).path(), SearchPath::Scalar);
        assert_eq!(select::<u64>(8, none).path(), SearchPath::Scalar);
    }

    #[test]
    fn odd_block_widths_select_scalar() {
        let detected = CpuFeatures::detect();
        assert_eq!(select::<u32>(3, detected).path(), SearchPath::Scalar);
        assert_eq!(select::<u64>(32, detected).path(), SearchPath::Scalar);
        assert_eq!(select::<u16>(4, detected).path(), SearchPath::Scalar);
    }

    #[test]
    fn selection_follows_detected_features() {
        let f = CpuFeatures::detect();

        let expect_zmm_u32 = f.avx512f() && cfg!(target_arch = "x86_64");
        assert_eq!(
            select::<u32>(16, f).path() == SearchPath::Avx512Zmm,
            expect_zmm_u32
        );

        let expect_ymm_u64 = f.avx512f() && f.avx512vl() && cfg!(target_arch = "x86_64");
        assert_eq!(
            select::<u64>(4, f).path() == SearchPath::Avx512Ymm,
            expect_ymm_u64
        );

        let expect_zmm_u16 = f.avx512f() && f.avx512bw() && cfg!(target_arch = "x86_64");
        assert_eq!(
            select::<u16>(32, f).path() == SearchPath::Avx512Zmm,
            expect_zmm_u16
        );
    }

    #[test]
    fn ymm_needs_vl() {
        let f = CpuFeatures::detect().without_avx512vl();
        assert_eq!(select::<u32>(8, f).path(), SearchPath::Scalar);
        assert_eq!(select::<u16>(16, f).path(), SearchPath::Scalar);
    }

    #[test]
    fn u16_needs_bw() {
        let f = CpuFeatures::detect().without_avx512bw();
        assert_eq!(select::<u16>(32, f).path(), SearchPath::Scalar);
    }

    fn check_against_scalar<K: IndexKey>(block_size: usize, keys: &[K], probes: &[K]) {
        let block = encode(&keys[..block_size]);
        let simd = select::<K>(block_size, CpuFeatures::detect());
        for &probe in probes {
            assert_eq!(
                simd.find(&block, probe),
                lower_bound_scalar(&block, probe),
                "path {} disagrees for {:?}",
                simd.path(),
                probe
            );
        }
    }

    #[test]
    fn simd_kernels_match_scalar_on_unsigned_extremes() {
        let u16_keys: Vec<u16> = (0..32).map(|i| (i as u16) * 2047 + 1).collect();
        let mut u16_probes = u16_keys.clone();
        u16_probes.extend([0, 1, 2, 0x7FFF, 0x8000, 0x8001, u16::MAX]);
        check_against_scalar(32, &u16_keys, &u16_probes);
        check_against_scalar(16, &u16_keys, &u16_probes);

        let u32_keys: Vec<u32> = (0..16).map(|i| (i as u32) * 0x1000_0000 + 7).collect();
        let mut u32_probes = u32_keys.clone();
        u32_probes.extend([0, 7, 8, 0x7FFF_FFFF, 0x8000_0000, u32::MAX]);
        check_against_scalar(16, &u32_keys, &u32_probes);
        check_against_scalar(8, &u32_keys, &u32_probes);

        let u64_keys: Vec<u64> = (0..8).map(|i| (i as u64) << 61 | 5).collect();
        let mut u64_probes = u64_keys.clone();
        u64_probes.extend([0, 5, 6, i64::MAX as u64, 1 << 63, u64::MAX]);
        check_against_scalar(8, &u64_keys, &u64_probes);
        check_against_scalar(4, &u64_keys, &u64_probes);
    }

    #[test]
    fn search_path_names() {
        assert_eq!(SearchPath::Scalar.to_string(), "scalar");
        assert_eq!(SearchPath::Avx512Ymm.name(), "avx512-256");
        assert!(SearchPath::Avx512Zmm.is_simd());
        assert!(!SearchPath::Scalar.is_simd());
    }
}
