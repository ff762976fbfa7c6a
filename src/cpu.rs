//! # CPU Feature Detection
//!
//! The lower-bound kernels need AVX-512. This module probes the three relevant
//! extensions once per process and hands the result around as a plain
//! [`CpuFeatures`] value.
//!
//! | Extension  | Needed for                                  |
//! |------------|---------------------------------------------|
//! | AVX512F    | 512-bit compares of u32/u64 keys            |
//! | AVX512VL   | the same compares on 256-bit registers      |
//! | AVX512BW   | 16-bit lane compares (u16 keys)             |
//!
//! ## Restricting Features
//!
//! `CpuFeatures` cannot be constructed with a feature the CPU lacks. The only
//! constructors are [`CpuFeatures::detect`] and [`CpuFeatures::none`]; everything
//! else (`without_*`, [`intersect`](CpuFeatures::intersect)) clears flags. Tests
//! use this to force the scalar path on AVX-512 hardware and compare results.
//!
//! ## Thread Safety
//!
//! Detection runs inside a `OnceLock`. Concurrent first calls may both probe,
//! but they compute the same value and only one is stored.

use std::fmt;
use std::sync::OnceLock;

static DETECTED: OnceLock<CpuFeatures> = OnceLock::new();

/// AVX-512 capabilities of the executing CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CpuFeatures {
    avx512f: bool,
    avx512vl: bool,
    avx512bw: bool,
}

impl CpuFeatures {
    /// Returns the features of the current CPU, probing on first use.
    pub fn detect() -> Self {
        *DETECTED.get_or_init(|| {
            let features = Self::probe();
            tracing::debug!(
                avx512f = features.avx512f,
                avx512vl = features.avx512vl,
                avx512bw = features.avx512bw,
                "detected cpu features"
            );
            features
        })
    }

    /// A capability set with every extension disabled.
    pub const fn none() -> Self {
        Self {
            avx512f: false,
            avx512vl: false,
            avx512bw: false,
        }
    }

    #[cfg(target_arch = "x86_64")]
    fn probe() -> Self {
        Self {
            avx512f: is_x86_feature_detected!("avx512f"),
            avx512vl: is_x86_feature_detected!("avx512vl"),
            avx512bw: is_x86_feature_detected!("avx512bw"),
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn probe() -> Self {
        Self::none()
    }

    #[inline]
    pub fn avx512f(&self) -> bool {
        self.avx512f
    }

    #[inline]
    pub fn avx512vl(&self) -> bool {
        self.avx512vl
    }

    #[inline]
    pub fn avx512bw(&self) -> bool {
        self.avx512bw
    }

    pub fn without_avx512f(mut self) -> Self {
        self.avx512f = false;
        self
    }

    pub fn without_avx512vl(mut self) -> Self {
        self.avx512vl = false;
        self
    }

    pub fn without_avx512bw(mut self) -> Self {
        self.avx512bw = false;
        self
    }

    /// Keeps only the features present in both sets.
    pub fn intersect(self, other: Self) -> Self {
        Self {
            avx512f: self.avx512f && other.avx512f,
            avx512vl: self.avx512vl && other.avx512vl,
            avx512bw: self.avx512bw && other.avx512bw,
        }
    }

    /// True when no extension is available.
    pub fn is_scalar_only(&self) -> bool {
        !(self.avx512f || self.avx512vl || self.avx512bw)
    }
}

impl Default for CpuFeatures {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Display for CpuFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "avx512f:{},avx512vl:{},avx512bw:{}",
            self.avx512f, self.avx512vl, self.avx512bw
        )
    }
}
