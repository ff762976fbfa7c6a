//! # Key Hashing
//!
//! Helpers that map arbitrary identifiers (strings, byte strings) into the
//! fixed-width key domain of an index. The index itself only stores integers;
//! callers that key by name hash first and look up by the resulting integer.
//!
//! ## Algorithms
//!
//! | Function         | Algorithm            |
//! |------------------|----------------------|
//! | `hash_bytes`     | XXH64, seed 0        |
//! | `hash_with_seed` | XXH64, caller seed   |
//! | `hash_fast`      | XXH3 64-bit          |
//!
//! [`hash_key`] narrows a 64-bit hash into `K` with [`IndexKey::from_hash`].
//!
//! ## Collisions
//!
//! Narrow key types (u16 in particular) collide often. An index can only hold
//! one entry per key, so colliding identifiers must share the value slots of
//! that key: build with `dimension` large enough for the worst bucket and
//! insert every colliding value under the same key.

use xxhash_rust::xxh3::xxh3_64;
use xxhash_rust::xxh64::xxh64;

use crate::encoding::IndexKey;

/// 64-bit XXH64 of `bytes` with seed 0.
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    xxh64(bytes, 0)
}

#[inline]
pub fn hash_str(s: &str) -> u64 {
    hash_bytes(s.as_bytes())
}

#[inline]
pub fn hash_with_seed(bytes: &[u8], seed: u64) -> u64 {
    xxh64(bytes, seed)
}

/// XXH3 64-bit, faster on short inputs but a different hash than `hash_bytes`.
#[inline]
pub fn hash_fast(bytes: &[u8]) -> u64 {
    xxh3_64(bytes)
}

/// Hashes `bytes` and narrows the result into the key domain `K`.
#[inline]
pub fn hash_key<K: IndexKey>(bytes: &[u8]) -> K {
    K::from_hash(hash_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xxh64_known_vector() {
        // reference value for the empty input with seed 0
        assert_eq!(hash_bytes(b""), 0xEF46_DB37_51D8_E999);
    }

    #[test]
    fn str_and_bytes_agree() {
        assert_eq!(hash_str("12345"), hash_bytes(b"12345"));
    }

    #[test]
    fn seed_changes_hash() {
        assert_ne!(hash_with_seed(b"key", 0), hash_with_seed(b"key", 1));
        assert_eq!(hash_with_seed(b"key", 0), hash_bytes(b"key"));
    }

    #[test]
    fn fast_hash_is_deterministic() {
        assert_eq!(hash_fast(b"abc"), hash_fast(b"abc"));
        assert_ne!(hash_fast(b"abc"), hash_fast(b"abd"));
    }

    #[test]
    fn hash_key_narrows_per_width() {
        let full = hash_bytes(b"narrow");
        assert_eq!(hash_key::<u64>(b"narrow"), full);
        assert_eq!(hash_key::<u32>(b"narrow"), u32::from_hash(full));
        assert_eq!(hash_key::<u16>(b"narrow"), u16::from_hash(full));
    }
}
