//! Stable Text Fingerprints
//!
//! Fowler-Noll-Vo 1a hashes over the UTF-16 little-endian representation
//! of a string. Fingerprints are identical on every platform and in every
//! process, unlike `std::hash`, which is randomized per process.
//!
//! # Example
//! ```rust
//! use stringtools_hash::{combine64, compute_hash64};
//!
//! let key = combine64(compute_hash64("Configuration"), compute_hash64("Debug"));
//! assert_eq!(key, combine64(compute_hash64("Configuration"), compute_hash64("Debug")));
//! ```

/// FNV-1a 32-bit offset basis
pub const FNV_OFFSET_BASIS_32: u32 = 0x811C_9DC5;

/// FNV-1a 32-bit prime
pub const FNV_PRIME_32: u32 = 0x0100_0193;

/// FNV-1a 64-bit offset basis
pub const FNV_OFFSET_BASIS_64: u64 = 0xCBF2_9CE4_8422_2325;

/// FNV-1a 64-bit prime
pub const FNV_PRIME_64: u64 = 0x0000_0100_0000_01B3;

/// Hash error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
    #[error("{0} requires a little-endian target")]
    UnsupportedPlatform(&'static str),
}

/// 32-bit FNV-1a over raw bytes.
#[inline]
pub fn hash32_bytes(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS_32, |hash, &b| {
        (hash ^ b as u32).wrapping_mul(FNV_PRIME_32)
    })
}

/// 64-bit FNV-1a over raw bytes.
#[inline]
pub fn hash64_bytes(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS_64, |hash, &b| {
        (hash ^ b as u64).wrapping_mul(FNV_PRIME_64)
    })
}

/// 32-bit FNV-1a of a string.
///
/// Each UTF-16 code unit contributes its low byte, then its high byte.
pub fn compute_hash32(text: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS_32;
    for unit in text.encode_utf16() {
        hash = (hash ^ (unit & 0xFF) as u32).wrapping_mul(FNV_PRIME_32);
        hash = (hash ^ (unit >> 8) as u32).wrapping_mul(FNV_PRIME_32);
    }
    hash
}

/// 64-bit FNV-1a of a string, byte-wise like [`compute_hash32`].
pub fn compute_hash64(text: &str) -> u64 {
    let mut hash = FNV_OFFSET_BASIS_64;
    for unit in text.encode_utf16() {
        hash = (hash ^ (unit & 0xFF) as u64).wrapping_mul(FNV_PRIME_64);
        hash = (hash ^ (unit >> 8) as u64).wrapping_mul(FNV_PRIME_64);
    }
    hash
}

/// 64-bit FNV-1a variant folding a whole UTF-16 code unit per round.
///
/// Half the rounds of [`compute_hash64`], with a different value. The result
/// is defined on the little-endian code unit layout, so big-endian targets
/// get [`HashError::UnsupportedPlatform`] instead of a silently different
/// fingerprint.
pub fn compute_hash64_fast(text: &str) -> Result<u64, HashError> {
    if cfg!(target_endian = "big") {
        return Err(HashError::UnsupportedPlatform("compute_hash64_fast"));
    }

    Ok(text.encode_utf16().fold(FNV_OFFSET_BASIS_64, |hash, unit| {
        (hash ^ unit as u64).wrapping_mul(FNV_PRIME_64)
    }))
}

/// Combine two 64-bit fingerprints. Order-sensitive only through the inputs.
#[inline]
pub const fn combine64(left: u64, right: u64) -> u64 {
    (left ^ right).wrapping_mul(FNV_PRIME_64)
}
