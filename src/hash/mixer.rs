//! Murmur-style integer finalizers and their batch forms.
//!
//! The scalar mixers run three xor-shift / multiply rounds over a single
//! word. Three rounds are enough for full avalanche (each input bit flips
//! ~half the output bits), and the multiply constants are the ones DuckDB
//! uses for its hash-join pipeline.
//!
//! The batch forms exist for the benchmark-driver hot path: they split the
//! input into an unaligned head, a cache-line-aligned body walked in
//! fixed-size chunks, and a tail, so the interior is a stride-1 loop the
//! compiler turns into SIMD without peeling.

use crate::core::aligned::head_before_alignment;

/// Multiply constant of the 64-bit finalizer.
const MIX64_MUL: u64 = 0xD6E8_FEB8_6659_FD93;

/// Multiply constant of the 32-bit finalizer.
const MIX32_MUL: u32 = 0xD6E8_FEB9;

/// Chunk width of the aligned batch interior.
const BATCH: usize = 16;

/// Mix a 64-bit key into an avalanched 64-bit hash.
///
/// Deterministic and bijective: distinct keys produce distinct hashes.
///
/// # Examples
///
/// ```
/// use blockbloom::hash::mix64;
///
/// assert_eq!(mix64(7), mix64(7));
/// assert_ne!(mix64(7), mix64(8));
/// ```
#[inline(always)]
#[must_use]
pub const fn mix64(mut x: u64) -> u64 {
    x ^= x >> 32;
    x = x.wrapping_mul(MIX64_MUL);
    x ^= x >> 32;
    x = x.wrapping_mul(MIX64_MUL);
    x ^= x >> 32;
    x
}

/// Mix a 32-bit key into an avalanched 32-bit hash.
///
/// # Examples
///
/// ```
/// use blockbloom::hash::mix32;
///
/// assert_ne!(mix32(7), 7);
/// ```
#[inline(always)]
#[must_use]
pub const fn mix32(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(MIX32_MUL);
    x ^= x >> 16;
    x = x.wrapping_mul(MIX32_MUL);
    x ^= x >> 16;
    x
}

/// Mix a run of 64-bit keys into `out`, one hash per key.
///
/// Accepts any input alignment; the bulk interior runs on 64-byte-aligned
/// loads in chunks of 16.
///
/// # Panics
///
/// Panics if `out` is shorter than `keys`.
pub fn mix64_batch(keys: &[u64], out: &mut [u64]) {
    assert!(out.len() >= keys.len(), "output buffer shorter than key batch");

    let head = head_before_alignment(keys);
    let (head_keys, body_keys) = keys.split_at(head);
    let (head_out, body_out) = out[..keys.len()].split_at_mut(head);

    for (o, &k) in head_out.iter_mut().zip(head_keys) {
        *o = mix64(k);
    }

    let mut key_chunks = body_keys.chunks_exact(BATCH);
    let mut out_chunks = body_out.chunks_exact_mut(BATCH);
    for (ks, os) in (&mut key_chunks).zip(&mut out_chunks) {
        for j in 0..BATCH {
            os[j] = mix64(ks[j]);
        }
    }

    for (o, &k) in out_chunks.into_remainder().iter_mut().zip(key_chunks.remainder()) {
        *o = mix64(k);
    }
}

/// Mix a run of 64-bit keys down to 32-bit hashes, one per key.
///
/// Each key is truncated to its low word before mixing; the 32-bit-word
/// filter variants consume these hashes.
///
/// # Panics
///
/// Panics if `out` is shorter than `keys`.
pub fn mix32_batch(keys: &[u64], out: &mut [u32]) {
    assert!(out.len() >= keys.len(), "output buffer shorter than key batch");

    let head = head_before_alignment(keys);
    let (head_keys, body_keys) = keys.split_at(head);
    let (head_out, body_out) = out[..keys.len()].split_at_mut(head);

    for (o, &k) in head_out.iter_mut().zip(head_keys) {
        *o = mix32(k as u32);
    }

    let mut key_chunks = body_keys.chunks_exact(BATCH);
    let mut out_chunks = body_out.chunks_exact_mut(BATCH);
    for (ks, os) in (&mut key_chunks).zip(&mut out_chunks) {
        for j in 0..BATCH {
            os[j] = mix32(ks[j] as u32);
        }
    }

    for (o, &k) in out_chunks.into_remainder().iter_mut().zip(key_chunks.remainder()) {
        *o = mix32(k as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix64_deterministic() {
        assert_eq!(mix64(0xDEAD_BEEF), mix64(0xDEAD_BEEF));
        assert_eq!(mix32(0xBEEF), mix32(0xBEEF));
    }

    #[test]
    fn test_mix64_avalanche() {
        // One flipped input bit should flip roughly half the output bits.
        for bit in [0u32, 17, 63] {
            let a = mix64(0x0123_4567_89AB_CDEF);
            let b = mix64(0x0123_4567_89AB_CDEF ^ (1u64 << bit));
            let flipped = (a ^ b).count_ones();
            assert!(
                flipped >= 16 && flipped <= 48,
                "bit {}: only {} output bits flipped",
                bit,
                flipped
            );
        }
    }

    #[test]
    fn test_mix32_avalanche() {
        for bit in [0u32, 9, 31] {
            let a = mix32(0x89AB_CDEF);
            let b = mix32(0x89AB_CDEF ^ (1u32 << bit));
            let flipped = (a ^ b).count_ones();
            assert!(flipped >= 8 && flipped <= 24, "bit {}: {} flipped", bit, flipped);
        }
    }

    #[test]
    fn test_mix64_batch_matches_scalar() {
        for n in [0usize, 1, 5, 15, 16, 17, 100, 257] {
            let keys: Vec<u64> = (0..n as u64).map(|i| i.wrapping_mul(0x9E37)).collect();
            let mut out = vec![0u64; n];
            mix64_batch(&keys, &mut out);
            let expected: Vec<u64> = keys.iter().map(|&k| mix64(k)).collect();
            assert_eq!(out, expected, "n={}", n);
        }
    }

    #[test]
    fn test_mix64_batch_unaligned_head() {
        // Offsetting the slice start exercises the head/body split.
        let keys: Vec<u64> = (0..100u64).collect();
        for offset in 0..8 {
            let sub = &keys[offset..];
            let mut out = vec![0u64; sub.len()];
            mix64_batch(sub, &mut out);
            let expected: Vec<u64> = sub.iter().map(|&k| mix64(k)).collect();
            assert_eq!(out, expected, "offset={}", offset);
        }
    }

    #[test]
    fn test_mix32_batch_matches_scalar() {
        for n in [0usize, 1, 16, 33, 200] {
            let keys: Vec<u64> = (0..n as u64).map(|i| i << 7).collect();
            let mut out = vec![0u32; n];
            mix32_batch(&keys, &mut out);
            let expected: Vec<u32> = keys.iter().map(|&k| mix32(k as u32)).collect();
            assert_eq!(out, expected, "n={}", n);
        }
    }

    #[test]
    fn test_batch_allows_oversized_output() {
        let keys = [1u64, 2, 3];
        let mut out = [0u64; 8];
        mix64_batch(&keys, &mut out);
        assert_eq!(out[2], mix64(3));
        assert_eq!(out[3], 0, "slots past the batch stay untouched");
    }

    #[test]
    #[should_panic(expected = "output buffer shorter")]
    fn test_batch_rejects_short_output() {
        let keys = [1u64, 2, 3];
        let mut out = [0u64; 2];
        mix64_batch(&keys, &mut out);
    }
}
