//! SIMD-gather blocked filter: one 256-bit lane vector per key.
//!
//! A block is eight 32-bit sector words, i.e. one 256-bit SIMD register. The
//! probe mask is built entirely in vector registers: broadcast the upper
//! hash half, multiply lane-wise by eight fixed odd constants, keep the top
//! five bits of each product as a bit position, and set one bit per lane.
//! Insert is a vector OR into the block; lookup checks that every lane of
//! the block covers its mask lane.
//!
//! # Portability
//!
//! The AVX2 path is selected once at construction via runtime feature
//! detection (`is_x86_feature_detected!`). The scalar path computes the
//! exact same lane arithmetic (`wrapping_mul`, shift, single bit), so the
//! produced bit buffer is byte-identical whichever path ran; switching
//! hosts never changes filter contents, only throughput.

#![allow(clippy::unreadable_literal)]

use crate::core::aligned::AlignedWords;
use crate::core::filter::BlockedFilter;
use crate::error::{FilterError, Result};
use crate::util::bitops::sized_block_count;

/// Sector words (lanes) per block.
const LANES: usize = 8;

/// Bits per block: 8 lanes of 32 bits.
const BLOCK_BITS_LOG2: u32 = 8;

/// Fixed odd multipliers, one per lane.
///
/// Chosen once for good top-bit dispersion of the lane products; the same
/// vector is baked into several analytical engines' blocked filters.
const LANE_SALTS: [u32; LANES] = [
    0x47b6137b, 0x44974d91, 0x8824ad5b, 0xa2b7289d,
    0x705495c7, 0x2df1424b, 0x9efc4947, 0x5c6bfb31,
];

/// SIMD-gather blocked filter.
///
/// Consumes full 64-bit hashes: the low half selects the block, the upper
/// half feeds the lane multipliers, so the two fields never overlap.
///
/// # Examples
///
/// ```
/// use blockbloom::SimdGatherBlocked;
/// use blockbloom::hash::mix64;
///
/// let keys: Vec<u64> = (0..10_000u64).map(mix64).collect();
/// let mut filter = SimdGatherBlocked::with_params(keys.len(), 16)?;
/// filter.insert(&keys);
///
/// let mut out = vec![0u32; keys.len()];
/// filter.lookup(&keys, &mut out);
/// assert!(out.iter().all(|&v| v == 1));
/// # Ok::<(), blockbloom::FilterError>(())
/// ```
#[derive(Debug)]
pub struct SimdGatherBlocked {
    /// Lane words, `num_blocks * LANES` of them. 64-byte base alignment
    /// makes every 32-byte block boundary vector-load aligned.
    words: AlignedWords<u32>,
    num_blocks: usize,
    #[cfg(target_arch = "x86_64")]
    use_avx2: bool,
}

impl SimdGatherBlocked {
    /// Block-count ceiling: 2^19 blocks of 32 bytes (16 MiB).
    pub const MAX_BLOCKS_LOG2: u32 = 19;

    /// Build an empty filter sized for `n_keys` at `bits_per_key`.
    ///
    /// # Errors
    ///
    /// See [`BlockedFilter::with_params`].
    pub fn with_params(n_keys: usize, bits_per_key: u32) -> Result<Self> {
        if n_keys == 0 {
            return Err(FilterError::invalid_key_count(n_keys));
        }
        if bits_per_key == 0 {
            return Err(FilterError::invalid_bits_per_key(bits_per_key));
        }

        let (num_blocks, _) =
            sized_block_count(n_keys, bits_per_key, BLOCK_BITS_LOG2, Self::MAX_BLOCKS_LOG2);
        let words = AlignedWords::new_zeroed(num_blocks * LANES)?;

        #[cfg(feature = "trace")]
        tracing::debug!(num_blocks, size_kib = num_blocks * 32 / 1024, "sized SIMD-gather filter");

        Ok(Self {
            words,
            num_blocks,
            #[cfg(target_arch = "x86_64")]
            use_avx2: is_x86_feature_detected!("avx2"),
        })
    }

    /// One set bit per lane, positioned by the salted upper hash half.
    #[inline(always)]
    fn mask_lanes(upper: u32) -> [u32; LANES] {
        let mut lanes = [0u32; LANES];
        for (lane, &salt) in lanes.iter_mut().zip(&LANE_SALTS) {
            *lane = 1u32 << (salt.wrapping_mul(upper) >> 27);
        }
        lanes
    }

    #[inline(always)]
    fn block_of(&self, key: u64) -> usize {
        (key as usize) & (self.num_blocks - 1)
    }

    fn insert_scalar(&mut self, keys: &[u64]) {
        for &key in keys {
            let base = self.block_of(key) * LANES;
            let lanes = Self::mask_lanes((key >> 32) as u32);
            for (word, lane) in self.words[base..base + LANES].iter_mut().zip(lanes) {
                *word |= lane;
            }
        }
    }

    fn lookup_scalar(&self, keys: &[u64], out: &mut [u32]) {
        for (o, &key) in out.iter_mut().zip(keys) {
            let base = self.block_of(key) * LANES;
            let lanes = Self::mask_lanes((key >> 32) as u32);
            let mut hit = true;
            for (word, lane) in self.words[base..base + LANES].iter().zip(lanes) {
                hit &= (word & lane) == lane;
            }
            *o = u32::from(hit);
        }
    }

    /// AVX2 insert.
    ///
    /// # Safety
    ///
    /// Caller must have verified AVX2 support; guaranteed by the
    /// `use_avx2` flag set from runtime detection at construction.
    #[cfg(target_arch = "x86_64")]
    #[target_feature(enable = "avx2")]
    unsafe fn insert_avx2(&mut self, keys: &[u64]) {
        use std::arch::x86_64::*;

        let ones = _mm256_set1_epi32(1);
        let salts = _mm256_setr_epi32(
            LANE_SALTS[0] as i32,
            LANE_SALTS[1] as i32,
            LANE_SALTS[2] as i32,
            LANE_SALTS[3] as i32,
            LANE_SALTS[4] as i32,
            LANE_SALTS[5] as i32,
            LANE_SALTS[6] as i32,
            LANE_SALTS[7] as i32,
        );

        let num_blocks = self.num_blocks;
        let base_ptr = self.words.as_mut_ptr();
        for &key in keys {
            let block = (key as usize) & (num_blocks - 1);
            let upper = _mm256_set1_epi32((key >> 32) as u32 as i32);
            let positions = _mm256_srli_epi32(_mm256_mullo_epi32(salts, upper), 27);
            let mask = _mm256_sllv_epi32(ones, positions);

            // SAFETY: block * LANES + 8 <= words.len(); the buffer base is
            // 64-byte aligned and blocks are 32 bytes, so the load is
            // aligned.
            let bucket_ptr = base_ptr.add(block * LANES).cast::<__m256i>();
            let bucket = _mm256_load_si256(bucket_ptr);
            _mm256_store_si256(bucket_ptr, _mm256_or_si256(bucket, mask));
        }
    }

    /// AVX2 lookup.
    ///
    /// # Safety
    ///
    /// Same contract as [`Self::insert_avx2`].
    #[cfg(target_arch = "x86_64")]
    #[target_feature(enable = "avx2")]
    unsafe fn lookup_avx2(&self, keys: &[u64], out: &mut [u32]) {
        use std::arch::x86_64::*;

        let ones = _mm256_set1_epi32(1);
        let salts = _mm256_setr_epi32(
            LANE_SALTS[0] as i32,
            LANE_SALTS[1] as i32,
            LANE_SALTS[2] as i32,
            LANE_SALTS[3] as i32,
            LANE_SALTS[4] as i32,
            LANE_SALTS[5] as i32,
            LANE_SALTS[6] as i32,
            LANE_SALTS[7] as i32,
        );

        let num_blocks = self.num_blocks;
        let base_ptr = self.words.as_ptr();
        for (o, &key) in out.iter_mut().zip(keys) {
            let block = (key as usize) & (num_blocks - 1);
            let upper = _mm256_set1_epi32((key >> 32) as u32 as i32);
            let positions = _mm256_srli_epi32(_mm256_mullo_epi32(salts, upper), 27);
            let mask = _mm256_sllv_epi32(ones, positions);

            // SAFETY: see insert_avx2.
            let bucket = _mm256_load_si256(base_ptr.add(block * LANES).cast::<__m256i>());
            // testc: 1 iff every mask bit is present in the bucket.
            *o = _mm256_testc_si256(bucket, mask) as u32;
        }
    }

    /// Set the filter bits for every key in the batch.
    pub fn insert(&mut self, keys: &[u64]) {
        #[cfg(target_arch = "x86_64")]
        if self.use_avx2 {
            // SAFETY: use_avx2 was set from runtime feature detection.
            unsafe { self.insert_avx2(keys) };
            return;
        }
        self.insert_scalar(keys);
    }

    /// Probe every key, writing a `0`/`1` verdict per slot.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `keys`.
    pub fn lookup(&self, keys: &[u64], out: &mut [u32]) -> usize {
        assert!(out.len() >= keys.len(), "output buffer shorter than key batch");
        let out = &mut out[..keys.len()];
        #[cfg(target_arch = "x86_64")]
        if self.use_avx2 {
            // SAFETY: use_avx2 was set from runtime feature detection.
            unsafe { self.lookup_avx2(keys, out) };
            return keys.len();
        }
        self.lookup_scalar(keys, out);
        keys.len()
    }

    /// Number of lane-vector blocks (a power of two).
    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Heap footprint of the bit array in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.words.size_bytes()
    }

    /// Read-only view of the lane words (test and inspection hook).
    #[must_use]
    pub fn words(&self) -> &[u32] {
        &self.words
    }
}

impl BlockedFilter for SimdGatherBlocked {
    type Key = u64;

    const NAME: &'static str = "SIMD-gather blocked";

    fn with_params(n_keys: usize, bits_per_key: u32) -> Result<Self> {
        Self::with_params(n_keys, bits_per_key)
    }

    fn insert(&mut self, keys: &[u64]) {
        Self::insert(self, keys);
    }

    fn lookup(&self, keys: &[u64], out: &mut [u32]) -> usize {
        Self::lookup(self, keys, out)
    }

    fn num_blocks(&self) -> usize {
        Self::num_blocks(self)
    }

    fn size_bytes(&self) -> usize {
        Self::size_bytes(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::mix64;

    #[test]
    fn test_mask_lanes_one_bit_each() {
        for upper in [0u32, 1, 0xDEADBEEF, u32::MAX] {
            let lanes = SimdGatherBlocked::mask_lanes(upper);
            for (i, lane) in lanes.iter().enumerate() {
                assert_eq!(lane.count_ones(), 1, "upper={upper:#x} lane {i}");
            }
        }
    }

    #[test]
    fn test_no_false_negatives() {
        let keys: Vec<u64> = (0..30_000u64).map(mix64).collect();
        let mut filter = SimdGatherBlocked::with_params(keys.len(), 16).unwrap();
        filter.insert(&keys);

        let mut out = vec![0u32; keys.len()];
        assert_eq!(filter.lookup(&keys, &mut out), keys.len());
        assert!(out.iter().all(|&v| v == 1));
    }

    #[test]
    fn test_scalar_path_matches_dispatch() {
        // Whatever path dispatch picks, the buffer must equal the scalar
        // rendition bit for bit.
        let keys: Vec<u64> = (0..5000u64).map(mix64).collect();

        let mut dispatched = SimdGatherBlocked::with_params(keys.len(), 12).unwrap();
        dispatched.insert(&keys);

        let mut scalar = SimdGatherBlocked::with_params(keys.len(), 12).unwrap();
        scalar.insert_scalar(&keys);

        assert_eq!(dispatched.words(), scalar.words());

        let mut out_a = vec![0u32; keys.len()];
        let mut out_b = vec![0u32; keys.len()];
        dispatched.lookup(&keys, &mut out_a);
        scalar.lookup_scalar(&keys, &mut out_b);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let keys: Vec<u64> = (0..1000u64).map(mix64).collect();
        let mut once = SimdGatherBlocked::with_params(keys.len(), 12).unwrap();
        once.insert(&keys);
        let mut twice = SimdGatherBlocked::with_params(keys.len(), 12).unwrap();
        twice.insert(&keys);
        twice.insert(&keys);
        assert_eq!(once.words(), twice.words());
    }

    #[test]
    fn test_block_and_mask_fields_disjoint() {
        let filter = SimdGatherBlocked::with_params(1 << 16, 16).unwrap();
        let key = mix64(99);
        // Upper-half changes never move the block.
        assert_eq!(filter.block_of(key), filter.block_of(key ^ (u64::MAX << 32)));
        // Low-half changes never alter the lanes.
        assert_eq!(
            SimdGatherBlocked::mask_lanes((key >> 32) as u32),
            SimdGatherBlocked::mask_lanes(((key ^ 0xFFFF_FFFF) >> 32) as u32),
        );
    }

    #[test]
    fn test_empty_filter_rejects_everything() {
        let filter = SimdGatherBlocked::with_params(4096, 12).unwrap();
        let probes: Vec<u64> = (0..4096u64).map(mix64).collect();
        let mut out = vec![1u32; probes.len()];
        filter.lookup(&probes, &mut out);
        assert!(out.iter().all(|&v| v == 0));
    }
}
