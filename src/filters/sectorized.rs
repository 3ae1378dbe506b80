//! Cache-sectorized filters: eight bit-tests, one cache line.
//!
//! The most intricate geometry in the crate. A *block* is one full cache
//! line (512 bits) subdivided into word-sized *sectors*; the sectors are
//! partitioned into two *groups* and each key sets four bits in one sector
//! of each group. That fans k = 8 bit-tests across the line, approaching
//! the accuracy of an 8-hash Bloom filter while the whole probe still
//! costs a single cache miss, and each sector word stays at 4 bits per
//! resident key so its popcount density stays low.
//!
//! # Hash-field discipline
//!
//! All addressing fields are carved out of one 64-bit hash and are
//! **strictly disjoint**: forty-plus low bits feed the eight bit positions,
//! the next few select the two sectors, and the block index reads the top.
//! Reusing bits between the block field and the sector fields would
//! correlate block choice with in-block placement and silently inflate the
//! false-positive rate; the ceiling on `num_blocks` is exactly the point
//! where the block field would start eating into the payload bits.
//!
//! # Batch shape
//!
//! Insert and lookup walk the key buffer as unaligned head, aligned body in
//! batches of 32, and tail. The body computes all word indices and masks
//! for a batch into stack arrays first and applies them in a second pass;
//! the two flat passes are what the auto-vectorizer turns into gathers and
//! scatters.

use crate::core::aligned::{head_before_alignment, AlignedWords};
use crate::core::filter::BlockedFilter;
use crate::core::geometry::FilterWord;
use crate::error::{FilterError, Result};
use crate::util::bitops::{block_index, sized_block_count};

/// Keys per batch in the two-pass body.
const BATCH: usize = 32;

/// Bits per block: one cache line.
const BLOCK_BITS_LOG2: u32 = 9;

/// Cache-sectorized filter generic over the sector word width.
///
/// Use the [`CacheSectorized32`] / [`CacheSectorized64`] aliases. Both
/// consume full 64-bit hashes.
///
/// # Examples
///
/// ```
/// use blockbloom::CacheSectorized32;
/// use blockbloom::hash::mix64;
///
/// let keys: Vec<u64> = (0..100_000u64).map(mix64).collect();
/// let mut filter = CacheSectorized32::with_params(keys.len(), 24)?;
/// filter.insert(&keys);
///
/// let mut out = vec![0u32; keys.len()];
/// filter.lookup(&keys, &mut out);
/// assert!(out.iter().all(|&v| v == 1));
/// # Ok::<(), blockbloom::FilterError>(())
/// ```
#[derive(Debug)]
pub struct CacheSectorized<W: FilterWord> {
    /// Sector words, `num_blocks * SECTORS_PER_BLOCK` of them, 64-byte
    /// aligned so block boundaries coincide with cache-line boundaries.
    words: AlignedWords<W>,
    num_blocks: usize,
    num_blocks_log: u32,
}

/// Cache-sectorized filter with 32-bit sectors (16 per block, groups of 8).
pub type CacheSectorized32 = CacheSectorized<u32>;

/// Cache-sectorized filter with 64-bit sectors (8 per block, groups of 4).
pub type CacheSectorized64 = CacheSectorized<u64>;

impl<W: FilterWord> CacheSectorized<W> {
    /// Sector words per 512-bit block (16 or 8).
    pub const SECTORS_PER_BLOCK: usize = (512 / W::BITS) as usize;

    /// Sectors per group; one hash field picks one sector per group.
    pub const SECTORS_PER_GROUP: usize = Self::SECTORS_PER_BLOCK / 2;

    /// Width of one sector-index field (3 or 2 bits).
    const SECTOR_IDX_BITS: u32 = if W::BITS == 32 { 3 } else { 2 };

    /// Bit positions set per group.
    pub const POSITIONS_PER_GROUP: u32 = 4;

    /// Block-count ceiling: the hash bits left over once the eight
    /// bit-position fields and both sector fields are paid for (2^18 for
    /// 32-bit sectors, 2^12 for 64-bit sectors).
    pub const MAX_BLOCKS_LOG2: u32 =
        64 - 2 * (Self::POSITIONS_PER_GROUP * W::BITS_LOG2 + Self::SECTOR_IDX_BITS);

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

        let (num_blocks, num_blocks_log) =
            sized_block_count(n_keys, bits_per_key, BLOCK_BITS_LOG2, Self::MAX_BLOCKS_LOG2);
        let words = AlignedWords::new_zeroed(num_blocks * Self::SECTORS_PER_BLOCK)?;

        #[cfg(feature = "trace")]
        tracing::debug!(
            sector_bits = W::BITS,
            num_blocks,
            size_kib = num_blocks * 64 / 1024,
            "sized cache-sectorized filter"
        );

        Ok(Self {
            words,
            num_blocks,
            num_blocks_log,
        })
    }

    /// Word indices and masks for one key.
    ///
    /// Hash-field layout, low bits first: four position fields for group A,
    /// four for group B, the group-A sector index, the group-B sector
    /// index, then the block index in the top bits.
    #[inline(always)]
    fn probe(num_blocks_log: u32, num_blocks: usize, hash: u64) -> ([usize; 2], [W; 2]) {
        let lane_mask = u64::from(W::BITS - 1);
        let mut mask_a = W::ZERO;
        let mut mask_b = W::ZERO;
        for field in 0..Self::POSITIONS_PER_GROUP {
            mask_a |= W::one_shl(((hash >> (field * W::BITS_LOG2)) & lane_mask) as u32);
            mask_b |= W::one_shl(
                ((hash >> ((field + Self::POSITIONS_PER_GROUP) * W::BITS_LOG2)) & lane_mask) as u32,
            );
        }

        let sector_shift = 2 * Self::POSITIONS_PER_GROUP * W::BITS_LOG2;
        let group_mask = (Self::SECTORS_PER_GROUP - 1) as u64;
        let sector_a = ((hash >> sector_shift) & group_mask) as usize;
        let sector_b = ((hash >> (sector_shift + Self::SECTOR_IDX_BITS)) & group_mask) as usize;

        let block = block_index(hash, 64, num_blocks_log, num_blocks);
        let base = block * Self::SECTORS_PER_BLOCK;
        (
            [base + sector_a, base + Self::SECTORS_PER_GROUP + sector_b],
            [mask_a, mask_b],
        )
    }

    #[inline(always)]
    fn insert_one(&mut self, num_blocks_log: u32, num_blocks: usize, key: u64) {
        let (idx, masks) = Self::probe(num_blocks_log, num_blocks, key);
        self.words[idx[0]] |= masks[0];
        self.words[idx[1]] |= masks[1];
    }

    #[inline(always)]
    fn lookup_one(&self, num_blocks_log: u32, num_blocks: usize, key: u64) -> u32 {
        let (idx, masks) = Self::probe(num_blocks_log, num_blocks, key);
        let hit_a = (self.words[idx[0]] & masks[0]) == masks[0];
        let hit_b = (self.words[idx[1]] & masks[1]) == masks[1];
        u32::from(hit_a & hit_b)
    }

    /// Set the filter bits for every key in the batch.
    pub fn insert(&mut self, keys: &[u64]) {
        let log = self.num_blocks_log;
        let nb = self.num_blocks;

        let head = head_before_alignment(keys);
        let (head_keys, body) = keys.split_at(head);
        for &key in head_keys {
            self.insert_one(log, nb, key);
        }

        let mut chunks = body.chunks_exact(BATCH);
        for chunk in &mut chunks {
            let mut idx_a = [0usize; BATCH];
            let mut idx_b = [0usize; BATCH];
            let mut mask_a = [W::ZERO; BATCH];
            let mut mask_b = [W::ZERO; BATCH];

            for j in 0..BATCH {
                let (idx, masks) = Self::probe(log, nb, chunk[j]);
                idx_a[j] = idx[0];
                idx_b[j] = idx[1];
                mask_a[j] = masks[0];
                mask_b[j] = masks[1];
            }

            for j in 0..BATCH {
                self.words[idx_a[j]] |= mask_a[j];
                self.words[idx_b[j]] |= mask_b[j];
            }
        }

        for &key in chunks.remainder() {
            self.insert_one(log, nb, key);
        }
    }

    /// Probe every key, writing a `0`/`1` verdict per slot.
    ///
    /// A key counts as present only when both sector words carry their
    /// 4-bit mask.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `keys`.
    pub fn lookup(&self, keys: &[u64], out: &mut [u32]) -> usize {
        assert!(out.len() >= keys.len(), "output buffer shorter than key batch");
        let log = self.num_blocks_log;
        let nb = self.num_blocks;

        let head = head_before_alignment(keys);
        let (head_keys, body) = keys.split_at(head);
        let (head_out, body_out) = out[..keys.len()].split_at_mut(head);
        for (o, &key) in head_out.iter_mut().zip(head_keys) {
            *o = self.lookup_one(log, nb, key);
        }

        let mut key_chunks = body.chunks_exact(BATCH);
        let mut out_chunks = body_out.chunks_exact_mut(BATCH);
        for (chunk, out_slot) in (&mut key_chunks).zip(&mut out_chunks) {
            let mut idx_a = [0usize; BATCH];
            let mut idx_b = [0usize; BATCH];
            let mut mask_a = [W::ZERO; BATCH];
            let mut mask_b = [W::ZERO; BATCH];

            for j in 0..BATCH {
                let (idx, masks) = Self::probe(log, nb, chunk[j]);
                idx_a[j] = idx[0];
                idx_b[j] = idx[1];
                mask_a[j] = masks[0];
                mask_b[j] = masks[1];
            }

            for j in 0..BATCH {
                let hit_a = (self.words[idx_a[j]] & mask_a[j]) == mask_a[j];
                let hit_b = (self.words[idx_b[j]] & mask_b[j]) == mask_b[j];
                out_slot[j] = u32::from(hit_a & hit_b);
            }
        }

        for (o, &key) in out_chunks.into_remainder().iter_mut().zip(key_chunks.remainder()) {
            *o = self.lookup_one(log, nb, key);
        }
        keys.len()
    }

    /// Number of cache-line blocks (a power of two).
    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Heap footprint of the bit array in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.words.size_bytes()
    }

    /// Read-only view of the sector words (test and inspection hook).
    #[must_use]
    pub fn words(&self) -> &[W] {
        &self.words
    }
}

impl<W: FilterWord> BlockedFilter for CacheSectorized<W> {
    type Key = u64;

    const NAME: &'static str = if W::BITS == 32 {
        "cache-sectorized/32"
    } else {
        "cache-sectorized/64"
    };

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
