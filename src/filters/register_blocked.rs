//! Register-blocked filters: one word per key.
//!
//! The cheapest geometry in the crate. A *block* is a single machine word;
//! one hash picks the block from its top bits and supplies the in-word bit
//! positions from its low fields, so a probe is one load, one AND, one
//! compare. The insert and lookup loops are plain stride-1 passes over the
//! key batch with no cross-iteration state, which is what lets the compiler
//! emit gathered SIMD for them.
//!
//! # Accuracy
//!
//! Packing all k bits of a key into one word concentrates collisions, so
//! the false-positive rate is noticeably higher than a classic Bloom filter
//! at equal space. That is the intended trade: in a hash-join probe
//! pipeline the filter is consulted once per tuple and the miss path
//! dominates, so cycles-per-tuple beats the last fraction of a percent of
//! accuracy. Use [`MaskBlocked`](crate::filters::MaskBlocked) or
//! [`CacheSectorized`](crate::filters::CacheSectorized) when accuracy
//! matters more.

use crate::core::aligned::AlignedWords;
use crate::core::filter::BlockedFilter;
use crate::core::geometry::FilterWord;
use crate::error::{FilterError, Result};
use crate::util::bitops::{block_index, sized_block_count};

/// Register-blocked filter generic over the word width.
///
/// Use the [`RegisterBlocked32`] / [`RegisterBlocked64`] aliases.
///
/// # Examples
///
/// ```
/// use blockbloom::RegisterBlocked32;
/// use blockbloom::hash::mix32;
///
/// let keys: Vec<u32> = (0..4096u32).map(mix32).collect();
/// let mut filter = RegisterBlocked32::with_params(keys.len(), 12)?;
/// filter.insert(&keys);
///
/// let mut out = vec![0u32; keys.len()];
/// filter.lookup(&keys, &mut out);
/// assert!(out.iter().all(|&v| v == 1));
/// # Ok::<(), blockbloom::FilterError>(())
/// ```
#[derive(Debug)]
pub struct RegisterBlocked<W: FilterWord> {
    /// Flat word array, one word per block, 64-byte aligned.
    words: AlignedWords<W>,
    num_blocks: usize,
    num_blocks_log: u32,
}

/// 32-bit-word register-blocked filter (k = 3).
pub type RegisterBlocked32 = RegisterBlocked<u32>;

/// 64-bit-word register-blocked filter (k = 4).
pub type RegisterBlocked64 = RegisterBlocked<u64>;

impl<W: FilterWord> RegisterBlocked<W> {
    /// Block-count ceiling: 2^17 words for the 32-bit flavor (matching the
    /// point where its block field would start overlapping the bit-position
    /// fields), 2^24 for the 64-bit flavor (128 MiB).
    pub const MAX_BLOCKS_LOG2: u32 = if W::BITS == 32 { 17 } else { 24 };

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
            sized_block_count(n_keys, bits_per_key, W::BITS_LOG2, Self::MAX_BLOCKS_LOG2);
        let words = AlignedWords::new_zeroed(num_blocks)?;

        #[cfg(feature = "trace")]
        tracing::debug!(
            word_bits = W::BITS,
            num_blocks,
            size_kib = (num_blocks << (W::BITS_LOG2 - 3)) / 1024,
            "sized register-blocked filter"
        );

        Ok(Self {
            words,
            num_blocks,
            num_blocks_log,
        })
    }

    /// Block index and probe mask for one key.
    ///
    /// Shared by insert and lookup so the two can never disagree on
    /// addressing.
    #[inline(always)]
    fn probe(num_blocks_log: u32, num_blocks: usize, key: W) -> (usize, W) {
        let h = key.into_hash();
        let block = block_index(h, W::BITS, num_blocks_log, num_blocks);
        (block, W::probe_mask(h))
    }

    /// Set the filter bits for every key in the batch.
    pub fn insert(&mut self, keys: &[W]) {
        let log = self.num_blocks_log;
        let nb = self.num_blocks;
        for &key in keys {
            let (block, mask) = Self::probe(log, nb, key);
            self.words[block] |= mask;
        }
    }

    /// Probe every key, writing a `0`/`1` verdict per slot.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `keys`.
    pub fn lookup(&self, keys: &[W], out: &mut [u32]) -> usize {
        assert!(out.len() >= keys.len(), "output buffer shorter than key batch");
        let log = self.num_blocks_log;
        let nb = self.num_blocks;
        for (o, &key) in out.iter_mut().zip(keys) {
            let (block, mask) = Self::probe(log, nb, key);
            *o = u32::from((self.words[block] & mask) == mask);
        }
        keys.len()
    }

    /// Number of word blocks (a power of two).
    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Heap footprint of the bit array in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.words.size_bytes()
    }

    /// Read-only view of the word array (test and inspection hook).
    #[must_use]
    pub fn words(&self) -> &[W] {
        &self.words
    }
}

impl<W: FilterWord> BlockedFilter for RegisterBlocked<W> {
    type Key = W;

    const NAME: &'static str = if W::BITS == 32 {
        "register-blocked/32"
    } else {
        "register-blocked/64"
    };

    fn with_params(n_keys: usize, bits_per_key: u32) -> Result<Self> {
        Self::with_params(n_keys, bits_per_key)
    }

    fn insert(&mut self, keys: &[W]) {
        Self::insert(self, keys);
    }

    fn lookup(&self, keys: &[W], out: &mut [u32]) -> usize {
        Self::lookup(self, keys, out)
    }

    fn num_blocks(&self) -> usize {
        Self::num_blocks(self)
    }

    fn size_bytes(&self) -> usize {
        Self::size_bytes(self)
    }
}
