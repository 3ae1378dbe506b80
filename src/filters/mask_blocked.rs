//! Register-blocked filters with table-driven probe masks.
//!
//! Same one-word-per-key addressing as
//! [`RegisterBlocked`](crate::filters::RegisterBlocked), but the probe mask
//! comes from the pre-generated rotated-mask tables in
//! [`masks`](crate::filters::masks) instead of being OR-ed together from
//! raw hash fields. Constrained popcount buys a visibly lower
//! false-positive rate at the same space; the price is one extra unaligned
//! load from a table small enough to stay cache-resident.

use crate::core::aligned::AlignedWords;
use crate::core::filter::BlockedFilter;
use crate::core::geometry::FilterWord;
use crate::error::{FilterError, Result};
use crate::filters::masks::{MaskTable32, MaskTable64};
use crate::util::bitops::{block_index, sized_block_count};

/// Word widths that have a rotated-mask table.
///
/// Binds a [`FilterWord`] to its process-wide table and to the variant's
/// block-count ceiling.
pub trait MaskedWord: FilterWord {
    /// Block-count ceiling for the mask-blocked variant of this width.
    const MAX_BLOCKS_LOG2: u32;

    /// Fetch the rotated table mask for a hash of this width.
    fn table_mask(hash: Self) -> Self;
}

impl MaskedWord for u32 {
    const MAX_BLOCKS_LOG2: u32 = 16;

    #[inline(always)]
    fn table_mask(hash: u32) -> u32 {
        MaskTable32::get().mask(hash)
    }
}

impl MaskedWord for u64 {
    /// 2^21 64-bit words = 16 MiB.
    const MAX_BLOCKS_LOG2: u32 = 21;

    #[inline(always)]
    fn table_mask(hash: u64) -> u64 {
        MaskTable64::get().mask(hash)
    }
}

/// Mask-blocked filter generic over the word width.
///
/// Use the [`MaskBlocked32`] / [`MaskBlocked64`] aliases.
///
/// # Examples
///
/// ```
/// use blockbloom::MaskBlocked64;
/// use blockbloom::hash::mix64;
///
/// let keys: Vec<u64> = (0..65536u64).map(mix64).collect();
/// let mut filter = MaskBlocked64::with_params(keys.len(), 16)?;
/// filter.insert(&keys);
///
/// let mut out = vec![0u32; keys.len()];
/// filter.lookup(&keys, &mut out);
/// assert!(out.iter().all(|&v| v == 1));
/// # Ok::<(), blockbloom::FilterError>(())
/// ```
#[derive(Debug)]
pub struct MaskBlocked<W: MaskedWord> {
    words: AlignedWords<W>,
    num_blocks: usize,
    num_blocks_log: u32,
}

/// 32-bit mask-blocked filter (popcount exactly 3 per mask).
pub type MaskBlocked32 = MaskBlocked<u32>;

/// 64-bit mask-blocked filter (popcount 4 to 5 per mask).
pub type MaskBlocked64 = MaskBlocked<u64>;

impl<W: MaskedWord> MaskBlocked<W> {
    /// Build an empty filter sized for `n_keys` at `bits_per_key`.
    ///
    /// Touching the table here also forces its one-time initialization, so
    /// the first probe batch is not the one paying for table generation.
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
            sized_block_count(n_keys, bits_per_key, W::BITS_LOG2, W::MAX_BLOCKS_LOG2);
        let words = AlignedWords::new_zeroed(num_blocks)?;
        let _ = W::table_mask(W::ZERO);

        #[cfg(feature = "trace")]
        tracing::debug!(
            word_bits = W::BITS,
            num_blocks,
            size_kib = (num_blocks << (W::BITS_LOG2 - 3)) / 1024,
            "sized mask-blocked filter"
        );

        Ok(Self {
            words,
            num_blocks,
            num_blocks_log,
        })
    }

    #[inline(always)]
    fn probe(num_blocks_log: u32, num_blocks: usize, key: W) -> (usize, W) {
        let block = block_index(key.into_hash(), W::BITS, num_blocks_log, num_blocks);
        (block, W::table_mask(key))
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

impl<W: MaskedWord> BlockedFilter for MaskBlocked<W> {
    type Key = W;

    const NAME: &'static str = if W::BITS == 32 {
        "register-blocked/masks/32"
    } else {
        "register-blocked/masks/64"
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
