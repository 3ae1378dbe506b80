//! The batch contract every filter variant implements.

use crate::error::Result;

/// A build-once / probe-many approximate membership filter over pre-hashed
/// keys.
///
/// # Contract
///
/// - Keys handed to [`insert`](Self::insert) and [`lookup`](Self::lookup) are
///   **already mixed** (see [`crate::hash`]); the filter consumes the hash
///   bits directly. Feeding raw, non-avalanched values degrades the
///   false-positive rate.
/// - `insert` only ever sets bits. A key that looked up positive keeps
///   looking up positive for the lifetime of the filter.
/// - `lookup` writes `1` for a hit and `0` for a miss to `out[i]` for key
///   `i`, in index order, and returns the number of keys processed.
/// - Both operations are infallible, non-blocking, and perform no heap
///   allocation; per-batch scratch lives on the stack.
/// - A `1` verdict may be a false positive; a `0` verdict is exact.
///
/// # Concurrency
///
/// Insertion requires `&mut self` (single writer). Once all inserts are
/// done, the filter may be probed from any number of threads concurrently;
/// every bit transition is 0→1, so readers racing a word load observe a
/// superset-or-subset word that cannot produce a false negative for a key
/// whose insert completed before the probe began.
///
/// # Examples
///
/// ```
/// use blockbloom::{BlockedFilter, RegisterBlocked64};
/// use blockbloom::hash::mix64;
///
/// let keys: Vec<u64> = (0..1000u64).map(mix64).collect();
/// let mut filter = RegisterBlocked64::with_params(keys.len(), 12)?;
/// filter.insert(&keys);
///
/// let mut out = vec![0u32; keys.len()];
/// assert_eq!(filter.lookup(&keys, &mut out), keys.len());
/// assert!(out.iter().all(|&v| v == 1), "inserted keys never miss");
/// # Ok::<(), blockbloom::FilterError>(())
/// ```
pub trait BlockedFilter: Sized {
    /// Pre-hashed key width this variant consumes (`u32` or `u64`).
    type Key: Copy;

    /// Variant name as reported by the benchmark driver.
    const NAME: &'static str;

    /// Build an empty filter sized for `n_keys` expected insertions at a
    /// target budget of `bits_per_key` filter bits per key.
    ///
    /// The actual size is the smallest power of two of blocks whose total
    /// bit count covers the budget, clamped to the variant's maximum; the
    /// word buffer is zero-filled.
    ///
    /// # Errors
    ///
    /// Fails when `n_keys` or `bits_per_key` is zero, or when the aligned
    /// buffer allocation fails.
    fn with_params(n_keys: usize, bits_per_key: u32) -> Result<Self>;

    /// Set the filter bits for every key in the batch.
    fn insert(&mut self, keys: &[Self::Key]);

    /// Probe every key in the batch, writing a `0`/`1` verdict per slot.
    ///
    /// `out` must hold at least `keys.len()` slots. Returns `keys.len()`.
    fn lookup(&self, keys: &[Self::Key], out: &mut [u32]) -> usize;

    /// Number of blocks in the filter (always a power of two).
    fn num_blocks(&self) -> usize;

    /// Heap footprint of the bit array in bytes.
    fn size_bytes(&self) -> usize;
}
