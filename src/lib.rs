//! blockbloom: block-layout Bloom filters for analytical join processing.
//!
//! A library of approximate set-membership filters built for the hot loop
//! of a hash join: given a stream of pre-hashed 64-bit keys, build a
//! compact bit array once, then probe it in batches at a handful of cycles
//! per tuple. Every variant keeps all the bits one key touches inside a
//! single machine word or a single cache line, and every batch loop is
//! written so the compiler's auto-vectorizer (or, for one variant, explicit
//! AVX2) does the heavy lifting.
//!
//! # What these filters are (and are not)
//!
//! Like any Bloom-style filter:
//! - **False positives**: a probe may report a key that was never inserted
//! - **Zero false negatives**: a reported miss is definite
//!
//! Unlike general-purpose Bloom filter libraries, these are build-once /
//! probe-many structures: no deletion, no resizing, no counting, and a
//! single writer during the build phase. The payoff is raw probe
//! throughput.
//!
//! # Quick Start
//!
//! ```
//! use blockbloom::RegisterBlocked64;
//! use blockbloom::hash::{mix64, mix64_batch};
//!
//! // Keys must be mixed before they touch a filter.
//! let raw: Vec<u64> = (0..10_000).collect();
//! let mut keys = vec![0u64; raw.len()];
//! mix64_batch(&raw, &mut keys);
//!
//! let mut filter = RegisterBlocked64::with_params(keys.len(), 12)?;
//! filter.insert(&keys);
//!
//! let mut out = vec![0u32; keys.len()];
//! filter.lookup(&keys, &mut out);
//! assert!(out.iter().all(|&v| v == 1));
//!
//! // A key that was never inserted is almost always rejected.
//! let mut miss = [0u32; 1];
//! filter.lookup(&[mix64(123_456_789)], &mut miss);
//! # Ok::<(), blockbloom::FilterError>(())
//! ```
//!
//! # Choosing a Variant
//!
//! | Variant | Key | Per-key cost | Accuracy | Best for |
//! |---------|-----|--------------|----------|----------|
//! | [`RegisterBlocked32`] | `u32` | 1 word, 3 bits | lowest | smallest filters, cheapest probes |
//! | [`RegisterBlocked64`] | `u64` | 1 word, 4 bits | low | general probe filtering |
//! | [`MaskBlocked32`] / [`MaskBlocked64`] | `u32`/`u64` | 1 word + table load | medium | same speed class, tighter FPR |
//! | [`TwoWordBlocked`] | `u64` | 2 words | medium | cache-resident (small) filters |
//! | [`CacheSectorized32`] / [`CacheSectorized64`] | `u64` | 1 cache line, 8 bits | highest | accuracy at one-miss cost |
//! | [`SimdGatherBlocked`] | `u64` | 1 lane vector | medium | AVX2 hosts, vector pipelines |
//!
//! # Concurrency Model
//!
//! One writer builds a filter (`insert` takes `&mut self`); afterwards any
//! number of threads may probe it concurrently (`lookup` takes `&self`,
//! filters are `Send + Sync`). Bits only ever flip 0→1, so a reader racing
//! the tail of a build observes a subset of the final bits and can at worst
//! return a miss for a key whose insert had not finished, never a false
//! negative for a completed insert.
//!
//! # Features
//!
//! - `trace` - construction-time `tracing` events (filter sizing, geometry)
//!
//! # Unsafe Code Policy
//!
//! Unsafe code is confined to two places, each with explicit safety
//! documentation:
//! - **`core::aligned`**: the 64-byte-aligned buffer allocation that
//!   `Vec` cannot express
//! - **`filters::simd_gather`**: AVX2 intrinsics behind runtime feature
//!   detection, with a bit-identical scalar fallback
//!
//! All public APIs are safe.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::needless_range_loop)]

/// Core data structures and traits
pub mod core;

/// Error types and result aliases
pub mod error;

/// Filter implementations (variants)
pub mod filters;

/// Mixing hash and batch hasher
pub mod hash;

/// Utility functions and helpers
pub mod util;

// Re-export commonly used types at crate root
pub use crate::error::{FilterError, Result};

// Re-export the core trait
pub use crate::core::filter::BlockedFilter;

// Re-export all filter variants at the crate root
pub use crate::filters::{
    CacheSectorized32, CacheSectorized64, MaskBlocked32, MaskBlocked64, RegisterBlocked32,
    RegisterBlocked64, SimdGatherBlocked, TwoWordBlocked,
};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use blockbloom::prelude::*;
/// use blockbloom::hash::mix64;
///
/// let keys: Vec<u64> = (0..100u64).map(mix64).collect();
/// let mut filter = RegisterBlocked64::with_params(keys.len(), 12).unwrap();
/// filter.insert(&keys);
/// ```
pub mod prelude {
    pub use crate::core::filter::BlockedFilter;
    pub use crate::error::{FilterError, Result};
    pub use crate::filters::{
        CacheSectorized32, CacheSectorized64, MaskBlocked32, MaskBlocked64, RegisterBlocked32,
        RegisterBlocked64, SimdGatherBlocked, TwoWordBlocked,
    };
    pub use crate::hash::{mix32, mix32_batch, mix64, mix64_batch};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_covers_the_basics() {
        let keys: Vec<u64> = (0..256u64).map(mix64).collect();
        let mut filter = CacheSectorized32::with_params(keys.len(), 16).unwrap();
        filter.insert(&keys);

        let mut out = vec![0u32; keys.len()];
        filter.lookup(&keys, &mut out);
        assert!(out.iter().all(|&v| v == 1));
    }

    #[test]
    fn test_trait_object_free_generic_usage() {
        fn drive<F: BlockedFilter<Key = u64>>(keys: &[u64]) -> u32 {
            let mut filter = F::with_params(keys.len(), 12).unwrap();
            filter.insert(keys);
            let mut out = vec![0u32; keys.len()];
            filter.lookup(keys, &mut out);
            out.iter().sum()
        }

        let keys: Vec<u64> = (0..512u64).map(mix64).collect();
        assert_eq!(drive::<RegisterBlocked64>(&keys), 512);
        assert_eq!(drive::<TwoWordBlocked>(&keys), 512);
        assert_eq!(drive::<CacheSectorized64>(&keys), 512);
        assert_eq!(drive::<SimdGatherBlocked>(&keys), 512);
    }

    #[test]
    fn test_filters_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RegisterBlocked32>();
        assert_send_sync::<MaskBlocked64>();
        assert_send_sync::<CacheSectorized32>();
        assert_send_sync::<SimdGatherBlocked>();
    }
}
