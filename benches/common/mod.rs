//! Shared data generators for the filter benchmarks.
//!
//! All benchmarks draw keys from here so runs are comparable: the same
//! seeded RNG, the same mixing step, the same batch sizes.

#![allow(dead_code)]

use blockbloom::hash::{mix32_batch, mix64_batch};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fixed RNG seed so every run benches identical key streams.
pub const KEY_SEED: u64 = 0xB10C_B100;

/// Random raw keys (pre-mix), seeded.
pub fn raw_keys(count: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(KEY_SEED);
    (0..count).map(|_| rng.gen()).collect()
}

/// Random mixed 64-bit hashes, ready for filter consumption.
pub fn mixed_keys64(count: usize) -> Vec<u64> {
    let raw = raw_keys(count);
    let mut out = vec![0u64; count];
    mix64_batch(&raw, &mut out);
    out
}

/// Random mixed 32-bit hashes for the 32-bit-keyed variants.
pub fn mixed_keys32(count: usize) -> Vec<u32> {
    let raw = raw_keys(count);
    let mut out = vec![0u32; count];
    mix32_batch(&raw, &mut out);
    out
}
