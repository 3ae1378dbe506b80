//! Empirical false-positive rates at the calibration workload: 2^17 build
//! keys, 2^17 disjoint probes, 24 bits per key.
//!
//! The budgets are per-variant ceilings, not expectations; each geometry
//! sits well under its line with the fixed mixer and key sets used here.

use blockbloom::hash::{mix32, mix64};
use blockbloom::prelude::*;

const N: usize = 1 << 17;
const BITS_PER_KEY: u32 = 24;

fn fp_rate<F: BlockedFilter>(keys: &[F::Key], probes: &[F::Key]) -> f64 {
    let mut filter = F::with_params(keys.len(), BITS_PER_KEY).unwrap();
    filter.insert(keys);

    let mut out = vec![0u32; probes.len()];
    filter.lookup(probes, &mut out);
    let hits = out.iter().filter(|&&v| v != 0).count();
    hits as f64 / probes.len() as f64
}

#[test]
fn register_blocked_32_under_five_percent() {
    let keys: Vec<u32> = (0..N as u32).map(mix32).collect();
    let probes: Vec<u32> = (N as u32..2 * N as u32).map(mix32).collect();
    let rate = fp_rate::<RegisterBlocked32>(&keys, &probes);
    assert!(rate <= 0.05, "observed FPR {rate}");
}

#[test]
fn register_blocked_64_under_two_percent() {
    let keys: Vec<u64> = (0..N as u64).map(mix64).collect();
    let probes: Vec<u64> = (N as u64..2 * N as u64).map(mix64).collect();
    let rate = fp_rate::<RegisterBlocked64>(&keys, &probes);
    assert!(rate <= 0.02, "observed FPR {rate}");
}

#[test]
fn mask_blocked_64_under_one_percent() {
    let keys: Vec<u64> = (0..N as u64).map(mix64).collect();
    let probes: Vec<u64> = (N as u64..2 * N as u64).map(mix64).collect();
    let rate = fp_rate::<MaskBlocked64>(&keys, &probes);
    assert!(rate <= 0.01, "observed FPR {rate}");
}

#[test]
fn cache_sectorized_32_under_a_tenth_percent() {
    let keys: Vec<u64> = (0..N as u64).map(mix64).collect();
    let probes: Vec<u64> = (N as u64..2 * N as u64).map(mix64).collect();
    let rate = fp_rate::<CacheSectorized32>(&keys, &probes);
    assert!(rate <= 0.001, "observed FPR {rate}");
}
