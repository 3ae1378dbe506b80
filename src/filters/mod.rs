//! Filter variant implementations.
//!
//! Each variant trades space, accuracy, and cycles-per-tuple differently;
//! all of them honor the [`BlockedFilter`](crate::core::BlockedFilter)
//! contract and touch at most one cache line per key (the two-word variant
//! excepted by design).
//!
//! # Available Variants
//!
//! | Variant | Block | Key | Bits/key set | Character |
//! |---------|-------|-----|--------------|-----------|
//! | [`RegisterBlocked32`] | one 32-bit word | `u32` | ≤ 3 | fastest probe, highest FPR |
//! | [`RegisterBlocked64`] | one 64-bit word | `u64` | ≤ 4 | fast probe, moderate FPR |
//! | [`MaskBlocked32`] | one 32-bit word | `u32` | exactly 3 | table-driven masks, tighter FPR |
//! | [`MaskBlocked64`] | one 64-bit word | `u64` | 4 to 5 | table-driven masks, tighter FPR |
//! | [`TwoWordBlocked`] | two 32-bit words | `u64` | 5 | small-filter regime, halved in-word density |
//! | [`CacheSectorized32`] | 512-bit cache line | `u64` | 8 | near 8-hash accuracy at 1-line cost |
//! | [`CacheSectorized64`] | 512-bit cache line | `u64` | 8 | 64-bit sector flavor |
//! | [`SimdGatherBlocked`] | 256-bit lane vector | `u64` | 8 | explicit SIMD insert/probe |
//!
//! The mask tables behind the `MaskBlocked` variants live in [`masks`] and
//! are process-wide constants initialized on first use.

pub mod mask_blocked;
pub mod masks;
pub mod register_blocked;
pub mod sectorized;
pub mod simd_gather;
pub mod two_word;

pub use mask_blocked::{MaskBlocked, MaskBlocked32, MaskBlocked64, MaskedWord};
pub use masks::{MaskTable32, MaskTable64};
pub use register_blocked::{RegisterBlocked, RegisterBlocked32, RegisterBlocked64};
pub use sectorized::{CacheSectorized, CacheSectorized32, CacheSectorized64};
pub use simd_gather::SimdGatherBlocked;
pub use two_word::TwoWordBlocked;
