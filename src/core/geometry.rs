//! Word-level geometry shared by the filter variants.
//!
//! Most variants in this crate come in a 32-bit-word and a 64-bit-word
//! flavor whose addressing arithmetic differs only in a handful of
//! constants: the word width, the width of one in-word bit-position field,
//! and how many such fields are folded into a probe mask. [`FilterWord`]
//! captures exactly that parameter set so each variant is written once as a
//! generic skeleton and resolved at compile time for both widths.
//!
//! The trait is sealed: the geometry only makes sense for the two machine
//! word types, and keeping the set closed lets the variants rely on the
//! constants being internally consistent.

use std::fmt::Debug;
use std::ops::{BitAnd, BitOr, BitOrAssign};

mod sealed {
    pub trait Sealed {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// A machine word a filter is blocked on, with its addressing constants.
///
/// Implemented for `u32` and `u64` only.
pub trait FilterWord:
    sealed::Sealed
    + Copy
    + Eq
    + Debug
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitOrAssign
    + Send
    + Sync
    + 'static
{
    /// Width of the word in bits (32 or 64).
    const BITS: u32;

    /// log2 of [`Self::BITS`]; also the width of one in-word bit-position
    /// field extracted from a hash (5 or 6).
    const BITS_LOG2: u32;

    /// Number of bit-position fields folded into a register-blocked probe
    /// mask (3 for 32-bit words, 4 for 64-bit words).
    const PROBE_FIELDS: u32;

    /// The all-zeroes word.
    const ZERO: Self;

    /// `1 << pos` in this word type. `pos` must be below [`Self::BITS`].
    fn one_shl(pos: u32) -> Self;

    /// Widen to 64 bits for field extraction.
    fn into_hash(self) -> u64;

    /// Build the register-blocked probe mask for a hash: the OR of
    /// [`Self::PROBE_FIELDS`] single bits, each positioned by one
    /// [`Self::BITS_LOG2`]-wide field taken from the low end of the hash.
    ///
    /// The fields occupy hash bits `[0, PROBE_FIELDS * BITS_LOG2)` and are
    /// therefore disjoint from the top-of-hash block-selection bits at every
    /// legal filter size; overlapping the two would correlate the in-block
    /// pattern with the block choice and inflate the false-positive rate.
    #[inline(always)]
    fn probe_mask(hash: u64) -> Self {
        let mut mask = Self::ZERO;
        for field in 0..Self::PROBE_FIELDS {
            let pos = (hash >> (field * Self::BITS_LOG2)) as u32 & (Self::BITS - 1);
            mask |= Self::one_shl(pos);
        }
        mask
    }
}

impl FilterWord for u32 {
    const BITS: u32 = 32;
    const BITS_LOG2: u32 = 5;
    const PROBE_FIELDS: u32 = 3;
    const ZERO: Self = 0;

    #[inline(always)]
    fn one_shl(pos: u32) -> Self {
        1u32 << pos
    }

    #[inline(always)]
    fn into_hash(self) -> u64 {
        u64::from(self)
    }
}

impl FilterWord for u64 {
    const BITS: u32 = 64;
    const BITS_LOG2: u32 = 6;
    const PROBE_FIELDS: u32 = 4;
    const ZERO: Self = 0;

    #[inline(always)]
    fn one_shl(pos: u32) -> Self {
        // Full-width shift: positions 32..64 must reach the upper word half.
        1u64 << pos
    }

    #[inline(always)]
    fn into_hash(self) -> u64 {
        self
    }
}
