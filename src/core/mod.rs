//! Core data structures and traits.
//!
//! This module holds everything the filter variants share:
//!
//! - [`aligned`] - the 64-byte-aligned word buffer backing every filter
//! - [`filter`] - the [`BlockedFilter`](filter::BlockedFilter) batch contract
//! - [`geometry`] - the [`FilterWord`](geometry::FilterWord) trait that lets
//!   one generic skeleton serve the 32-bit and 64-bit flavor of a variant

pub mod aligned;
pub mod filter;
pub mod geometry;

pub use aligned::{AlignedWords, CACHE_LINE_BYTES};
pub use filter::BlockedFilter;
pub use geometry::FilterWord;
