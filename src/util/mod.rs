//! Utility functions and helpers.

pub mod bitops;
pub mod cycles;

pub use bitops::{block_index, is_power_of_two, sized_block_count};
