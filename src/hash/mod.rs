//! Mixing hash: finalizers that turn arbitrary integer keys into
//! avalanche-quality filter input.
//!
//! Every filter in this crate consumes hash bits directly: block selection
//! reads the top of the word, bit positions read the bottom. That only works
//! when every bit of the input is uniformly distributed, so raw keys must
//! pass through one of these mixers first.
//!
//! # Module Structure
//!
//! ```text
//! hash/
//! ├── mixer.rs - scalar finalizers + alignment-aware batch forms
//! └── mod.rs   - this file (public API)
//! ```
//!
//! # Quick Start
//!
//! ```
//! use blockbloom::hash::{mix64, mix64_batch};
//!
//! let h = mix64(42);
//! assert_ne!(h, 42);
//!
//! let keys = [1u64, 2, 3, 4];
//! let mut hashes = [0u64; 4];
//! mix64_batch(&keys, &mut hashes);
//! assert_eq!(hashes[0], mix64(1));
//! ```

pub mod mixer;

pub use mixer::{mix32, mix32_batch, mix64, mix64_batch};
