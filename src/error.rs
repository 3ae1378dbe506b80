//! Error types for filter construction.
//!
//! Construction is the only fallible surface in this crate. Batch insert and
//! lookup operate on caller-provided buffers, never allocate, and cannot fail;
//! they are therefore plain methods without a `Result` wrapper.
//!
//! # Error Propagation
//!
//! ```
//! use blockbloom::{Result, RegisterBlocked64};
//!
//! fn build_probe_filter(n_keys: usize) -> Result<RegisterBlocked64> {
//!     RegisterBlocked64::with_params(n_keys, 12)
//! }
//! # assert!(build_probe_filter(1024).is_ok());
//! ```

#![allow(clippy::module_name_repetitions)]

use std::fmt;

/// Result type alias used throughout the crate.
///
/// All fallible operations return [`Result<T>`] where the error type is
/// [`FilterError`].
pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors that can occur while constructing a filter.
///
/// # Design Notes
/// - `Clone` + `PartialEq` enable testing and error comparison
/// - Each variant carries the offending value for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The expected key count is zero.
    ///
    /// Sizing multiplies the key count by the bit budget; zero keys would
    /// produce a degenerate filter.
    InvalidKeyCount {
        /// The invalid count that was provided.
        count: usize,
    },

    /// The bits-per-key budget is zero.
    ///
    /// A filter with no bit budget accepts everything and is useless.
    InvalidBitsPerKey {
        /// The invalid budget that was provided.
        bits_per_key: u32,
    },

    /// The aligned bit-array allocation failed.
    ///
    /// Reported when the allocator returns null for the filter's word
    /// buffer. No filter is produced.
    AllocationFailed {
        /// Size of the failed request in bytes.
        bytes: usize,
    },

    /// Internal invariant violated.
    ///
    /// This should never occur in correct usage. If it does, it indicates a
    /// bug in blockbloom itself.
    InternalError {
        /// Description of the invariant that was violated.
        message: String,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeyCount { count } => {
                write!(
                    f,
                    "Invalid key count: {}. Expected keys must be greater than 0.",
                    count
                )
            }
            Self::InvalidBitsPerKey { bits_per_key } => {
                write!(
                    f,
                    "Invalid bits-per-key budget: {}. Must be greater than 0.",
                    bits_per_key
                )
            }
            Self::AllocationFailed { bytes } => {
                write!(f, "Failed to allocate {} bytes for the filter buffer.", bytes)
            }
            Self::InternalError { message } => {
                write!(f, "Internal error (this is a bug in blockbloom): {}.", message)
            }
        }
    }
}

impl std::error::Error for FilterError {}

impl FilterError {
    /// Create an `InvalidKeyCount` error.
    #[must_use]
    pub fn invalid_key_count(count: usize) -> Self {
        Self::InvalidKeyCount { count }
    }

    /// Create an `InvalidBitsPerKey` error.
    #[must_use]
    pub fn invalid_bits_per_key(bits_per_key: u32) -> Self {
        Self::InvalidBitsPerKey { bits_per_key }
    }

    /// Create an `AllocationFailed` error.
    #[must_use]
    pub fn allocation_failed(bytes: usize) -> Self {
        Self::AllocationFailed { bytes }
    }

    /// Create an `InternalError`.
    ///
    /// Only for conditions that indicate bugs in blockbloom.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_key_count() {
        let err = FilterError::invalid_key_count(0);
        let display = format!("{err}");
        assert!(display.contains('0'));
        assert!(display.contains("greater than 0"));
    }

    #[test]
    fn test_display_invalid_bits_per_key() {
        let err = FilterError::invalid_bits_per_key(0);
        let display = format!("{err}");
        assert!(display.contains("bits-per-key"));
    }

    #[test]
    fn test_display_allocation_failed() {
        let err = FilterError::allocation_failed(1 << 20);
        let display = format!("{err}");
        assert!(display.contains("1048576"));
        assert!(display.contains("allocate"));
    }

    #[test]
    fn test_display_internal_error() {
        let err = FilterError::internal_error("impossible state reached");
        let display = format!("{err}");
        assert!(display.contains("bug"));
        assert!(display.contains("impossible state reached"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let _err: Box<dyn std::error::Error> = Box::new(FilterError::invalid_key_count(0));
    }

    #[test]
    fn test_error_clone_eq() {
        let err1 = FilterError::allocation_failed(64);
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn test_propagation_with_question_mark() {
        fn inner() -> Result<()> {
            Err(FilterError::invalid_key_count(0))
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
