//! Monotonic counter behind the benchmark driver's cycles-per-tuple numbers.
//!
//! On `x86_64` the counter is the time-stamp counter read with `RDTSC`, so
//! deltas are CPU reference cycles. Everywhere else the counter falls back
//! to a high-resolution wall clock and deltas are nanoseconds; the
//! cycles-per-tuple figures stay comparable within one host either way.

/// The monotonic counter the benchmark driver times operations with.
///
/// # Examples
///
/// ```
/// use blockbloom::util::cycles::CycleCounter;
///
/// let start = CycleCounter::now();
/// let end = CycleCounter::now();
/// assert!(end >= start);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CycleCounter;

impl CycleCounter {
    /// Read the counter.
    ///
    /// Only deltas between two reads on the same host are meaningful.
    #[inline]
    #[must_use]
    pub fn now() -> u64 {
        #[cfg(target_arch = "x86_64")]
        {
            // SAFETY: RDTSC is unprivileged and available on every x86_64
            // CPU.
            unsafe { std::arch::x86_64::_rdtsc() }
        }

        #[cfg(not(target_arch = "x86_64"))]
        {
            use std::sync::OnceLock;
            use std::time::Instant;

            static EPOCH: OnceLock<Instant> = OnceLock::new();
            EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_monotonic_under_work() {
        let start = CycleCounter::now();
        // Enough work that the counter must visibly advance.
        let mut acc = 0u64;
        for i in 0..100_000u64 {
            acc = acc.wrapping_add(crate::hash::mix64(i));
        }
        let end = CycleCounter::now();
        assert!(end > start, "counter did not advance (acc={acc})");
    }
}
