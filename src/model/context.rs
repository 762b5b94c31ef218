//! Explicit computation context for repeated log-factorial terms.
//!
//! Purpose
//! -------
//! The likelihood models evaluate `ln k!` and `ln C(n, k)` for the same small
//! integers millions of times per mesh. [`ComputeContext`] precomputes a
//! lookup table once; callers construct it up front and pass it by reference
//! into every scoring call. It is immutable after construction, so one
//! context can be shared freely across threads.
//!
//! Conventions
//! -----------
//! - Entries beyond the table fall back to `statrs::function::gamma::ln_gamma`.
use statrs::function::gamma::ln_gamma;

/// Default number of cached `ln k!` entries (`k = 0..4096`).
pub const DEFAULT_LOG_FACTORIAL_LEN: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct ComputeContext {
    ln_factorial: Vec<f64>,
}

impl ComputeContext {
    pub fn new() -> Self {
        Self::with_table_len(DEFAULT_LOG_FACTORIAL_LEN)
    }

    /// Build a context caching `ln k!` for `k < len` (at least `k = 0`).
    pub fn with_table_len(len: usize) -> Self {
        let len = len.max(1);
        let mut ln_factorial = Vec::with_capacity(len);
        ln_factorial.push(0.0);
        for k in 1..len {
            let prev = ln_factorial[k - 1];
            ln_factorial.push(prev + (k as f64).ln());
        }
        Self { ln_factorial }
    }

    pub fn table_len(&self) -> usize {
        self.ln_factorial.len()
    }

    /// `ln k!`.
    pub fn ln_factorial(&self, k: usize) -> f64 {
        match self.ln_factorial.get(k) {
            Some(&v) => v,
            None => ln_gamma(k as f64 + 1.0),
        }
    }

    /// `ln C(n, k)`; `-inf` when `k > n`.
    pub fn ln_binomial(&self, n: usize, k: usize) -> f64 {
        if k > n {
            return f64::NEG_INFINITY;
        }
        self.ln_factorial(n) - self.ln_factorial(k) - self.ln_factorial(n - k)
    }
}

impl Default for ComputeContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Cached and fallback paths agree with direct values.
    //
    // Given
    // -----
    // - A context caching only `k < 8`.
    //
    // Expect
    // ------
    // - `ln 5! = ln 120` from the table and `ln 10!` from `ln_gamma`.
    fn cached_and_fallback_paths_agree() {
        let ctx = ComputeContext::with_table_len(8);

        assert_relative_eq!(ctx.ln_factorial(5), 120.0_f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(ctx.ln_factorial(10), 3_628_800.0_f64.ln(), epsilon = 1e-10);
        assert_eq!(ctx.ln_factorial(0), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Binomial helper matches a known value and rejects `k > n`.
    fn ln_binomial_matches_known_value() {
        let ctx = ComputeContext::new();

        assert_relative_eq!(ctx.ln_binomial(6, 2), 15.0_f64.ln(), epsilon = 1e-12);
        assert_eq!(ctx.ln_binomial(2, 3), f64::NEG_INFINITY);
    }
}
