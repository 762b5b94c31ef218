//! Log-space helpers shared by the likelihood models.
//!
//! - [`xlogy`] evaluates `x · ln(y)` with the convention `0 · ln(0) = 0`, so
//!   empty bins never poison a sum with `NaN`.
//! - [`LogSumExp`] accumulates `ln Σ exp(t_k)` in a single streaming pass
//!   without overflow, rescaling whenever a new maximum arrives.

/// `x · ln(y)`, returning `0` whenever `x == 0` (even for `y == 0`).
pub fn xlogy(x: f64, y: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x * y.ln() }
}

/// Streaming log-sum-exp accumulator.
///
/// Terms equal to `-inf` contribute nothing; an accumulator that only saw
/// such terms (or none at all) reports `-inf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogSumExp {
    max: f64,
    scaled_sum: f64,
}

impl LogSumExp {
    pub fn new() -> Self {
        Self { max: f64::NEG_INFINITY, scaled_sum: 0.0 }
    }

    /// Add `exp(log_term)` to the running sum.
    pub fn push(&mut self, log_term: f64) {
        if log_term == f64::NEG_INFINITY || log_term.is_nan() {
            return;
        }
        if log_term > self.max {
            self.scaled_sum = self.scaled_sum * (self.max - log_term).exp() + 1.0;
            self.max = log_term;
        } else {
            self.scaled_sum += (log_term - self.max).exp();
        }
    }

    /// Current value of `ln Σ exp(t_k)`.
    pub fn value(&self) -> f64 {
        if self.scaled_sum == 0.0 { f64::NEG_INFINITY } else { self.max + self.scaled_sum.ln() }
    }
}

impl Default for LogSumExp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // - `xlogy` zero convention.
    // - `LogSumExp` agreement with the naive formula and overflow safety.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `0 · ln 0` must be 0 and ordinary inputs must match `x · ln y`.
    fn xlogy_handles_zero_count() {
        assert_eq!(xlogy(0.0, 0.0), 0.0);
        assert_eq!(xlogy(2.0, 0.0), f64::NEG_INFINITY);
        assert_relative_eq!(xlogy(3.0, 2.0), 3.0 * 2.0_f64.ln());
    }

    #[test]
    // Purpose
    // -------
    // Streaming accumulation matches `ln Σ exp` on a safe grid and stays
    // finite where the naive formula overflows.
    //
    // Given
    // -----
    // - Terms `[-1, 0.5, 2]` and a shifted copy offset by +1000.
    //
    // Expect
    // ------
    // - The shifted result equals the unshifted result plus 1000.
    fn log_sum_exp_matches_naive_and_survives_overflow() {
        // Arrange
        let terms = [-1.0, 0.5, 2.0];
        let naive: f64 = terms.iter().map(|t: &f64| t.exp()).sum::<f64>().ln();

        // Act
        let mut acc = LogSumExp::new();
        let mut shifted = LogSumExp::new();
        for &t in &terms {
            acc.push(t);
            shifted.push(t + 1000.0);
        }
        acc.push(f64::NEG_INFINITY);

        // Assert
        assert_relative_eq!(acc.value(), naive, epsilon = 1e-12);
        assert_relative_eq!(shifted.value(), naive + 1000.0, epsilon = 1e-9);
        assert_eq!(LogSumExp::new().value(), f64::NEG_INFINITY);
    }
}
