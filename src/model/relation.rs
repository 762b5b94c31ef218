//! Two-detector Poisson relation: shared burst rate plus independent
//! backgrounds.
//!
//! Purpose
//! -------
//! Describe how the counts of two detectors relate bin by bin when both see
//! the same burst: detector 1 records background `b1` plus a fraction `a` of
//! a shared, unknown source rate `λ`; detector 2 records background `b2`
//! plus the complementary fraction `p = 1 - a`. The split follows from the
//! sensitivity ratio `r` of detector 2 to detector 1: `a = 1 / (1 + r)`,
//! `p = r / (1 + r)`.
//!
//! Key behaviors
//! -------------
//! - [`DetectorRelation::from_counts`] estimates `r` from the excess of the
//!   observed counts over the expected background in a common interval and
//!   converts mean background rates into per-bin rates.
//! - [`DetectorRelation::log_likelihood`] scores a pair of aligned histograms
//!   by marginalizing `λ` in every bin under the weight `exp(-(s - 1) λ)`,
//!   where `s >= 1` is the source-suppression factor:
//!
//!   `L(n, m) = e^{-(b1+b2)} / (n! m!) ·
//!              Σ_{i<=n, j<=m} C(n,i) C(m,j) b1^{n-i} a^i b2^{m-j} p^j (i+j)! / s^{i+j+1}`
//!
//!   evaluated in log space. The double sum is truncated once a scan has
//!   passed its largest term and the current term falls below
//!   `rel_precision / (count + 1)` of it.
//!
//! Invariants & assumptions
//! ------------------------
//! - Per-bin backgrounds are finite and `>= 0`; `r > 0`; `s >= 1`.
//! - Histogram entries are non-negative integer counts stored as `f64`.
//! - Instances are immutable; nuisance variants are new values built with
//!   [`DetectorRelation::with_nuisance`].
//!
//! Testing notes
//! -------------
//! - Unit tests check the closed-form single-event case, agreement between
//!   truncated and exhaustive sums, `from_counts` arithmetic, and that the
//!   score of a histogram pair is maximized when the pair is aligned.
use crate::{
    model::{
        context::ComputeContext,
        errors::{ModelError, ModelResult},
    },
    numerics::special::{LogSumExp, xlogy},
};
use ndarray::ArrayView1;

/// `DetectorRelation` — backgrounds, sensitivity split, and suppression for
/// one detector pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorRelation {
    bin_background_rates: (f64, f64),
    sensitivity_ratio_2_to_1: f64,
    source_suppression: f64,
}

impl DetectorRelation {
    /// Construct from per-bin background rates, the detector-2-to-1
    /// sensitivity ratio, and the source-suppression factor.
    ///
    /// Errors
    /// ------
    /// - `ModelError::InvalidBackground` for negative or non-finite rates.
    /// - `ModelError::InvalidSensitivityRatio` for `ratio <= 0` or non-finite.
    /// - `ModelError::InvalidSuppression` for `suppression < 1` or non-finite.
    pub fn new(
        bin_background_rates: (f64, f64), sensitivity_ratio_2_to_1: f64, source_suppression: f64,
    ) -> ModelResult<Self> {
        let (b1, b2) = bin_background_rates;
        for (detector, value) in [(1, b1), (2, b2)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::InvalidBackground { detector, value });
            }
        }
        if !sensitivity_ratio_2_to_1.is_finite() || sensitivity_ratio_2_to_1 <= 0.0 {
            return Err(ModelError::InvalidSensitivityRatio { value: sensitivity_ratio_2_to_1 });
        }
        if !source_suppression.is_finite() || source_suppression < 1.0 {
            return Err(ModelError::InvalidSuppression { value: source_suppression });
        }
        Ok(Self { bin_background_rates, sensitivity_ratio_2_to_1, source_suppression })
    }

    /// Build a relation from observed counts over a common interval.
    ///
    /// Parameters
    /// ----------
    /// - `bg1`, `bg2`: mean background rates (events per unit time).
    /// - `n1`, `n2`: events counted by each detector over `duration`.
    /// - `duration`: length of the counting interval, `> 0`.
    /// - `bin_width`: histogram bin width, `> 0`; converts rates to per-bin.
    /// - `suppression`: source-suppression factor, `>= 1`.
    ///
    /// Notes
    /// -----
    /// - The sensitivity ratio is `max(n2 - bg2·T, 1) / max(n1 - bg1·T, 1)`,
    ///   so a detector with no visible excess still yields a finite ratio.
    pub fn from_counts(
        bg1: f64, bg2: f64, n1: usize, n2: usize, duration: f64, bin_width: f64, suppression: f64,
    ) -> ModelResult<Self> {
        for (name, value) in [("duration", duration), ("bin width", bin_width)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ModelError::InvalidInterval { name, value });
            }
        }
        for (detector, value) in [(1, bg1), (2, bg2)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::InvalidBackground { detector, value });
            }
        }
        let excess_1 = (n1 as f64 - bg1 * duration).max(1.0);
        let excess_2 = (n2 as f64 - bg2 * duration).max(1.0);
        Self::new((bg1 * bin_width, bg2 * bin_width), excess_2 / excess_1, suppression)
    }

    /// Copy of this relation with replaced backgrounds and ratio (same
    /// suppression), used when nuisance parameters are searched jointly.
    pub fn with_nuisance(&self, b1: f64, b2: f64, ratio: f64) -> ModelResult<Self> {
        Self::new((b1, b2), ratio, self.source_suppression)
    }

    pub fn bin_background_rates(&self) -> (f64, f64) {
        self.bin_background_rates
    }

    pub fn sensitivity_ratio_2_to_1(&self) -> f64 {
        self.sensitivity_ratio_2_to_1
    }

    pub fn source_suppression(&self) -> f64 {
        self.source_suppression
    }

    /// Fractions `(a, p)` of the shared rate seen by detectors 1 and 2.
    pub fn split_fractions(&self) -> (f64, f64) {
        let a = 1.0 / (1.0 + self.sensitivity_ratio_2_to_1);
        (a, 1.0 - a)
    }

    /// Log-likelihood of two aligned histograms.
    ///
    /// Parameters
    /// ----------
    /// - `ctx`: log-factorial cache.
    /// - `hist_1`, `hist_2`: counts per bin for detectors 1 and 2.
    /// - `rel_precision`: truncation tolerance in `(0, 1)` for the per-bin
    ///   series.
    ///
    /// Errors
    /// ------
    /// - `ModelError::HistogramLengthMismatch` for unequal lengths.
    /// - `ModelError::InvalidCount` for negative or non-finite entries.
    /// - `ModelError::InvalidPrecision` for `rel_precision` outside `(0, 1)`.
    pub fn log_likelihood(
        &self, ctx: &ComputeContext, hist_1: ArrayView1<'_, f64>, hist_2: ArrayView1<'_, f64>,
        rel_precision: f64,
    ) -> ModelResult<f64> {
        if hist_1.len() != hist_2.len() {
            return Err(ModelError::HistogramLengthMismatch {
                reference: hist_1.len(),
                shifted: hist_2.len(),
            });
        }
        if !rel_precision.is_finite() || rel_precision <= 0.0 || rel_precision >= 1.0 {
            return Err(ModelError::InvalidPrecision { value: rel_precision });
        }
        let mut total = 0.0;
        for (index, (&h1, &h2)) in hist_1.iter().zip(hist_2.iter()).enumerate() {
            let n = count_of(index, h1)?;
            let m = count_of(index, h2)?;
            total += self.bin_log_likelihood(ctx, n, m, rel_precision);
        }
        Ok(total)
    }

    /// Log-likelihood of a single bin with counts `n` (detector 1) and `m`
    /// (detector 2). `rel_precision` is assumed valid.
    pub fn bin_log_likelihood(
        &self, ctx: &ComputeContext, n: usize, m: usize, rel_precision: f64,
    ) -> f64 {
        let (b1, b2) = self.bin_background_rates;
        let (a, p) = self.split_fractions();
        let ln_s = self.source_suppression.ln();
        let ln_tol = rel_precision.ln();
        let row_cut = ln_tol - ((n + 1) as f64).ln();
        let col_cut = ln_tol - ((m + 1) as f64).ln();

        let mut marginal = LogSumExp::new();
        let mut best_row = f64::NEG_INFINITY;
        for i in 0..=n {
            let prefix = ctx.ln_binomial(n, i) + xlogy((n - i) as f64, b1) + xlogy(i as f64, a);
            if prefix == f64::NEG_INFINITY {
                continue;
            }

            let mut row = LogSumExp::new();
            let mut best_term = f64::NEG_INFINITY;
            for j in 0..=m {
                let k = i + j;
                let term = prefix
                    + ctx.ln_binomial(m, j)
                    + xlogy((m - j) as f64, b2)
                    + xlogy(j as f64, p)
                    + ctx.ln_factorial(k)
                    - (k + 1) as f64 * ln_s;
                if term == f64::NEG_INFINITY {
                    continue;
                }
                row.push(term);
                if term > best_term {
                    best_term = term;
                } else if term - best_term < col_cut {
                    break;
                }
            }

            let row_value = row.value();
            marginal.push(row_value);
            if row_value > best_row {
                best_row = row_value;
            } else if row_value - best_row < row_cut {
                break;
            }
        }

        -(b1 + b2) - ctx.ln_factorial(n) - ctx.ln_factorial(m) + marginal.value()
    }
}

pub(crate) fn count_of(index: usize, value: f64) -> ModelResult<usize> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::InvalidCount { index, value });
    }
    Ok(value.round() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction validation and `from_counts` arithmetic.
    // - The exact marginal likelihood on hand-computable bins.
    // - Truncation accuracy against a tight-precision reference.
    // - Histogram-level scoring and its input validation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `from_counts` converts mean rates to per-bin rates and forms the
    // excess-count ratio.
    //
    // Given
    // -----
    // - bg = (2, 1) per second, counts (30, 60) over 10 s, bins of 0.01 s.
    //
    // Expect
    // ------
    // - Per-bin rates (0.02, 0.01); ratio (60 - 10) / (30 - 20) = 5.
    fn from_counts_builds_rates_and_ratio() {
        let rel = DetectorRelation::from_counts(2.0, 1.0, 30, 60, 10.0, 0.01, 1.0).unwrap();

        let (b1, b2) = rel.bin_background_rates();
        assert_relative_eq!(b1, 0.02);
        assert_relative_eq!(b2, 0.01);
        assert_relative_eq!(rel.sensitivity_ratio_2_to_1(), 5.0);
        let (a, p) = rel.split_fractions();
        assert_relative_eq!(a + p, 1.0);
        assert_relative_eq!(a, 1.0 / 6.0);
    }

    #[test]
    // Purpose
    // -------
    // Excess counts are floored at 1 so background-dominated detectors keep a
    // finite, positive ratio.
    fn from_counts_floors_negative_excess() {
        let rel = DetectorRelation::from_counts(10.0, 0.0, 3, 4, 1.0, 0.1, 1.0).unwrap();

        assert_relative_eq!(rel.sensitivity_ratio_2_to_1(), 4.0);
    }

    #[test]
    // Purpose
    // -------
    // Invalid parameters are rejected with the specific variant.
    fn new_rejects_invalid_parameters() {
        assert_eq!(
            DetectorRelation::new((-1.0, 0.0), 1.0, 1.0).unwrap_err(),
            ModelError::InvalidBackground { detector: 1, value: -1.0 }
        );
        assert_eq!(
            DetectorRelation::new((0.0, 0.0), 0.0, 1.0).unwrap_err(),
            ModelError::InvalidSensitivityRatio { value: 0.0 }
        );
        assert_eq!(
            DetectorRelation::new((0.0, 0.0), 1.0, 0.5).unwrap_err(),
            ModelError::InvalidSuppression { value: 0.5 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Check the exact marginal on bins small enough to expand by hand.
    //
    // Given
    // -----
    // - b1 = 0.3, b2 = 0.2, r = 1 (a = p = 0.5), s = 1.
    //
    // Expect
    // ------
    // - (n, m) = (0, 0): L = e^{-(b1+b2)}.
    // - (n, m) = (1, 0): L = e^{-(b1+b2)} (b1 + a).
    // - (n, m) = (1, 1): L = e^{-(b1+b2)} (b1 b2 + b1 p + a b2 + 2 a p).
    fn bin_log_likelihood_matches_hand_expansion() {
        // Arrange
        let ctx = ComputeContext::new();
        let rel = DetectorRelation::new((0.3, 0.2), 1.0, 1.0).unwrap();
        let base = -(0.3 + 0.2);

        // Act
        let l00 = rel.bin_log_likelihood(&ctx, 0, 0, 1e-12);
        let l10 = rel.bin_log_likelihood(&ctx, 1, 0, 1e-12);
        let l11 = rel.bin_log_likelihood(&ctx, 1, 1, 1e-12);

        // Assert
        assert_relative_eq!(l00, base, epsilon = 1e-12);
        assert_relative_eq!(l10, base + (0.3_f64 + 0.5).ln(), epsilon = 1e-12);
        let expected_11 = 0.3 * 0.2 + 0.3 * 0.5 + 0.5 * 0.2 + 2.0 * 0.5 * 0.5;
        assert_relative_eq!(l11, base + f64::ln(expected_11), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Suppression divides each term by s^{k+1}.
    //
    // Given
    // -----
    // - Zero backgrounds, s = 2, (n, m) = (1, 0).
    //
    // Expect
    // ------
    // - L = a · 1! / 2^2.
    fn suppression_scales_source_terms() {
        let ctx = ComputeContext::new();
        let rel = DetectorRelation::new((0.0, 0.0), 3.0, 2.0).unwrap();

        let l = rel.bin_log_likelihood(&ctx, 1, 0, 1e-12);

        assert_relative_eq!(l, (0.25_f64 / 4.0).ln(), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The default truncation tolerance stays close to the exhaustive sum on
    // a busy bin.
    //
    // Given
    // -----
    // - b1 = b2 = 1.5, r = 1.3, counts (25, 30).
    //
    // Expect
    // ------
    // - |ℓ(1e-2) - ℓ(1e-15)| < 0.025 (two nested 1% truncations).
    fn truncated_sum_is_close_to_exhaustive() {
        let ctx = ComputeContext::new();
        let rel = DetectorRelation::new((1.5, 1.5), 1.3, 1.0).unwrap();

        let coarse = rel.bin_log_likelihood(&ctx, 25, 30, 1e-2);
        let exact = rel.bin_log_likelihood(&ctx, 25, 30, 1e-15);

        assert!(coarse.is_finite() && exact.is_finite());
        assert!((coarse - exact).abs() < 0.025, "coarse {coarse} vs exact {exact}");
    }

    #[test]
    // Purpose
    // -------
    // Aligned histograms score higher than misaligned ones.
    //
    // Given
    // -----
    // - hist_1 = [0, 5, 0, 0]; hist_2 aligned = [0, 5, 0, 0], shifted =
    //   [0, 0, 5, 0]; small backgrounds.
    //
    // Expect
    // ------
    // - ℓ(aligned) > ℓ(shifted).
    fn log_likelihood_prefers_aligned_histograms() {
        let ctx = ComputeContext::new();
        let rel = DetectorRelation::new((0.01, 0.01), 1.0, 1.0).unwrap();
        let h1 = array![0.0, 5.0, 0.0, 0.0];
        let aligned = array![0.0, 5.0, 0.0, 0.0];
        let shifted = array![0.0, 0.0, 5.0, 0.0];

        let l_aligned = rel.log_likelihood(&ctx, h1.view(), aligned.view(), 1e-2).unwrap();
        let l_shifted = rel.log_likelihood(&ctx, h1.view(), shifted.view(), 1e-2).unwrap();

        assert!(l_aligned > l_shifted);
    }

    #[test]
    // Purpose
    // -------
    // Malformed histogram inputs surface as errors.
    fn log_likelihood_validates_inputs() {
        let ctx = ComputeContext::new();
        let rel = DetectorRelation::new((0.1, 0.1), 1.0, 1.0).unwrap();
        let h = array![1.0, 2.0];

        assert_eq!(
            rel.log_likelihood(&ctx, h.view(), array![1.0].view(), 1e-2).unwrap_err(),
            ModelError::HistogramLengthMismatch { reference: 2, shifted: 1 }
        );
        assert_eq!(
            rel.log_likelihood(&ctx, h.view(), array![1.0, -1.0].view(), 1e-2).unwrap_err(),
            ModelError::InvalidCount { index: 1, value: -1.0 }
        );
        assert_eq!(
            rel.log_likelihood(&ctx, h.view(), h.view(), 0.0).unwrap_err(),
            ModelError::InvalidPrecision { value: 0.0 }
        );
    }
}
