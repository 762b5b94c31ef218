//! CumulativeProbabilityEst: median and central interval of the
//! likelihood-weighted lag distribution.
//!
//! The mesh log-likelihoods are turned into a density `exp(y - max)`,
//! integrated with the trapezium rule and normalized so the running
//! integral is exactly 0 at the first lag and exactly 1 at the last. The
//! estimate is the interpolated median; the errors are the distances to the
//! `0.5 ± ONE_SIDED_MASS` levels.
use crate::{
    estimators::{
        errors::{EstimatorError, EstimatorResult},
        estimator::LagEstimator,
        types::{PartialEstimate, Spread},
    },
    numerics::quadrature::{cumulative_trapezoid, inverse_cumulative},
};
use ndarray::{Array1, ArrayView1};
use tracing::warn;

/// Probability mass between the mean and one standard deviation of a
/// normal distribution.
pub const ONE_SIDED_MASS: f64 = 0.341344746069;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CumProb;

/// Normalized running integral of `exp(values - max)` over `lags`.
///
/// Errors
/// ------
/// - `EstimatorError::FitFailed` when the total integral is not positive
///   and finite.
pub fn normalized_cumulative(
    lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
) -> EstimatorResult<Array1<f64>> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let density = values.mapv(|v| (v - max).exp());
    let mut cum = cumulative_trapezoid(lags, density.view());
    let last = cum.len() - 1;
    let total = cum[last];
    if !(total > 0.0 && total.is_finite()) {
        return Err(EstimatorError::FitFailed {
            strategy: "cum_prob",
            reason: format!("Integrated density is {total}."),
        });
    }
    cum /= total;
    cum[last] = 1.0;
    Ok(cum)
}

/// Median and `±ONE_SIDED_MASS` bounds read off a cumulative curve.
pub(crate) fn quantile_estimate(lags: ArrayView1<'_, f64>, cum: ArrayView1<'_, f64>) -> PartialEstimate {
    let low = inverse_cumulative(lags, cum, 0.5 - ONE_SIDED_MASS);
    let median = inverse_cumulative(lags, cum, 0.5);
    let high = inverse_cumulative(lags, cum, 0.5 + ONE_SIDED_MASS);

    let (first, last) = (lags[0], lags[lags.len() - 1]);
    let tol = f64::EPSILON * (last - first);
    if low - first <= tol || last - high <= tol {
        warn!(low, high, first, last, "cumulative bound lies on the edge of the lag mesh");
    }
    PartialEstimate::with_std_dev(median, Spread::Asymmetric {
        low: (median - low).abs(),
        high: (high - median).abs(),
    })
}

impl LagEstimator for CumProb {
    fn name(&self) -> &'static str {
        "cum_prob"
    }

    fn estimate(
        &self, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<PartialEstimate> {
        let cum = normalized_cumulative(lags, values)?;
        Ok(quantile_estimate(lags, cum.view()))
    }
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
    // - Exact 0/1 endpoints of the normalized cumulative curve.
    // - Median and one-sigma bounds of a wide Gaussian.
    // - Uniform likelihood: median at the centre.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The normalized cumulative curve starts at exactly 0 and ends at
    // exactly 1, even with huge log-likelihoods.
    fn cumulative_has_exact_endpoints() {
        let lags = array![-0.3, -0.1, 0.0, 0.2, 0.7];
        let values = array![1.0e4, 1.0e4 + 3.0, 1.0e4 + 1.0, 1.0e4 - 2.0, 1.0e4 + 0.5];

        let cum = normalized_cumulative(lags.view(), values.view()).unwrap();

        assert_eq!(cum[0], 0.0);
        assert_eq!(cum[4], 1.0);
        assert!(cum.windows(2).into_iter().all(|w| w[1] >= w[0]));
    }

    #[test]
    // Purpose
    // -------
    // A finely sampled Gaussian likelihood yields its mean and sigma.
    //
    // Given
    // -----
    // - log L = -(x - 0.01)² / (2 · 0.02²) on 2001 points in [-0.2, 0.2].
    //
    // Expect
    // ------
    // - dt ≈ 0.01, both errors ≈ 0.02.
    fn gaussian_likelihood_gives_mean_and_sigma() {
        // Arrange
        let lags = Array1::linspace(-0.2, 0.2, 2001);
        let values = lags.mapv(|x: f64| -(x - 0.01).powi(2) / (2.0 * 0.02 * 0.02));

        // Act
        let est = CumProb.estimate_lag(lags.view(), values.view()).unwrap();

        // Assert
        assert_relative_eq!(est.dt, 0.01, epsilon = 1e-5);
        assert_relative_eq!(est.dt_err.low(), 0.02, epsilon = 1e-4);
        assert_relative_eq!(est.dt_err.high(), 0.02, epsilon = 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // A flat likelihood puts the median in the centre of the mesh.
    fn flat_likelihood_centres_median() {
        let lags = array![0.0, 1.0, 2.0, 3.0, 4.0];
        let values = array![0.0, 0.0, 0.0, 0.0, 0.0];

        let est = CumProb.estimate_lag(lags.view(), values.view()).unwrap();

        assert_relative_eq!(est.dt, 2.0, epsilon = 1e-12);
        assert_relative_eq!(est.dt_err.low(), 4.0 * ONE_SIDED_MASS, epsilon = 1e-9);
    }
}
