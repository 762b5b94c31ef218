//! PolynomialPeakFit: peak of a least-squares polynomial fit.
//!
//! Purpose
//! -------
//! Smooth a noisy likelihood mesh with a global polynomial and read the lag
//! and its Fisher-information error off the fitted curve.
//!
//! Key behaviors
//! -------------
//! - The mesh is mapped onto `[-1, 1]` before fitting; the degree is capped
//!   at `n_points - 1`.
//! - Candidate peaks are the real roots of the derivative inside the window.
//!   Without any, the two window edges are the candidates. The candidate
//!   with the largest fitted value wins.
//! - `var = 1 / |f''(dt)|`. A non-negative curvature at the chosen point is
//!   a model-invariant violation: logged, not fatal.
use crate::{
    estimators::{
        errors::{EstimatorError, EstimatorResult},
        estimator::LagEstimator,
        types::{LikelihoodFit, PartialEstimate, Spread},
    },
    numerics::{
        polynomial::{DomainMap, MappedPolynomial, Polynomial, fit_polynomial},
        weights::CurveWeights,
    },
};
use ndarray::{Array1, ArrayView1};
use tracing::warn;

pub const DEFAULT_POLY_DEGREE: usize = 10;

/// Polynomial peak fit options.
///
/// - `degree`: nominal fit degree (at least 2).
/// - `weights`: point weighting for the least-squares fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolyFit {
    degree: usize,
    weights: CurveWeights,
}

impl PolyFit {
    /// Errors
    /// ------
    /// - `EstimatorError::InvalidOption` when `degree < 2`.
    pub fn new(degree: usize, weights: CurveWeights) -> EstimatorResult<Self> {
        if degree < 2 {
            return Err(EstimatorError::InvalidOption {
                name: "poly_degree",
                value: degree as f64,
                reason: "A peak fit needs at least a quadratic.",
            });
        }
        Ok(Self { degree, weights })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn weights(&self) -> CurveWeights {
        self.weights
    }
}

impl Default for PolyFit {
    fn default() -> Self {
        Self { degree: DEFAULT_POLY_DEGREE, weights: CurveWeights::Uniform }
    }
}

impl LagEstimator for PolyFit {
    fn name(&self) -> &'static str {
        "poly_fit"
    }

    fn estimate(
        &self, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<PartialEstimate> {
        let n = lags.len();
        let map = DomainMap::from_domain(lags[0], lags[n - 1]);
        let u: Array1<f64> = lags.mapv(|x| map.to_window(x));
        let w = self.weights.weights(values);
        let poly = fit_polynomial(u.view(), values, w.view(), self.degree.min(n - 1))?;

        let (u_peak, _) = find_peak(&poly, -1.0, 1.0);
        let fit = MappedPolynomial::new(poly, map);
        let dt = map.to_domain(u_peak);
        let curvature = fit.second_derivative(dt);
        if curvature >= 0.0 {
            warn!(dt, curvature, "polynomial fit has no maximum at the chosen peak");
        }
        Ok(PartialEstimate::with_variance(dt, Spread::Symmetric(1.0 / curvature.abs()))
            .fit(LikelihoodFit::Polynomial(fit)))
    }
}

/// Highest point of `poly` among the stationary points in `[lo, hi]`, or the
/// interval ends when there are none.
pub(crate) fn find_peak(poly: &Polynomial, lo: f64, hi: f64) -> (f64, f64) {
    let mut candidates = poly.deriv().real_roots_in(lo, hi);
    if candidates.is_empty() {
        candidates = vec![lo, hi];
    }
    candidates.into_iter().map(|x| (x, poly.eval(x))).fold((lo, f64::NEG_INFINITY), |best, c| {
        if c.1 > best.1 { c } else { best }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact recovery of a parabola's peak and curvature.
    // - Edge fallback on a monotone curve.
    // - Option validation.
    // -------------------------------------------------------------------------

    fn parabola(peak: f64, var: f64) -> (Array1<f64>, Array1<f64>) {
        let lags = Array1::linspace(-0.1, 0.1, 41);
        let values = lags.mapv(|x: f64| 3.0 - (x - peak).powi(2) / (2.0 * var));
        (lags, values)
    }

    #[test]
    // Purpose
    // -------
    // A degree-10 fit of an exact parabola recovers its peak and variance.
    //
    // Given
    // -----
    // - y = 3 - (x - 0.013)² / (2 · 4e-4) on 41 points in [-0.1, 0.1].
    //
    // Expect
    // ------
    // - dt ≈ 0.013, var ≈ 4e-4, symmetric error.
    fn recovers_parabola_peak_and_variance() {
        // Arrange
        let (lags, values) = parabola(0.013, 4e-4);

        // Act
        let est = PolyFit::default().estimate_lag(lags.view(), values.view()).unwrap();

        // Assert
        assert_relative_eq!(est.dt, 0.013, epsilon = 1e-6);
        assert!(est.var.is_symmetric());
        assert_relative_eq!(est.var.low(), 4e-4, max_relative = 1e-4);
        assert!(matches!(est.like_fit, Some(LikelihoodFit::Polynomial(_))));
    }

    #[test]
    // Purpose
    // -------
    // A straight line has no stationary point; the higher window edge wins.
    fn monotone_curve_falls_back_to_edge() {
        let lags = Array1::linspace(0.0, 1.0, 11);
        let values = lags.mapv(|x| 2.0 * x);

        let est = PolyFit::new(2, CurveWeights::Uniform)
            .unwrap()
            .estimate_lag(lags.view(), values.view())
            .unwrap();

        assert_relative_eq!(est.dt, 1.0, epsilon = 1e-9);
        assert!(!est.used_default);
    }

    #[test]
    // Purpose
    // -------
    // Degrees below two are rejected.
    fn rejects_linear_degree() {
        assert!(matches!(
            PolyFit::new(1, CurveWeights::Exp),
            Err(EstimatorError::InvalidOption { name: "poly_degree", .. })
        ));
    }
}
