//! GaussianSmoothedEst: local maximum of a kernel-smoothed likelihood.
//!
//! Purpose
//! -------
//! Suppress mesh-scale noise by replacing the likelihood mesh with a
//! Gaussian-weighted average, then locate its maximum with a bounded Brent
//! search.
//!
//! Key behaviors
//! -------------
//! - `S(x) = Σ w_i(x) y_i / Σ w_i(x)` with `w_i = exp(-((x - l_i)/width)² / 2)`.
//!   Weights are computed relative to the nearest lag, so `S` stays finite
//!   far from the mesh.
//! - The search interval is `argmax ± 3 · width`, clipped to the mesh.
//! - `var = 1 / |S''(dt)|` from the analytic second derivative. A
//!   non-negative `S''` at the optimum is logged.
//! - Default width: twice the median mesh step.
use crate::{
    estimators::{
        base::argmax,
        errors::{EstimatorError, EstimatorResult},
        estimator::LagEstimator,
        types::{LikelihoodFit, PartialEstimate, Spread},
    },
    optimization::scalar_search::maximize_scalar,
};
use ndarray::{Array1, ArrayView1};
use tracing::warn;

/// Half-width of the search neighbourhood, in kernel widths.
pub const SEARCH_WIDTHS: f64 = 3.0;
/// Default kernel width, in median mesh steps.
pub const DEFAULT_WIDTH_STEPS: f64 = 2.0;
pub const DEFAULT_BRENT_ITERS: u64 = 200;

/// Gaussian-kernel average of a likelihood mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianSmoother {
    lags: Array1<f64>,
    values: Array1<f64>,
    width: f64,
}

impl GaussianSmoother {
    pub fn new(lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>, width: f64) -> Self {
        Self { lags: lags.to_owned(), values: values.to_owned(), width }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn eval(&self, lag: f64) -> f64 {
        self.moments(lag).0
    }

    /// Second derivative of the smoothed curve at `lag`.
    pub fn second_derivative(&self, lag: f64) -> f64 {
        self.moments(lag).2
    }

    // (S, S', S'') from the weighted sums Σw, Σw·a, Σw·(a² - 1/width²) with
    // a = -(x - l) / width².
    fn moments(&self, x: f64) -> (f64, f64, f64) {
        let inv_w2 = 1.0 / (self.width * self.width);
        let exponent = |l: f64| 0.5 * (x - l).powi(2) * inv_w2;
        let shift = self.lags.iter().map(|&l| exponent(l)).fold(f64::INFINITY, f64::min);

        let (mut d0, mut d1, mut d2) = (0.0, 0.0, 0.0);
        let (mut n0, mut n1, mut n2) = (0.0, 0.0, 0.0);
        for (&l, &y) in self.lags.iter().zip(self.values.iter()) {
            let w = (shift - exponent(l)).exp();
            let a = -(x - l) * inv_w2;
            let b = a * a - inv_w2;
            d0 += w;
            d1 += w * a;
            d2 += w * b;
            n0 += w * y;
            n1 += w * a * y;
            n2 += w * b * y;
        }
        let s = n0 / d0;
        let s1 = (n1 - s * d1) / d0;
        let s2 = (n2 - 2.0 * s1 * d1 - s * d2) / d0;
        (s, s1, s2)
    }
}

/// Gaussian-smoothed peak search options.
///
/// - `width`: kernel width in lag units; `None` picks twice the median
///   mesh step.
/// - `max_iters`: Brent iteration cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussSmooth {
    width: Option<f64>,
    max_iters: u64,
}

impl GaussSmooth {
    /// Errors
    /// ------
    /// - `EstimatorError::InvalidOption` for a non-positive or non-finite
    ///   width, or `max_iters == 0`.
    pub fn new(width: Option<f64>, max_iters: u64) -> EstimatorResult<Self> {
        if let Some(w) = width {
            if !(w > 0.0 && w.is_finite()) {
                return Err(EstimatorError::InvalidOption {
                    name: "gauss_width",
                    value: w,
                    reason: "Kernel width must be positive and finite.",
                });
            }
        }
        if max_iters == 0 {
            return Err(EstimatorError::InvalidOption {
                name: "max_iters",
                value: 0.0,
                reason: "At least one iteration is required.",
            });
        }
        Ok(Self { width, max_iters })
    }

    fn width_for(&self, lags: ArrayView1<'_, f64>) -> f64 {
        self.width.unwrap_or_else(|| {
            let mut steps: Vec<f64> = lags.windows(2).into_iter().map(|w| w[1] - w[0]).collect();
            steps.sort_by(|a, b| a.total_cmp(b));
            DEFAULT_WIDTH_STEPS * steps[steps.len() / 2]
        })
    }
}

impl Default for GaussSmooth {
    fn default() -> Self {
        Self { width: None, max_iters: DEFAULT_BRENT_ITERS }
    }
}

impl LagEstimator for GaussSmooth {
    fn name(&self) -> &'static str {
        "gauss_smooth"
    }

    fn estimate(
        &self, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<PartialEstimate> {
        let width = self.width_for(lags);
        let smoother = GaussianSmoother::new(lags, values, width);
        let start = lags[argmax(values)];
        let lower = (start - SEARCH_WIDTHS * width).max(lags[0]);
        let upper = (start + SEARCH_WIDTHS * width).min(lags[lags.len() - 1]);

        let outcome = maximize_scalar(&|x| Ok(smoother.eval(x)), lower, upper, self.max_iters)?;
        let curvature = smoother.second_derivative(outcome.x);
        if curvature >= 0.0 {
            warn!(dt = outcome.x, curvature, "smoothed likelihood has no maximum at the optimum");
        }
        Ok(PartialEstimate::with_variance(outcome.x, Spread::Symmetric(1.0 / curvature.abs()))
            .fit(LikelihoodFit::GaussianSmoothed(smoother)))
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
    // - Analytic derivatives of the smoother against finite differences.
    // - Peak and curvature recovery on a parabola.
    // - Finite evaluation far from the mesh.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The analytic second derivative matches a central difference of `eval`.
    fn second_derivative_matches_finite_difference() {
        // Arrange
        let lags = Array1::linspace(-1.0, 1.0, 9);
        let values = array![0.0, 1.0, 1.5, 3.0, 2.0, 2.5, 1.0, 0.0, -1.0];
        let smoother = GaussianSmoother::new(lags.view(), values.view(), 0.3);
        let (x, h) = (0.17, 1e-4);

        // Act
        let analytic = smoother.second_derivative(x);
        let numeric = (smoother.eval(x + h) - 2.0 * smoother.eval(x) + smoother.eval(x - h)) / (h * h);

        // Assert
        assert_relative_eq!(analytic, numeric, max_relative = 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // Smoothing a parabola away from the mesh edges keeps its peak and
    // curvature.
    //
    // Given
    // -----
    // - y = -(x - 0.013)² / (2 · 4e-4) on 201 points in [-0.1, 0.1].
    //
    // Expect
    // ------
    // - dt ≈ 0.013 and var ≈ 4e-4.
    fn smoothed_parabola_keeps_peak_and_curvature() {
        // Arrange
        let lags = Array1::linspace(-0.1, 0.1, 201);
        let values = lags.mapv(|x: f64| -(x - 0.013).powi(2) / (2.0 * 4e-4));

        // Act
        let est = GaussSmooth::default().estimate_lag(lags.view(), values.view()).unwrap();

        // Assert
        assert!(!est.used_default);
        assert_relative_eq!(est.dt, 0.013, epsilon = 1e-5);
        assert_relative_eq!(est.var.low(), 4e-4, max_relative = 1e-3);
    }

    #[test]
    // Purpose
    // -------
    // Far from every mesh point the smoother returns the nearest value
    // instead of 0/0.
    fn eval_is_finite_far_from_mesh() {
        let smoother = GaussianSmoother::new(array![0.0, 1.0].view(), array![2.0, 5.0].view(), 0.01);

        assert_relative_eq!(smoother.eval(100.0), 5.0);
        assert_relative_eq!(smoother.eval(-100.0), 2.0);
    }
}
