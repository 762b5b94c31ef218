//! PolynomialCumulativeEst: quantiles of a polynomial fit to the density.
//!
//! Purpose
//! -------
//! Smooth the likelihood density `exp(y - max)` with a polynomial, integrate
//! it analytically, and read the median and one-sigma quantiles off the
//! integral.
//!
//! Key behaviors
//! -------------
//! - The fit runs in `[-1, 1]` window coordinates with uniform weights; the
//!   degree is capped at `n_points - 1`.
//! - [`QuantileMethod::Resample`] (default) evaluates the normalized
//!   integral on a fine grid and reuses the cumulative-probability
//!   interpolation.
//! - [`QuantileMethod::RootSolve`] solves `C(u) = level` directly and fails
//!   unless each level has exactly one root inside the window.
//! - A fitted density that dips below zero on the mesh is logged; the
//!   cumulative curve is then non-monotone and the first crossing is used.
use crate::{
    estimators::{
        cum_prob::{ONE_SIDED_MASS, quantile_estimate},
        errors::{EstimatorError, EstimatorResult},
        estimator::LagEstimator,
        poly_fit::DEFAULT_POLY_DEGREE,
        types::{PartialEstimate, Spread},
    },
    numerics::polynomial::{DomainMap, Polynomial, fit_polynomial},
};
use ndarray::{Array1, ArrayView1};
use tracing::warn;

pub const DEFAULT_RESAMPLE_POINTS: usize = 2001;

/// How quantiles are read off the integrated fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantileMethod {
    Resample { points: usize },
    RootSolve,
}

impl Default for QuantileMethod {
    fn default() -> Self {
        QuantileMethod::Resample { points: DEFAULT_RESAMPLE_POINTS }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolyCum {
    degree: usize,
    method: QuantileMethod,
}

impl PolyCum {
    /// Errors
    /// ------
    /// - `EstimatorError::InvalidOption` for `degree == 0` or fewer than two
    ///   resampling points.
    pub fn new(degree: usize, method: QuantileMethod) -> EstimatorResult<Self> {
        if degree == 0 {
            return Err(EstimatorError::InvalidOption {
                name: "poly_degree",
                value: 0.0,
                reason: "The density fit needs at least a linear term.",
            });
        }
        if let QuantileMethod::Resample { points } = method {
            if points < 2 {
                return Err(EstimatorError::InvalidOption {
                    name: "resample_points",
                    value: points as f64,
                    reason: "Resampling needs at least two points.",
                });
            }
        }
        Ok(Self { degree, method })
    }

    pub fn method(&self) -> QuantileMethod {
        self.method
    }
}

impl Default for PolyCum {
    fn default() -> Self {
        Self { degree: DEFAULT_POLY_DEGREE, method: QuantileMethod::default() }
    }
}

impl LagEstimator for PolyCum {
    fn name(&self) -> &'static str {
        "poly_cum"
    }

    fn estimate(
        &self, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<PartialEstimate> {
        let n = lags.len();
        let map = DomainMap::from_domain(lags[0], lags[n - 1]);
        let u: Array1<f64> = lags.mapv(|x| map.to_window(x));
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let density = values.mapv(|v| (v - max).exp());
        let poly = fit_polynomial(u.view(), density.view(), Array1::ones(n).view(), self.degree.min(n - 1))?;

        let min_fitted = u.iter().map(|&x| poly.eval(x)).fold(f64::INFINITY, f64::min);
        if min_fitted < 0.0 {
            warn!(min_fitted, "fitted likelihood density is negative on the mesh");
        }

        let integral = poly.integ();
        let base = integral.eval(-1.0);
        let total = integral.eval(1.0) - base;
        if !(total > 0.0 && total.is_finite()) {
            return Err(EstimatorError::FitFailed {
                strategy: "poly_cum",
                reason: format!("Integrated density fit is {total}."),
            });
        }

        match self.method {
            QuantileMethod::Resample { points } => {
                let grid = Array1::linspace(-1.0, 1.0, points);
                let mut cum = grid.mapv(|x| (integral.eval(x) - base) / total);
                cum[0] = 0.0;
                cum[points - 1] = 1.0;
                let grid_lags = grid.mapv(|x| map.to_domain(x));
                Ok(quantile_estimate(grid_lags.view(), cum.view()))
            }
            QuantileMethod::RootSolve => {
                let level = |p: f64| -> EstimatorResult<f64> {
                    let mut shifted = integral.coeffs().to_vec();
                    shifted[0] -= base + p * total;
                    match Polynomial::new(shifted).real_roots_in(-1.0, 1.0).as_slice() {
                        [root] => Ok(map.to_domain(*root)),
                        roots => Err(EstimatorError::FitFailed {
                            strategy: "poly_cum",
                            reason: format!("{} roots for cumulative level {p}.", roots.len()),
                        }),
                    }
                };
                let low = level(0.5 - ONE_SIDED_MASS)?;
                let median = level(0.5)?;
                let high = level(0.5 + ONE_SIDED_MASS)?;
                Ok(PartialEstimate::with_std_dev(median, Spread::Asymmetric {
                    low: median - low,
                    high: high - median,
                }))
            }
        }
    }
}
