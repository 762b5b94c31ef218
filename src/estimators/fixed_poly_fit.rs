//! FixedPeakPolynomialFit: curvature at the mesh argmax.
//!
//! The point estimate is the mesh argmax itself. A polynomial with powers
//! `0, 2, 3, …, degree` (no linear term) is fitted around it, so the fit is
//! stationary at the argmax by construction, and the error is
//! `sqrt(-1 / (2 c2))` from its quadratic coefficient.
//!
//! A positive `c2` is logged and its magnitude used; an exactly zero `c2`
//! is a fit failure.
use crate::{
    estimators::{
        base::argmax,
        errors::{EstimatorError, EstimatorResult},
        estimator::LagEstimator,
        poly_fit::DEFAULT_POLY_DEGREE,
        types::{LikelihoodFit, PartialEstimate, Spread},
    },
    numerics::{
        polynomial::{DomainMap, MappedPolynomial, Polynomial, fit_power_basis},
        weights::CurveWeights,
    },
};
use ndarray::{Array1, ArrayView1};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPolyFit {
    degree: usize,
    weights: CurveWeights,
}

impl FixedPolyFit {
    /// Errors
    /// ------
    /// - `EstimatorError::InvalidOption` when `degree < 2`.
    pub fn new(degree: usize, weights: CurveWeights) -> EstimatorResult<Self> {
        if degree < 2 {
            return Err(EstimatorError::InvalidOption {
                name: "poly_degree",
                value: degree as f64,
                reason: "The fit needs a quadratic term.",
            });
        }
        Ok(Self { degree, weights })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }
}

impl Default for FixedPolyFit {
    fn default() -> Self {
        Self { degree: DEFAULT_POLY_DEGREE, weights: CurveWeights::Uniform }
    }
}

impl LagEstimator for FixedPolyFit {
    fn name(&self) -> &'static str {
        "fixed_poly_fit"
    }

    fn estimate(
        &self, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<PartialEstimate> {
        let n = lags.len();
        let dt = lags[argmax(values)];
        let map = DomainMap::new(dt, 0.5 * (lags[n - 1] - lags[0]));
        let u: Array1<f64> = lags.mapv(|x| map.to_window(x));

        // `degree` terms: the constant plus powers 2..=degree.
        let degree = self.degree.min(n.max(2));
        let powers: Vec<u32> = std::iter::once(0).chain(2..=degree as u32).collect();
        let w = self.weights.weights(values);
        let coeffs = fit_power_basis(u.view(), values, w.view(), &powers)?;

        let c2 = coeffs[1] / (map.scale() * map.scale());
        if c2 == 0.0 {
            return Err(EstimatorError::FitFailed {
                strategy: "fixed_poly_fit",
                reason: "Quadratic coefficient is zero.".to_string(),
            });
        }
        if c2 > 0.0 {
            warn!(dt, c2, "fixed-peak fit curves upward at the mesh maximum");
        }

        let mut dense = vec![0.0; degree + 1];
        for (&p, &c) in powers.iter().zip(&coeffs) {
            dense[p as usize] = c;
        }
        let fit = MappedPolynomial::new(Polynomial::new(dense), map);
        Ok(PartialEstimate::with_std_dev(dt, Spread::Symmetric((0.5 / c2.abs()).sqrt()))
            .fit(LikelihoodFit::Polynomial(fit)))
    }
}
