//! WeightedMeanVarianceEst: first and regional second moments of the
//! likelihood-weighted lag distribution.
//!
//! Key behaviors
//! -------------
//! - Density `p ∝ exp(y - max)` normalized by its trapezium integral.
//! - `dt = ∫ x p dx`.
//! - Below and above `dt` separately: `var_side = ∫ (x - dt)² p dx / ∫ p dx`
//!   over the mesh points on that side, floored at `f64::EPSILON`. The
//!   renormalization by the side's mass makes each side the variance of a
//!   half-distribution rather than half of it.
//!
//! The moment helper is shared with the post-hoc analysis of annealing
//! trials, whose lags may repeat.
use crate::{
    estimators::{
        errors::{EstimatorError, EstimatorResult},
        estimator::LagEstimator,
        types::{PartialEstimate, Spread},
    },
    numerics::quadrature::trapezoid,
};
use ndarray::{Array1, ArrayView1};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeanVar;

/// `(mean, var_low, var_high)` of the density `exp(values - max)` over
/// `lags`.
///
/// Errors
/// ------
/// - `EstimatorError::FitFailed` when the density integrates to a
///   non-positive or non-finite value.
pub(crate) fn weighted_moments(
    lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
) -> EstimatorResult<(f64, f64, f64)> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let density = values.mapv(|v| (v - max).exp());
    let norm = trapezoid(lags, density.view());
    if !(norm > 0.0 && norm.is_finite()) {
        return Err(EstimatorError::FitFailed {
            strategy: "mean_var",
            reason: format!("Integrated density is {norm}."),
        });
    }
    let p = density / norm;
    let mean = trapezoid(lags, (&lags * &p).view());

    let side_var = |keep: &dyn Fn(f64) -> bool| {
        let (x, w): (Vec<f64>, Vec<f64>) =
            lags.iter().zip(p.iter()).filter(|(x, _)| keep(**x)).map(|(&x, &w)| (x, w)).unzip();
        let (x, w) = (Array1::from(x), Array1::from(w));
        let mass = trapezoid(x.view(), w.view());
        let moment = trapezoid(x.view(), (x.mapv(|v| (v - mean).powi(2)) * &w).view());
        let var = moment / mass;
        if var.is_finite() { var.max(f64::EPSILON) } else { f64::EPSILON }
    };
    let var_low = side_var(&|x| x < mean);
    let var_high = side_var(&|x| x > mean);
    Ok((mean, var_low, var_high))
}

impl LagEstimator for MeanVar {
    fn name(&self) -> &'static str {
        "mean_var"
    }

    fn estimate(
        &self, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<PartialEstimate> {
        let (mean, low, high) = weighted_moments(lags, values)?;
        Ok(PartialEstimate::with_variance(mean, Spread::Asymmetric { low, high }))
    }
}
