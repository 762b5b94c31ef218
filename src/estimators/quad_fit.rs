//! QuadraticCostFit: bounded fit of a three-parameter quadratic template.
//!
//! Purpose
//! -------
//! Fit `f(x) = height - (x - peak)² / (2 var)` to the likelihood mesh under
//! a configurable cost and report the fitted variance directly.
//!
//! Key behaviors
//! -------------
//! - Costs ([`QuadCost`]), with both curves first shifted by
//!   `r = max(max y, max f)`:
//!   - `quad`: `Σ (y - f)²`
//!   - `exp_quad`: `Σ (e^y - e^f)²`
//!   - `sig_quad`: `Σ (y - f)² · σ(max(y, f))`
//! - Bounds, enforced through logistic boxes: `peak ∈ [lo, hi]`,
//!   `var ∈ [floor², span²]` with `floor = ε · span`, and
//!   `height ∈ [min y, max y]`.
//! - `use_raw_peak` pins the peak to the mesh argmax and fits only `var` and
//!   `height`.
//! - Seed: with the peak held fixed the template is linear in `height` and
//!   `1 / var`, so a squared-error fit is solved directly and profiled over
//!   the peak (mesh scan, then Brent between the best point's neighbours).
//! - L-BFGS with finite-difference gradients then polishes the seed under
//!   the configured cost. Its best point is kept even without a tolerance
//!   stop; only a seed that cannot be formed is a fit failure.
use crate::{
    estimators::{
        base::argmax,
        errors::{EstimatorError, EstimatorResult},
        estimator::LagEstimator,
        types::{LikelihoodFit, PartialEstimate, Spread},
    },
    numerics::{errors::NumericsResult, polynomial::fit_power_basis},
    optimization::{
        errors::{OptError, OptResult},
        fit_optimizer::{FitObjective, FitOptions, Theta, polish, validate_theta},
        numerical_stability::transformations::{BoxTransform, safe_logistic},
        scalar_search::{MESH_REFINE_ITERS, maximize_over_mesh},
    },
};
use ndarray::{Array1, ArrayView1};
use std::str::FromStr;
use tracing::debug;

/// Cost comparing the template with the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuadCost {
    #[default]
    Quad,
    ExpQuad,
    SigQuad,
}

impl QuadCost {
    fn term(&self, y: f64, f: f64) -> f64 {
        match self {
            QuadCost::Quad => (y - f).powi(2),
            QuadCost::ExpQuad => (y.exp() - f.exp()).powi(2),
            QuadCost::SigQuad => (y - f).powi(2) * safe_logistic(y.max(f)),
        }
    }
}

impl FromStr for QuadCost {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.chars().filter(|c| *c != '_' && *c != '-').collect();
        match key.to_lowercase().as_str() {
            "quad" => Ok(QuadCost::Quad),
            "expquad" => Ok(QuadCost::ExpQuad),
            "sigquad" => Ok(QuadCost::SigQuad),
            _ => Err(EstimatorError::UnknownStrategy { name: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuadFit {
    pub cost: QuadCost,
    pub use_raw_peak: bool,
    pub fit: FitOptions,
}

impl QuadFit {
    pub fn new(cost: QuadCost, use_raw_peak: bool, fit: FitOptions) -> Self {
        Self { cost, use_raw_peak, fit }
    }
}

struct QuadTemplate {
    cost: QuadCost,
    raw_peak: Option<f64>,
    peak_box: BoxTransform,
    var_box: BoxTransform,
    height_box: BoxTransform,
}

struct MeshData {
    lags: Array1<f64>,
    values: Array1<f64>,
}

/// Squared-error template for a peak held fixed, clamped into the boxes.
struct QuadSeed {
    peak: f64,
    sse: f64,
    var: f64,
    height: f64,
}

impl QuadTemplate {
    /// Least-squares `height - (x - peak)² / (2 var)` with `peak` fixed.
    ///
    /// `sse` is that of the unclamped fit. A non-negative curvature maps to
    /// the widest allowed variance.
    fn quadratic_at(&self, peak: f64, data: &MeshData) -> NumericsResult<QuadSeed> {
        let u = data.lags.mapv(|x| (x - peak).powi(2));
        let w = Array1::ones(u.len());
        let c = fit_power_basis(u.view(), data.values.view(), w.view(), &[0, 1])?;
        let sse: f64 =
            u.iter().zip(data.values.iter()).map(|(&ui, &y)| (y - c[0] - c[1] * ui).powi(2)).sum();
        let var = if c[1] < 0.0 { -0.5 / c[1] } else { self.var_box.upper };
        Ok(QuadSeed {
            peak,
            sse,
            var: var.clamp(self.var_box.lower, self.var_box.upper),
            height: c[0].clamp(self.height_box.lower, self.height_box.upper),
        })
    }

    fn n_params(&self) -> usize {
        if self.raw_peak.is_some() { 2 } else { 3 }
    }

    /// `(peak, var, height)` for unconstrained `θ`.
    fn unpack(&self, theta: &Theta) -> (f64, f64, f64) {
        let k = 3 - self.n_params();
        let peak = self.raw_peak.unwrap_or_else(|| self.peak_box.to_bounded(theta[0]));
        (peak, self.var_box.to_bounded(theta[1 - k]), self.height_box.to_bounded(theta[2 - k]))
    }

    fn pack(&self, peak: f64, var: f64, height: f64) -> Theta {
        let mut theta = vec![self.var_box.to_unconstrained(var), self.height_box.to_unconstrained(height)];
        if self.raw_peak.is_none() {
            theta.insert(0, self.peak_box.to_unconstrained(peak));
        }
        Theta::from(theta)
    }
}

impl FitObjective for QuadTemplate {
    type Data = MeshData;

    fn value(&self, theta: &Theta, data: &MeshData) -> OptResult<f64> {
        let (peak, var, height) = self.unpack(theta);
        let fitted = data.lags.mapv(|x| height - (x - peak).powi(2) / (2.0 * var));
        let y_max = data.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let rescale = fitted.iter().copied().fold(y_max, f64::max);
        Ok(-data
            .values
            .iter()
            .zip(fitted.iter())
            .map(|(&y, &f)| self.cost.term(y - rescale, f - rescale))
            .sum::<f64>())
    }

    fn check(&self, theta: &Theta, _data: &MeshData) -> OptResult<()> {
        validate_theta(theta, self.n_params())
    }
}

impl LagEstimator for QuadFit {
    fn name(&self) -> &'static str {
        "quad_fit"
    }

    fn estimate(
        &self, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<PartialEstimate> {
        let (lower, upper) = (lags[0], lags[lags.len() - 1]);
        let span = upper - lower;
        let floor = f64::EPSILON * span;
        let peak = argmax(values);
        let y_max = values[peak];
        let y_min = values.iter().copied().fold(f64::INFINITY, f64::min);

        let template = QuadTemplate {
            cost: self.cost,
            raw_peak: self.use_raw_peak.then_some(lags[peak]),
            peak_box: BoxTransform::new(lower, upper),
            var_box: BoxTransform::new(floor * floor, span * span),
            height_box: BoxTransform::new(y_min, y_max),
        };
        let data = MeshData { lags: lags.to_owned(), values: values.to_owned() };

        let seed = match template.raw_peak {
            Some(raw) => template.quadratic_at(raw, &data)?,
            None => {
                let profile = |peak: f64| -> OptResult<f64> {
                    template
                        .quadratic_at(peak, &data)
                        .map(|seed| -seed.sse)
                        .map_err(|err| OptError::ObjectiveFailed { text: err.to_string() })
                };
                let best = maximize_over_mesh(&profile, lags, MESH_REFINE_ITERS)?;
                template.quadratic_at(best.x, &data)?
            }
        };

        let theta0 = template.pack(seed.peak, seed.var, seed.height);
        let outcome = polish(&template, theta0, &data, &self.fit)?;
        if !outcome.converged {
            debug!(strategy = "quad_fit", status = %outcome.status, "keeping best template found");
        }
        let (peak, var, height) = template.unpack(&outcome.theta_hat);
        Ok(PartialEstimate::with_variance(peak, Spread::Symmetric(var))
            .fit(LikelihoodFit::Quadratic { peak, var, height }))
    }
}
