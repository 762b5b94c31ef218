//! Result types shared by every lag estimator.
//!
//! - [`Spread`]: a symmetric value or a `(low, high)` pair.
//! - [`Uncertainty`]: what a strategy measured, standard deviation or
//!   variance, before the base contract derives the other.
//! - [`PartialEstimate`]: a strategy's raw answer.
//! - [`LagEstimate`]: the post-processed result with `var == dt_err²`.
//! - [`LikelihoodFit`]: the optional continuous fit of the likelihood curve.
use crate::{
    estimators::{asym_poly_fit::ArmPolynomials, gauss_smooth::GaussianSmoother},
    numerics::polynomial::MappedPolynomial,
};
use ndarray::Array1;

/// Symmetric or asymmetric spread around `dt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spread {
    Symmetric(f64),
    Asymmetric { low: f64, high: f64 },
}

impl Spread {
    pub fn low(&self) -> f64 {
        match *self {
            Spread::Symmetric(v) => v,
            Spread::Asymmetric { low, .. } => low,
        }
    }

    pub fn high(&self) -> f64 {
        match *self {
            Spread::Symmetric(v) => v,
            Spread::Asymmetric { high, .. } => high,
        }
    }

    pub fn is_symmetric(&self) -> bool {
        matches!(self, Spread::Symmetric(_))
    }

    /// Apply `f` elementwise, keeping the shape.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            Spread::Symmetric(v) => Spread::Symmetric(f(v)),
            Spread::Asymmetric { low, high } => Spread::Asymmetric { low: f(low), high: f(high) },
        }
    }
}

/// Which second-moment quantity a strategy reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uncertainty {
    StdDev(Spread),
    Variance(Spread),
}

/// Trial log of a global search: every `(lag, log-likelihood)` visited,
/// sorted by lag.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealTrace {
    pub lags: Array1<f64>,
    pub log_likelihoods: Array1<f64>,
    pub iterations: u64,
    pub hit_iteration_cap: bool,
}

/// Continuous fit of the log-likelihood as a function of lag.
#[derive(Debug, Clone, PartialEq)]
pub enum LikelihoodFit {
    /// Polynomial fitted in window coordinates.
    Polynomial(MappedPolynomial),
    /// Peak plus independent polynomial arms on each side.
    AsymmetricArms(ArmPolynomials),
    /// `height - (x - peak)² / (2 var)`.
    Quadratic { peak: f64, var: f64, height: f64 },
    /// Gaussian-kernel average of the mesh.
    GaussianSmoothed(GaussianSmoother),
}

impl LikelihoodFit {
    pub fn eval(&self, lag: f64) -> f64 {
        match self {
            LikelihoodFit::Polynomial(p) => p.eval(lag),
            LikelihoodFit::AsymmetricArms(arms) => arms.eval(lag),
            LikelihoodFit::Quadratic { peak, var, height } => height - (lag - peak).powi(2) / (2.0 * var),
            LikelihoodFit::GaussianSmoothed(s) => s.eval(lag),
        }
    }
}

/// A strategy's answer before clamping and moment conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialEstimate {
    pub dt: f64,
    pub uncertainty: Uncertainty,
    pub like_fit: Option<LikelihoodFit>,
    pub trace: Option<AnnealTrace>,
}

impl PartialEstimate {
    pub fn with_std_dev(dt: f64, dt_err: Spread) -> Self {
        Self { dt, uncertainty: Uncertainty::StdDev(dt_err), like_fit: None, trace: None }
    }

    pub fn with_variance(dt: f64, var: Spread) -> Self {
        Self { dt, uncertainty: Uncertainty::Variance(var), like_fit: None, trace: None }
    }

    pub fn fit(mut self, like_fit: LikelihoodFit) -> Self {
        self.like_fit = Some(like_fit);
        self
    }

    pub fn traced(mut self, trace: AnnealTrace) -> Self {
        self.trace = Some(trace);
        self
    }
}

/// `LagEstimate` — final lag estimate.
///
/// Fields
/// ------
/// - `dt`: estimated lag, inside the mesh range.
/// - `dt_err`: one-sigma spread, each side inside `[floor, ceiling]`.
/// - `var`: `dt_err` squared elementwise, same shape.
/// - `like_fit`: optional continuous fit of the likelihood curve.
/// - `trace`: trial log for global search strategies.
/// - `used_default`: the strategy failed and the midpoint default was used.
#[derive(Debug, Clone, PartialEq)]
pub struct LagEstimate {
    pub dt: f64,
    pub dt_err: Spread,
    pub var: Spread,
    pub like_fit: Option<LikelihoodFit>,
    pub trace: Option<AnnealTrace>,
    pub used_default: bool,
}
