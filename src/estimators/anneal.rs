//! GlobalAnnealingEst: simulated annealing directly over continuous lags.
//!
//! Purpose
//! -------
//! Search the whole lag interval without committing to a mesh, optionally
//! together with the nuisance parameters of the detector relation, and
//! derive the uncertainty post hoc from every trial the search visited.
//!
//! Key behaviors
//! -------------
//! - The likelihood comes from a [`LagScorer`]: the binned scorer when
//!   called through `estimate_scored`, or a piecewise-linear interpolation
//!   of the mesh when only a mesh is available.
//! - Coordinates: the lag moves additively inside the scorer's bounds. With
//!   `nuisance`, the two bin background rates and the sensitivity ratio are
//!   searched too, each moving multiplicatively inside
//!   `[NUISANCE_LOWER, NUISANCE_UPPER]`.
//! - The point estimate is the best lag found. The uncertainty comes from
//!   the lag-sorted trial log via [`PostHoc`].
//! - Reaching `max_iters` before the search stalls is logged; the result is
//!   still used.
//!
//! Invariants & assumptions
//! ------------------------
//! - With `AnnealOptions::seed` set the search, and so the estimate, is
//!   reproducible.
//! - Nuisance values that make the relation invalid score `-∞` and are
//!   never accepted.
use crate::{
    estimators::{
        base::{apply_contract, argmax},
        errors::{EstimatorError, EstimatorResult},
        estimator::LagEstimator,
        mean_var::weighted_moments,
        poly_fit::PolyFit,
        types::{AnnealTrace, LagEstimate, PartialEstimate, Spread},
    },
    likelihood::{
        errors::LikelihoodError,
        scorer::{LagScorer, MeshInterpolator},
    },
    model::relation::DetectorRelation,
    optimization::{
        annealing::{AnnealObjective, AnnealOptions, AnnealOutcome, Perturbation, anneal},
        errors::{OptError, OptResult},
        fit_optimizer::Theta,
    },
};
use ndarray::{Array1, ArrayView1};
use std::str::FromStr;
use tracing::warn;

pub const NUISANCE_LOWER: f64 = 1e-9;
pub const NUISANCE_UPPER: f64 = 1e8;

/// How the trial scatter is turned into an uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostHoc {
    /// Regional variances of the likelihood-weighted trial lags.
    #[default]
    MeanVariance,
    /// Curvature of a polynomial fitted to the trials.
    PolynomialPeak,
}

impl FromStr for PostHoc {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.chars().filter(|c| *c != '_' && *c != '-').collect();
        match key.to_lowercase().as_str() {
            "meanvariance" | "meanvar" => Ok(PostHoc::MeanVariance),
            "polynomialpeak" | "polyfit" => Ok(PostHoc::PolynomialPeak),
            _ => Err(EstimatorError::UnknownStrategy { name: s.to_string() }),
        }
    }
}

/// Annealing estimator options.
///
/// - `opts`: schedule, iteration caps and seed.
/// - `nuisance`: also search background rates and sensitivity ratio.
/// - `post_hoc`: uncertainty technique applied to the trials.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnnealLag {
    pub opts: AnnealOptions,
    pub nuisance: bool,
    pub post_hoc: PostHoc,
}

struct LagObjective<'a> {
    scorer: &'a dyn LagScorer,
    relation: Option<&'a DetectorRelation>,
}

impl AnnealObjective for LagObjective<'_> {
    fn value(&self, theta: &Theta) -> OptResult<f64> {
        let scored = match self.relation {
            None => self.scorer.score(theta[0]),
            Some(relation) => match relation.with_nuisance(theta[1], theta[2], theta[3]) {
                Ok(alt) => self.scorer.score_with(theta[0], &alt),
                Err(_) => return Ok(f64::NEG_INFINITY),
            },
        };
        scored.map_err(|e| OptError::ObjectiveFailed { text: e.to_string() })
    }
}

impl AnnealLag {
    pub fn new(opts: AnnealOptions, nuisance: bool, post_hoc: PostHoc) -> Self {
        Self { opts, nuisance, post_hoc }
    }

    /// Anneal over `scorer` from `start` and analyse the trials.
    fn search(&self, scorer: &dyn LagScorer, start: f64) -> EstimatorResult<PartialEstimate> {
        let (lower, upper) = scorer.lag_bounds();
        let mut theta0 = vec![start];
        let mut moves = vec![Perturbation::Additive { lower, upper }];
        let relation = if self.nuisance {
            let relation = scorer.relation().ok_or(LikelihoodError::NuisanceUnsupported)?;
            let (b1, b2) = relation.bin_background_rates();
            theta0.extend([b1, b2, relation.sensitivity_ratio_2_to_1()]);
            moves.extend([Perturbation::Multiplicative { lower: NUISANCE_LOWER, upper: NUISANCE_UPPER }; 3]);
            Some(relation)
        } else {
            None
        };

        let objective = LagObjective { scorer, relation };
        let outcome = anneal(&objective, Theta::from(theta0), &moves, &self.opts)?;
        if outcome.hit_iteration_cap {
            warn!(iterations = outcome.iterations, "annealing stopped at its iteration cap");
        }
        let dt = outcome.theta_hat[0];
        let trace = trace_of(outcome);

        let partial = match self.post_hoc {
            PostHoc::MeanVariance => {
                let (_, low, high) = weighted_moments(trace.lags.view(), trace.log_likelihoods.view())?;
                PartialEstimate::with_variance(dt, Spread::Asymmetric { low, high })
            }
            PostHoc::PolynomialPeak => {
                let n = trace.lags.len();
                if n < 2 || trace.lags[0] == trace.lags[n - 1] {
                    return Err(EstimatorError::DegenerateMesh {
                        usable: n,
                        reason: "Annealing visited a single lag.",
                    });
                }
                let fitted = PolyFit::default().estimate(trace.lags.view(), trace.log_likelihoods.view())?;
                PartialEstimate { dt, ..fitted }
            }
        };
        Ok(partial.traced(trace))
    }
}

/// Lag-sorted `(lag, log-likelihood)` trial log.
fn trace_of(outcome: AnnealOutcome) -> AnnealTrace {
    let mut trials: Vec<(f64, f64)> = outcome.trials.iter().map(|(theta, v)| (theta[0], *v)).collect();
    trials.sort_by(|a, b| a.0.total_cmp(&b.0));
    AnnealTrace {
        lags: trials.iter().map(|t| t.0).collect::<Array1<f64>>(),
        log_likelihoods: trials.iter().map(|t| t.1).collect::<Array1<f64>>(),
        iterations: outcome.iterations,
        hit_iteration_cap: outcome.hit_iteration_cap,
    }
}

impl LagEstimator for AnnealLag {
    fn name(&self) -> &'static str {
        "anneal"
    }

    /// Mesh-only search over a linear interpolation of the mesh. Nuisance
    /// search needs a binned scorer and fails here.
    fn estimate(
        &self, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<PartialEstimate> {
        let scorer = MeshInterpolator::new(lags, values)?;
        self.search(&scorer, lags[argmax(values)])
    }

    fn estimate_scored(
        &self, scorer: &dyn LagScorer, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<LagEstimate> {
        apply_contract(self.name(), lags, values, |mesh| {
            self.search(scorer, mesh.lags[argmax(mesh.values.view())])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Locating a smooth peak from the interpolated mesh, with a trace.
    // - Reproducibility under a fixed seed.
    // - Nuisance search without a relation falling back to the default.
    // -------------------------------------------------------------------------

    fn seeded(seed: u64) -> AnnealLag {
        AnnealLag {
            opts: AnnealOptions { seed: Some(seed), ..AnnealOptions::default() },
            ..AnnealLag::default()
        }
    }

    fn mesh() -> (Array1<f64>, Array1<f64>) {
        let lags = Array1::linspace(-0.1, 0.1, 81);
        let values = lags.mapv(|x: f64| -(x + 0.03).powi(2) / (2.0 * 2.5e-4));
        (lags, values)
    }

    #[test]
    // Purpose
    // -------
    // Annealing over an interpolated Gaussian log-likelihood finds its peak
    // and records a lag-sorted trace.
    //
    // Given
    // -----
    // - log L = -(x + 0.03)² / (2 · 2.5e-4) on 81 points, seed 7.
    //
    // Expect
    // ------
    // - dt within one mesh step of -0.03; sorted, non-empty trace.
    fn finds_peak_and_records_trace() {
        // Arrange
        let (lags, values) = mesh();

        // Act
        let est = seeded(7).estimate_lag(lags.view(), values.view()).unwrap();

        // Assert
        assert!(!est.used_default);
        assert_relative_eq!(est.dt, -0.03, epsilon = 2.5e-3);
        let trace = est.trace.unwrap();
        assert!(!trace.lags.is_empty());
        assert!(trace.lags.windows(2).into_iter().all(|w| w[0] <= w[1]));
        assert_eq!(trace.lags.len(), trace.log_likelihoods.len());
    }

    #[test]
    // Purpose
    // -------
    // A fixed seed reproduces the estimate bit for bit.
    fn seeded_search_is_reproducible() {
        let (lags, values) = mesh();

        let a = seeded(11).estimate_lag(lags.view(), values.view()).unwrap();
        let b = seeded(11).estimate_lag(lags.view(), values.view()).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    // Purpose
    // -------
    // A mesh scorer has no relation, so nuisance search fails and the
    // default estimate is returned.
    fn nuisance_without_relation_uses_default() {
        let (lags, values) = mesh();
        let est = AnnealLag { nuisance: true, ..seeded(3) };

        let out = est.estimate_lag(lags.view(), values.view()).unwrap();

        assert!(out.used_default);
        assert_relative_eq!(out.dt, 0.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Post-hoc technique names parse.
    fn parses_post_hoc_names() {
        assert_eq!("mean_variance".parse::<PostHoc>().unwrap(), PostHoc::MeanVariance);
        assert_eq!("PolynomialPeak".parse::<PostHoc>().unwrap(), PostHoc::PolynomialPeak);
    }
}
