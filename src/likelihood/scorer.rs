//! Continuous lag scorers for searches off the mesh.
//!
//! Purpose
//! -------
//! Global search evaluates the likelihood at arbitrary real lags and, when
//! nuisance parameters are searched jointly, under alternative detector
//! relations. [`LagScorer`] abstracts over where those scores come from.
//!
//! Key behaviors
//! -------------
//! - [`BinnedScorer`] re-bins detector 2 at the requested lag and scores it
//!   with a configured [`LikelihoodEvaluator`]; it supports nuisance
//!   relations.
//! - [`MeshInterpolator`] linearly interpolates a precomputed likelihood
//!   mesh; it has no relation and rejects nuisance evaluation.
use crate::{
    binning::series_binner::SeriesBinning,
    likelihood::{
        errors::{LikelihoodError, LikelihoodResult},
        evaluator::LikelihoodEvaluator,
    },
    model::{context::ComputeContext, relation::DetectorRelation},
    numerics::quadrature::interp,
};
use ndarray::{Array1, ArrayView1};

pub trait LagScorer: Sync {
    /// Score at `lag` under the scorer's own relation.
    fn score(&self, lag: f64) -> LikelihoodResult<f64>;

    /// Score at `lag` under an alternative relation.
    fn score_with(&self, _lag: f64, _relation: &DetectorRelation) -> LikelihoodResult<f64> {
        Err(LikelihoodError::NuisanceUnsupported)
    }

    /// Relation used by `score`, if the scorer has one.
    fn relation(&self) -> Option<&DetectorRelation> {
        None
    }

    /// Closed lag interval the scorer is defined on.
    fn lag_bounds(&self) -> (f64, f64);
}

/// Re-bins detector 2 at each requested lag.
pub struct BinnedScorer<'a, E: LikelihoodEvaluator> {
    ctx: &'a ComputeContext,
    binning: &'a SeriesBinning<'a>,
    evaluator: &'a E,
}

impl<'a, E: LikelihoodEvaluator> BinnedScorer<'a, E> {
    pub fn new(ctx: &'a ComputeContext, binning: &'a SeriesBinning<'a>, evaluator: &'a E) -> Self {
        Self { ctx, binning, evaluator }
    }
}

impl<E: LikelihoodEvaluator> LagScorer for BinnedScorer<'_, E> {
    fn score(&self, lag: f64) -> LikelihoodResult<f64> {
        self.score_with(lag, &self.binning.relation)
    }

    fn score_with(&self, lag: f64, relation: &DetectorRelation) -> LikelihoodResult<f64> {
        let shifted = self.binning.shifted.at(lag)?;
        self.evaluator.score(self.ctx, relation, self.binning.reference.view(), shifted.view())
    }

    fn relation(&self) -> Option<&DetectorRelation> {
        Some(&self.binning.relation)
    }

    fn lag_bounds(&self) -> (f64, f64) {
        (-self.binning.max_lag, self.binning.max_lag)
    }
}

/// Piecewise-linear interpolation of a likelihood mesh, clamped at the ends.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInterpolator {
    lags: Array1<f64>,
    values: Array1<f64>,
}

impl MeshInterpolator {
    /// Errors
    /// ------
    /// - `LikelihoodError::LengthMismatch` for unequal lengths.
    /// - `LikelihoodError::InvalidMesh` for fewer than two points,
    ///   non-finite entries, or lags that are not strictly ascending.
    pub fn new(lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>) -> LikelihoodResult<Self> {
        if lags.len() != values.len() {
            return Err(LikelihoodError::LengthMismatch {
                reference: lags.len(),
                shifted: values.len(),
            });
        }
        if lags.len() < 2 {
            return Err(LikelihoodError::InvalidMesh { reason: "At least two points are required." });
        }
        if lags.iter().chain(values.iter()).any(|v| !v.is_finite()) {
            return Err(LikelihoodError::InvalidMesh { reason: "Entries must be finite." });
        }
        if lags.windows(2).into_iter().any(|w| w[1] <= w[0]) {
            return Err(LikelihoodError::InvalidMesh { reason: "Lags must be strictly ascending." });
        }
        Ok(Self { lags: lags.to_owned(), values: values.to_owned() })
    }
}

impl LagScorer for MeshInterpolator {
    fn score(&self, lag: f64) -> LikelihoodResult<f64> {
        Ok(interp(lag, self.lags.view(), self.values.view()))
    }

    fn lag_bounds(&self) -> (f64, f64) {
        (self.lags[0], self.lags[self.lags.len() - 1])
    }
}
