//! The `LagEstimator` capability shared by all strategies.
use crate::{
    estimators::{
        base::apply_contract,
        errors::EstimatorResult,
        types::{LagEstimate, PartialEstimate},
    },
    likelihood::scorer::LagScorer,
};
use ndarray::ArrayView1;

/// A strategy turning a `(lag, log-likelihood)` curve into a lag estimate.
///
/// Required:
/// - `name()`: registry name used in diagnostics.
/// - `estimate(lags, values)`: the strategy body. Receives a mesh that is
///   finite, strictly ascending in lag, and has at least two points.
///
/// Provided:
/// - `estimate_lag(lags, values)`: runs `estimate` under the base contract
///   (cleaning, default substitution, clamping).
/// - `estimate_scored(scorer, lags, values)`: entry point for strategies
///   that can evaluate the likelihood off the mesh. Mesh-only strategies
///   ignore the scorer.
pub trait LagEstimator: Sync {
    fn name(&self) -> &'static str;

    fn estimate(
        &self, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<PartialEstimate>;

    fn estimate_lag(
        &self, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<LagEstimate> {
        apply_contract(self.name(), lags, values, |mesh| {
            self.estimate(mesh.lags.view(), mesh.values.view())
        })
    }

    fn estimate_scored(
        &self, _scorer: &dyn LagScorer, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<LagEstimate> {
        self.estimate_lag(lags, values)
    }
}
