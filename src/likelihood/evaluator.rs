//! The `LikelihoodEvaluator` capability shared by every scoring strategy.
//!
//! A strategy only scores one aligned histogram pair. Mesh evaluation is a
//! provided method that maps `score` over the mesh rows with no state shared
//! between rows, so batched and single-row results are identical.
use crate::{
    binning::{lag_mesh::LagMesh, series_binner::SeriesBinning},
    likelihood::errors::{LikelihoodError, LikelihoodResult},
    model::{context::ComputeContext, relation::DetectorRelation},
};
use ndarray::{Array1, ArrayView1};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub trait LikelihoodEvaluator: Sync {
    /// Registry name of the strategy.
    fn name(&self) -> &'static str;

    /// Score of detector-2 histogram `shifted` against `reference`.
    fn score(
        &self, ctx: &ComputeContext, relation: &DetectorRelation, reference: ArrayView1<'_, f64>,
        shifted: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<f64>;

    /// One score per mesh row, aligned with `mesh.lags`.
    ///
    /// Errors
    /// ------
    /// - The first row error returned by `score`.
    fn evaluate(
        &self, ctx: &ComputeContext, binning: &SeriesBinning<'_>, mesh: &LagMesh,
    ) -> LikelihoodResult<Array1<f64>> {
        let relation = binning.relation;
        let reference = binning.reference.view();
        let rows = mesh.histograms.nrows();

        #[cfg(feature = "parallel")]
        let scores: Vec<f64> = (0..rows)
            .into_par_iter()
            .map(|i| self.score(ctx, &relation, reference, mesh.histograms.row(i)))
            .collect::<LikelihoodResult<_>>()?;

        #[cfg(not(feature = "parallel"))]
        let scores: Vec<f64> = (0..rows)
            .map(|i| self.score(ctx, &relation, reference, mesh.histograms.row(i)))
            .collect::<LikelihoodResult<_>>()?;

        Ok(Array1::from(scores))
    }
}

/// Shared length check for strategies that score bin by bin.
pub(crate) fn check_lengths(
    reference: ArrayView1<'_, f64>, shifted: ArrayView1<'_, f64>,
) -> LikelihoodResult<()> {
    if reference.len() != shifted.len() {
        return Err(LikelihoodError::LengthMismatch {
            reference: reference.len(),
            shifted: shifted.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        binning::series_binner::BinningOptions,
        likelihood::{
            closed_form::ClosedFormApprox, cross_covariance::CrossCovariance, exact_sum::ExactSum,
        },
        series::time_series::TimeSeries,
    };

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Mesh evaluation against row-by-row scoring for every strategy. The
    //   same test runs with and without the `parallel` feature, so both
    //   `evaluate` paths are checked.
    // -------------------------------------------------------------------------

    fn assert_batch_matches_rows<E: LikelihoodEvaluator>(evaluator: &E) {
        // Arrange
        let ctx = ComputeContext::new();
        let s1 = TimeSeries::new(vec![0.41, 1.0, 1.02, 1.05, 1.07, 1.3, 1.74], 0.0, 3.0).unwrap();
        let s2 = TimeSeries::new(vec![0.2, 0.97, 1.0, 1.01, 1.04, 1.6, 2.2], 0.0, 3.0).unwrap();
        let opts = BinningOptions::new((0.5, 0.8), 0.05, 1.0).unwrap();
        let binning = SeriesBinning::build(&s1, &s2, &opts).unwrap();
        let mesh = LagMesh::build(&binning, 0.02).unwrap();

        // Act
        let batched = evaluator.evaluate(&ctx, &binning, &mesh).unwrap();

        // Assert
        assert_eq!(batched.len(), mesh.lags.len());
        for (i, &value) in batched.iter().enumerate() {
            let row = evaluator
                .score(&ctx, &binning.relation, binning.reference.view(), mesh.histograms.row(i))
                .unwrap();
            assert_eq!(value.to_bits(), row.to_bits(), "{} row {i}", evaluator.name());
        }
    }

    #[test]
    // Purpose
    // -------
    // Batched mesh scores equal per-row scores bit for bit.
    //
    // Given
    // -----
    // - A small pair with background on both detectors, mesh spacing 0.02.
    //
    // Expect
    // ------
    // - For ExactSum, ClosedFormApprox and CrossCovariance, entry `i` of
    //   `evaluate` equals `score` on mesh row `i`.
    fn evaluate_matches_row_by_row_scoring() {
        assert_batch_matches_rows(&ExactSum::default());
        assert_batch_matches_rows(&ClosedFormApprox);
        assert_batch_matches_rows(&CrossCovariance);
    }
}
