//! CrossCovariance: a cheap, uncalibrated alignment signal.
//!
//! `Σ (h1 − b1) · r · (h2 − b2)` over bins, with `(b1, b2)` the per-bin
//! backgrounds and `r` the detector-2-to-1 sensitivity ratio. It grows with
//! the correlation of the two histograms but is not a log-likelihood; use it
//! only as a coarse search signal.
use crate::{
    likelihood::{
        errors::LikelihoodResult,
        evaluator::{LikelihoodEvaluator, check_lengths},
    },
    model::{context::ComputeContext, relation::DetectorRelation},
};
use ndarray::ArrayView1;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CrossCovariance;

impl LikelihoodEvaluator for CrossCovariance {
    fn name(&self) -> &'static str {
        "cross_covariance"
    }

    fn score(
        &self, _ctx: &ComputeContext, relation: &DetectorRelation, reference: ArrayView1<'_, f64>,
        shifted: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<f64> {
        check_lengths(reference, shifted)?;
        let (b1, b2) = relation.bin_background_rates();
        let ratio = relation.sensitivity_ratio_2_to_1();
        Ok(reference
            .iter()
            .zip(shifted.iter())
            .map(|(&h1, &h2)| (h1 - b1) * ratio * (h2 - b2))
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::likelihood::errors::LikelihoodError;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Background-subtracted, ratio-scaled products are summed; mismatched
    // lengths are rejected.
    fn score_is_scaled_background_subtracted_product() {
        let ctx = ComputeContext::new();
        let relation = DetectorRelation::new((1.0, 0.5), 2.0, 1.0).unwrap();

        let score = CrossCovariance
            .score(&ctx, &relation, array![3.0, 1.0].view(), array![2.5, 0.5].view())
            .unwrap();

        assert_relative_eq!(score, (2.0 * 2.0 * 2.0) + 0.0);
        assert_eq!(
            CrossCovariance.score(&ctx, &relation, array![1.0].view(), array![1.0, 2.0].view()),
            Err(LikelihoodError::LengthMismatch { reference: 1, shifted: 2 })
        );
    }
}
