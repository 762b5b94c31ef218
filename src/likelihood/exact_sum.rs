//! ExactSum: the full marginal Poisson-mixture likelihood.
use crate::{
    likelihood::{
        errors::{LikelihoodError, LikelihoodResult},
        evaluator::{LikelihoodEvaluator, check_lengths},
    },
    model::{context::ComputeContext, relation::DetectorRelation},
};
use ndarray::ArrayView1;

/// Default relative precision of the per-bin series truncation.
pub const DEFAULT_REL_PRECISION: f64 = 1e-2;

/// Delegates each row to [`DetectorRelation::log_likelihood`] with a fixed
/// relative truncation precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExactSum {
    rel_precision: f64,
}

impl ExactSum {
    /// Errors
    /// ------
    /// - `LikelihoodError::InvalidPrecision` outside `(0, 1)`.
    pub fn new(rel_precision: f64) -> LikelihoodResult<Self> {
        if !rel_precision.is_finite() || rel_precision <= 0.0 || rel_precision >= 1.0 {
            return Err(LikelihoodError::InvalidPrecision { value: rel_precision });
        }
        Ok(Self { rel_precision })
    }

    pub fn rel_precision(&self) -> f64 {
        self.rel_precision
    }
}

impl Default for ExactSum {
    fn default() -> Self {
        Self { rel_precision: DEFAULT_REL_PRECISION }
    }
}

impl LikelihoodEvaluator for ExactSum {
    fn name(&self) -> &'static str {
        "exact_sum"
    }

    fn score(
        &self, ctx: &ComputeContext, relation: &DetectorRelation, reference: ArrayView1<'_, f64>,
        shifted: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<f64> {
        check_lengths(reference, shifted)?;
        Ok(relation.log_likelihood(ctx, reference, shifted, self.rel_precision)?)
    }
}
