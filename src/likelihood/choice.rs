//! `LikelihoodChoice` — the closed registry of scoring strategies.
use crate::{
    likelihood::{
        closed_form::ClosedFormApprox,
        cross_covariance::CrossCovariance,
        errors::{LikelihoodError, LikelihoodResult},
        evaluator::LikelihoodEvaluator,
        exact_sum::ExactSum,
    },
    model::{context::ComputeContext, relation::DetectorRelation},
};
use ndarray::ArrayView1;
use std::str::FromStr;

/// A configured scoring strategy.
///
/// Parsing
/// -------
/// Case-insensitive, ignoring `_` and `-`: `"exact_sum"` (also `"sum"`),
/// `"closed_form"` (also `"approx"`), `"cross_covariance"` (also
/// `"cross_cov"`). Parsed strategies use their default settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LikelihoodChoice {
    ExactSum(ExactSum),
    ClosedFormApprox(ClosedFormApprox),
    CrossCovariance(CrossCovariance),
}

impl Default for LikelihoodChoice {
    fn default() -> Self {
        LikelihoodChoice::ExactSum(ExactSum::default())
    }
}

impl FromStr for LikelihoodChoice {
    type Err = LikelihoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.chars().filter(|c| *c != '_' && *c != '-').collect();
        match key.to_lowercase().as_str() {
            "exactsum" | "sum" => Ok(LikelihoodChoice::ExactSum(ExactSum::default())),
            "closedform" | "closedformapprox" | "approx" => {
                Ok(LikelihoodChoice::ClosedFormApprox(ClosedFormApprox))
            }
            "crosscovariance" | "crosscov" => Ok(LikelihoodChoice::CrossCovariance(CrossCovariance)),
            _ => Err(LikelihoodError::UnknownStrategy { name: s.to_string() }),
        }
    }
}

impl LikelihoodEvaluator for LikelihoodChoice {
    fn name(&self) -> &'static str {
        match self {
            LikelihoodChoice::ExactSum(e) => e.name(),
            LikelihoodChoice::ClosedFormApprox(e) => e.name(),
            LikelihoodChoice::CrossCovariance(e) => e.name(),
        }
    }

    fn score(
        &self, ctx: &ComputeContext, relation: &DetectorRelation, reference: ArrayView1<'_, f64>,
        shifted: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<f64> {
        match self {
            LikelihoodChoice::ExactSum(e) => e.score(ctx, relation, reference, shifted),
            LikelihoodChoice::ClosedFormApprox(e) => e.score(ctx, relation, reference, shifted),
            LikelihoodChoice::CrossCovariance(e) => e.score(ctx, relation, reference, shifted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Registry names parse case-insensitively and round-trip through `name`.
    fn registry_parses_names_and_rejects_unknown() {
        for (text, name) in [
            ("exact_sum", "exact_sum"),
            ("Closed-Form", "closed_form"),
            ("CROSS_COV", "cross_covariance"),
        ] {
            assert_eq!(text.parse::<LikelihoodChoice>().unwrap().name(), name);
        }
        assert!(matches!(
            "poisson".parse::<LikelihoodChoice>(),
            Err(LikelihoodError::UnknownStrategy { .. })
        ));
    }
}
