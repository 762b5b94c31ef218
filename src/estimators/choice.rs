//! `EstimatorChoice` — the closed registry of lag estimators.
use crate::{
    estimators::{
        anneal::AnnealLag,
        asym_poly_fit::AsymPolyFit,
        cum_prob::CumProb,
        errors::{EstimatorError, EstimatorResult},
        estimator::LagEstimator,
        fixed_poly_fit::FixedPolyFit,
        gauss_smooth::GaussSmooth,
        mean_var::MeanVar,
        poly_cum::PolyCum,
        poly_fit::PolyFit,
        quad_fit::QuadFit,
        raw_max::RawMax,
        types::{LagEstimate, PartialEstimate},
    },
    likelihood::scorer::LagScorer,
};
use ndarray::ArrayView1;
use std::str::FromStr;

/// A configured lag estimator.
///
/// Parsing
/// -------
/// Case-insensitive, ignoring `_` and `-`. Each strategy parses from its
/// `name()` (`"raw_max"`, `"poly_fit"`, `"asym_poly_fit"`,
/// `"fixed_poly_fit"`, `"cum_prob"`, `"mean_var"`, `"poly_cum"`,
/// `"gauss_smooth"`, `"quad_fit"`, `"anneal"`) and uses its default
/// settings.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimatorChoice {
    RawMax(RawMax),
    PolyFit(PolyFit),
    AsymPolyFit(AsymPolyFit),
    FixedPolyFit(FixedPolyFit),
    CumProb(CumProb),
    MeanVar(MeanVar),
    PolyCum(PolyCum),
    GaussSmooth(GaussSmooth),
    QuadFit(QuadFit),
    Anneal(AnnealLag),
}

impl EstimatorChoice {
    fn inner(&self) -> &dyn LagEstimator {
        match self {
            EstimatorChoice::RawMax(e) => e,
            EstimatorChoice::PolyFit(e) => e,
            EstimatorChoice::AsymPolyFit(e) => e,
            EstimatorChoice::FixedPolyFit(e) => e,
            EstimatorChoice::CumProb(e) => e,
            EstimatorChoice::MeanVar(e) => e,
            EstimatorChoice::PolyCum(e) => e,
            EstimatorChoice::GaussSmooth(e) => e,
            EstimatorChoice::QuadFit(e) => e,
            EstimatorChoice::Anneal(e) => e,
        }
    }
}

impl Default for EstimatorChoice {
    fn default() -> Self {
        EstimatorChoice::CumProb(CumProb)
    }
}

impl FromStr for EstimatorChoice {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.chars().filter(|c| *c != '_' && *c != '-').collect();
        let choice = match key.to_lowercase().as_str() {
            "rawmax" => EstimatorChoice::RawMax(RawMax),
            "polyfit" => EstimatorChoice::PolyFit(PolyFit::default()),
            "asympolyfit" | "apolyfit" => EstimatorChoice::AsymPolyFit(AsymPolyFit::default()),
            "fixedpolyfit" => EstimatorChoice::FixedPolyFit(FixedPolyFit::default()),
            "cumprob" => EstimatorChoice::CumProb(CumProb),
            "meanvar" => EstimatorChoice::MeanVar(MeanVar),
            "polycum" => EstimatorChoice::PolyCum(PolyCum::default()),
            "gausssmooth" => EstimatorChoice::GaussSmooth(GaussSmooth::default()),
            "quadfit" => EstimatorChoice::QuadFit(QuadFit::default()),
            "anneal" | "annealing" => EstimatorChoice::Anneal(AnnealLag::default()),
            _ => return Err(EstimatorError::UnknownStrategy { name: s.to_string() }),
        };
        Ok(choice)
    }
}

impl LagEstimator for EstimatorChoice {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn estimate(
        &self, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<PartialEstimate> {
        self.inner().estimate(lags, values)
    }

    fn estimate_scored(
        &self, scorer: &dyn LagScorer, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<LagEstimate> {
        self.inner().estimate_scored(scorer, lags, values)
    }
}
