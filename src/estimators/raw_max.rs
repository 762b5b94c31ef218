//! RawMax: mesh argmax with a profile-likelihood interval.
//!
//! The interval is the contiguous run of mesh points around the argmax whose
//! log-likelihood stays strictly above `peak - 0.5`. Each side is widened to
//! at least the neighbouring mesh point, so the error never collapses below
//! one mesh step where a neighbour exists.
use crate::estimators::{
    base::argmax,
    errors::EstimatorResult,
    estimator::LagEstimator,
    types::{PartialEstimate, Spread},
};
use ndarray::ArrayView1;

/// Log-likelihood drop defining the one-sigma profile interval.
pub const PROFILE_DROP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawMax;

impl LagEstimator for RawMax {
    fn name(&self) -> &'static str {
        "raw_max"
    }

    fn estimate(
        &self, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
    ) -> EstimatorResult<PartialEstimate> {
        let peak = argmax(values);
        let threshold = values[peak] - PROFILE_DROP;
        let n = lags.len();

        let mut lo = peak;
        while lo > 0 && values[lo - 1] > threshold {
            lo -= 1;
        }
        let mut hi = peak;
        while hi + 1 < n && values[hi + 1] > threshold {
            hi += 1;
        }
        let lo = lo.min(peak.saturating_sub(1));
        let hi = hi.max((peak + 1).min(n - 1));

        let dt = lags[peak];
        Ok(PartialEstimate::with_std_dev(dt, Spread::Asymmetric {
            low: dt - lags[lo],
            high: lags[hi] - dt,
        }))
    }
}
