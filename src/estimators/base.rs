//! The post-processing contract shared by every lag estimator.
//!
//! Purpose
//! -------
//! Strategies differ in how they read a likelihood curve but must agree on
//! what they return. This module owns the steps around a strategy call:
//! cleaning and ordering the mesh, substituting a default when the strategy
//! fails, and clamping the answer into the mesh.
//!
//! Key behaviors
//! -------------
//! - Non-finite mesh points are dropped; fewer than two remaining points, or
//!   a mesh with a single distinct lag, is `EstimatorError::DegenerateMesh`.
//! - Unsorted meshes are stably sorted by lag with the values permuted
//!   alongside. Repeated lags are merged into one point holding the largest
//!   value, so strategies always see strictly ascending lags.
//! - A strategy error or a non-finite `dt` is logged and replaced by the
//!   default estimate: mesh midpoint with the half-range on both sides.
//! - `dt` is clamped into the mesh range. Each error side is clamped into
//!   `[floor, ceiling]`, where `floor = ε · span` and
//!   `ceiling = ERR_CEILING_SCALE · distance to that edge`; the floor wins
//!   when the ceiling is below it. A symmetric error keeps its shape and
//!   uses the larger of the two ceilings.
//! - Non-finite error sides become their ceiling. Finally
//!   `var = dt_err²` elementwise.
//!
//! Invariants & assumptions
//! ------------------------
//! - The contract is deterministic: identical inputs give bit-identical
//!   results for every deterministic strategy.
use crate::estimators::{
    errors::{EstimatorError, EstimatorResult},
    types::{LagEstimate, PartialEstimate, Spread, Uncertainty},
};
use ndarray::{Array1, ArrayView1};
use tracing::warn;

/// Ratio between the error ceiling and the distance from `dt` to the mesh
/// edge on that side: a one-sigma bound may reach, but not pass, the edge.
pub const ERR_CEILING_SCALE: f64 = 1.0;

/// Finite, lag-sorted copy of a likelihood mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanMesh {
    pub lags: Array1<f64>,
    pub values: Array1<f64>,
}

impl CleanMesh {
    pub fn lower(&self) -> f64 {
        self.lags[0]
    }

    pub fn upper(&self) -> f64 {
        self.lags[self.lags.len() - 1]
    }
}

/// Drop non-finite points, sort by lag and merge repeated lags, keeping the
/// largest value of each.
///
/// Errors
/// ------
/// - `EstimatorError::LengthMismatch` for unequal lengths.
/// - `EstimatorError::DegenerateMesh` with fewer than two usable points or a
///   single distinct lag.
pub fn prepare_mesh(
    lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>,
) -> EstimatorResult<CleanMesh> {
    if lags.len() != values.len() {
        return Err(EstimatorError::LengthMismatch { lags: lags.len(), values: values.len() });
    }
    let mut points: Vec<(f64, f64)> = lags
        .iter()
        .zip(values.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();
    if points.len() < 2 {
        return Err(EstimatorError::DegenerateMesh {
            usable: points.len(),
            reason: "At least two finite points are required.",
        });
    }
    let unsorted = points.windows(2).any(|w| w[1].0 <= w[0].0);
    if unsorted {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
    let (first, last) = (points[0].0, points[points.len() - 1].0);
    if first == last {
        return Err(EstimatorError::DegenerateMesh {
            usable: points.len(),
            reason: "All lags are identical.",
        });
    }
    if unsorted {
        points.dedup_by(|later, kept| {
            if later.0 != kept.0 {
                return false;
            }
            kept.1 = kept.1.max(later.1);
            true
        });
    }
    Ok(CleanMesh {
        lags: points.iter().map(|p| p.0).collect(),
        values: points.iter().map(|p| p.1).collect(),
    })
}

/// Midpoint estimate with the full half-range on both sides.
pub fn default_estimate(lower: f64, upper: f64) -> PartialEstimate {
    let dt = 0.5 * (lower + upper);
    PartialEstimate::with_std_dev(dt, Spread::Asymmetric { low: dt - lower, high: upper - dt })
}

/// Run `strategy` on a cleaned mesh and post-process its answer.
///
/// Parameters
/// ----------
/// - `name`: strategy name for diagnostics.
/// - `lags`, `values`: the raw likelihood mesh.
/// - `strategy`: the strategy body, called on the cleaned mesh.
///
/// Errors
/// ------
/// - Only the input errors of [`prepare_mesh`]; strategy failures are
///   recovered into the default estimate.
pub fn apply_contract<F>(
    name: &'static str, lags: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>, strategy: F,
) -> EstimatorResult<LagEstimate>
where
    F: FnOnce(&CleanMesh) -> EstimatorResult<PartialEstimate>,
{
    let mesh = prepare_mesh(lags, values)?;
    let (lower, upper) = (mesh.lower(), mesh.upper());
    let (partial, used_default) = match strategy(&mesh) {
        Ok(partial) if partial.dt.is_finite() => (partial, false),
        Ok(partial) => {
            warn!(strategy = name, dt = partial.dt, "non-finite lag estimate; using default");
            (default_estimate(lower, upper), true)
        }
        Err(err) => {
            warn!(strategy = name, error = %err, "lag estimate failed; using default");
            (default_estimate(lower, upper), true)
        }
    };
    Ok(finalize(partial, lower, upper, used_default))
}

/// Clamp a strategy answer into the mesh and derive `dt_err`/`var`.
pub fn finalize(partial: PartialEstimate, lower: f64, upper: f64, used_default: bool) -> LagEstimate {
    let dt = partial.dt.clamp(lower, upper);
    let dt_err = match partial.uncertainty {
        Uncertainty::StdDev(spread) => spread,
        Uncertainty::Variance(spread) => spread.map(f64::sqrt),
    };
    let dt_err = clamp_spread(dt_err, dt, lower, upper);
    let var = dt_err.map(|e| e * e);
    LagEstimate { dt, dt_err, var, like_fit: partial.like_fit, trace: partial.trace, used_default }
}

fn clamp_spread(spread: Spread, dt: f64, lower: f64, upper: f64) -> Spread {
    let floor = f64::EPSILON * (upper - lower);
    let ceil_low = (ERR_CEILING_SCALE * (dt - lower)).max(floor);
    let ceil_high = (ERR_CEILING_SCALE * (upper - dt)).max(floor);
    let side = |err: f64, ceiling: f64| {
        if err.is_finite() { err.abs().clamp(floor, ceiling) } else { ceiling }
    };
    match spread {
        Spread::Symmetric(err) => Spread::Symmetric(side(err, ceil_low.max(ceil_high))),
        Spread::Asymmetric { low, high } => {
            Spread::Asymmetric { low: side(low, ceil_low), high: side(high, ceil_high) }
        }
    }
}

/// Index of the first maximum.
pub(crate) fn argmax(values: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
