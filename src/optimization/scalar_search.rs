//! scalar_search — bounded one-dimensional maximization with Brent's method.
//!
//! Purpose
//! -------
//! Locate the maximum of a smooth scalar function on a closed interval, as
//! needed by the Gaussian-smoothed peak search, and of a function sampled
//! on a lag mesh, as needed by the profile seeds of the curve fits.
//!
//! Key behaviors
//! -------------
//! - The search runs on the unit interval `s ∈ [0, 1]` and maps back to
//!   `x = lower + s (upper - lower)`, so argmin's default relative
//!   tolerances apply uniformly regardless of the caller's lag scale.
//! - Non-finite function values abort the search with
//!   `OptError::NonFiniteCost`.
//! - [`maximize_over_mesh`] scans every mesh point and then runs Brent
//!   between the neighbours of the best one; it never returns a point worse
//!   than the best mesh point.
//!
//! Invariants & assumptions
//! ------------------------
//! - `lower < upper`, both finite.
use crate::optimization::errors::{OptError, OptResult};
use argmin::core::{CostFunction, Error, Executor, State, TerminationReason, TerminationStatus};
use argmin::solver::brent::BrentOpt;
use ndarray::ArrayView1;
use tracing::debug;

/// Brent iteration cap used by [`maximize_over_mesh`] callers that have no
/// option of their own.
pub const MESH_REFINE_ITERS: u64 = 100;

/// Result of [`maximize_scalar`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarOutcome {
    pub x: f64,
    pub value: f64,
    pub iterations: u64,
    pub converged: bool,
}

struct UnitInterval<'a, G> {
    f: &'a G,
    lower: f64,
    width: f64,
}

impl<G: Fn(f64) -> OptResult<f64>> CostFunction for UnitInterval<'_, G> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, s: &f64) -> Result<f64, Error> {
        let value = (self.f)(self.lower + self.width * s)?;
        if !value.is_finite() {
            return Err((OptError::NonFiniteCost { value }).into());
        }
        Ok(-value)
    }
}

/// Maximize `f` on `[lower, upper]`.
///
/// Parameters
/// ----------
/// - `f`: function to maximize; errors abort the search.
/// - `lower`, `upper`: search interval.
/// - `max_iters`: cap on Brent iterations.
///
/// Errors
/// ------
/// - `OptError::InvalidBounds` for a non-finite or empty interval.
/// - Any error raised by `f`, or `OptError::NonFiniteCost`.
pub fn maximize_scalar<G>(f: &G, lower: f64, upper: f64, max_iters: u64) -> OptResult<ScalarOutcome>
where
    G: Fn(f64) -> OptResult<f64>,
{
    if !lower.is_finite() || !upper.is_finite() {
        return Err(OptError::InvalidBounds { lower, upper, reason: "Bounds must be finite." });
    }
    if lower >= upper {
        return Err(OptError::InvalidBounds {
            lower,
            upper,
            reason: "Lower bound must be strictly below upper bound.",
        });
    }
    let problem = UnitInterval { f, lower, width: upper - lower };
    let solver = BrentOpt::new(0.0, 1.0);
    let result = Executor::new(problem, solver).configure(|state| state.max_iters(max_iters)).run()?;
    let state = result.state();
    let s = *state.get_best_param().ok_or(OptError::MissingThetaHat)?;
    let value = -state.get_best_cost();
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    let converged = matches!(
        state.get_termination_status(),
        TerminationStatus::Terminated(TerminationReason::SolverConverged)
    );
    Ok(ScalarOutcome { x: lower + (upper - lower) * s, value, iterations: state.get_iter(), converged })
}

/// Maximize `f` over the points of `lags`, then refine between the
/// neighbours of the best point.
///
/// Parameters
/// ----------
/// - `f`: function to maximize; an error on a mesh point aborts the scan.
/// - `lags`: ascending candidate points.
/// - `max_iters`: cap on the Brent refinement.
///
/// Notes
/// -----
/// - Non-finite values on mesh points are skipped.
/// - The refined point is used only when it scores strictly higher than the
///   best mesh point; a failed refinement keeps the mesh point.
///
/// Errors
/// ------
/// - `OptError::InvalidBounds` for an empty mesh.
/// - `OptError::NonFiniteCost` when no mesh point scores finite.
/// - Any error raised by `f` on a mesh point.
pub fn maximize_over_mesh<G>(f: &G, lags: ArrayView1<'_, f64>, max_iters: u64) -> OptResult<ScalarOutcome>
where
    G: Fn(f64) -> OptResult<f64>,
{
    if lags.is_empty() {
        return Err(OptError::InvalidBounds {
            lower: f64::NAN,
            upper: f64::NAN,
            reason: "Mesh has no points.",
        });
    }
    let mut best: Option<(usize, f64)> = None;
    for (index, &x) in lags.iter().enumerate() {
        let value = f(x)?;
        if value.is_finite() && best.is_none_or(|(_, top)| value > top) {
            best = Some((index, value));
        }
    }
    let (index, value) = best.ok_or(OptError::NonFiniteCost { value: f64::NAN })?;
    let on_mesh = ScalarOutcome { x: lags[index], value, iterations: 0, converged: false };

    let lower = lags[index.saturating_sub(1)];
    let upper = lags[(index + 1).min(lags.len() - 1)];
    match maximize_scalar(f, lower, upper, max_iters) {
        Ok(refined) if refined.value > on_mesh.value => Ok(refined),
        Ok(refined) => Ok(ScalarOutcome { converged: refined.converged, ..on_mesh }),
        Err(err) => {
            debug!(error = %err, x = on_mesh.x, "mesh refinement stopped; keeping mesh point");
            Ok(on_mesh)
        }
    }
}
