//! Public surface for bounded curve fits solved by L-BFGS.
//!
//! - [`FitObjective`]: the trait a fit implements (value, check, optional
//!   analytic gradient).
//! - [`FitOptions`] and [`Tolerances`]: solver configuration.
//! - [`LineSearcher`]: line search used inside L-BFGS.
//! - [`FitOutcome`]: normalized result of [`maximize`](super::maximize).
//!
//! Convention: objectives are *maximized*. A least-squares fit therefore
//! reports `-SSE(θ)` from `value`, and an analytic gradient is the gradient
//! of that objective; the adapter flips signs for the minimizer.
use crate::optimization::{
    errors::{OptError, OptResult},
    fit_optimizer::{
        types::{Cost, FnEvalMap, Grad, Theta},
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// Objective evaluated on an unconstrained parameter vector.
///
/// - `type Data`: observations carried into `value` / `grad` / `check`.
///
/// Required:
/// - `value(&Theta, &Data)`: objective to maximize.
/// - `check(&Theta, &Data)`: reject an unusable starting point or data set.
///   Called once before the solver starts.
///
/// Optional:
/// - `grad(&Theta, &Data)`: analytic gradient of `value`. When absent the
///   adapter falls back to finite differences of the cost.
pub trait FitObjective {
    type Data;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Line search used inside the L-BFGS solver.
///
/// Parses case-insensitively from `"MoreThuente"` or `"HagerZhang"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Solver configuration for a single curve fit.
///
/// Default
/// -------
/// - `tols`: `tol_grad = 1e-8`, `tol_cost = 1e-12`, `max_iter = 500`.
/// - `line_searcher`: `MoreThuente`.
/// - `verbose`: `false` (only meaningful with the `obs_slog` feature).
/// - `lbfgs_mem`: `None`, meaning [`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM).
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl FitOptions {
    /// Build options, rejecting a zero L-BFGS memory. Numeric tolerances are
    /// validated by [`Tolerances::new`].
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(mem) = lbfgs_mem {
            if mem == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-8), tol_cost: Some(1e-12), max_iter: Some(500) },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Termination tolerances and iteration cap. At least one must be set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// Errors
    /// ------
    /// - `OptError::NoTolerancesProvided` if all three are `None`.
    /// - `OptError::InvalidTolGrad` / `OptError::InvalidTolCost` for
    ///   non-finite or non-positive tolerances.
    /// - `OptError::InvalidMaxIter` if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if max_iter == Some(0) {
            return Err(OptError::InvalidMaxIter {
                max_iter: 0,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Result of a curve fit.
///
/// - `theta_hat`: best unconstrained parameters.
/// - `value`: objective at `theta_hat` (not the cost).
/// - `converged`: `true` only when the solver met a tolerance. Hitting the
///   iteration cap is reported as not converged.
/// - `status`: termination status rendered as text.
/// - `fn_evals`: argmin's evaluation counters (`cost_count`, ...).
/// - `grad_norm`: norm of the last gradient, when available.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl FitOutcome {
    /// Build a validated outcome from raw solver state.
    ///
    /// Errors
    /// ------
    /// - Propagates `validate_theta_hat` / `validate_value` failures.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let converged = matches!(
            termination,
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached
            )
        );
        let status = format!("{termination:?}");
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Only tolerance-based termination counts as convergence.
    //
    // Given
    // -----
    // - The same finite state reported with three termination statuses.
    //
    // Expect
    // ------
    // - `SolverConverged` converges; `MaxItersReached` and `NotTerminated`
    //   do not.
    fn outcome_converged_flag_tracks_termination_reason() {
        let build = |status| {
            FitOutcome::new(Some(array![1.0]), -0.5, status, 3, FnEvalMap::new(), None).unwrap()
        };

        let solved = build(TerminationStatus::Terminated(TerminationReason::SolverConverged));
        let capped = build(TerminationStatus::Terminated(TerminationReason::MaxItersReached));
        let running = build(TerminationStatus::NotTerminated);

        assert!(solved.converged);
        assert!(!capped.converged);
        assert!(!running.converged);
        assert_eq!(solved.iterations, 3);
    }

    #[test]
    // Purpose
    // -------
    // Option constructors reject empty tolerance sets and zero memory.
    fn options_validation_rejects_degenerate_settings() {
        assert_eq!(Tolerances::new(None, None, None).unwrap_err(), OptError::NoTolerancesProvided);
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { max_iter: 0, .. })
        ));
        let tols = Tolerances::new(Some(1e-6), None, Some(10)).unwrap();
        assert!(matches!(
            FitOptions::new(tols, LineSearcher::HagerZhang, false, Some(0)),
            Err(OptError::InvalidLBFGSMem { mem: 0, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Line searches parse case-insensitively and unknown names are errors.
    fn line_searcher_parses_case_insensitively() {
        assert_eq!("hagerZHANG".parse::<LineSearcher>().unwrap(), LineSearcher::HagerZhang);
        assert_eq!("MoreThuente".parse::<LineSearcher>().unwrap(), LineSearcher::MoreThuente);
        assert!(matches!("bfgs".parse::<LineSearcher>(), Err(OptError::InvalidLineSearch { .. })));
    }
}
