//! High-level entry point for maximizing a [`FitObjective`].
//!
//! Picks the L-BFGS variant from `opts.line_searcher`, wraps the objective
//! in a [`CostAdapter`] and delegates to [`run_lbfgs`]. [`polish`] runs the
//! same solver from a seed that is already an acceptable fit.
use crate::optimization::{
    errors::{OptError, OptResult},
    fit_optimizer::{
        adapter::CostAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{FitObjective, FitOptions, FitOutcome, LineSearcher},
        types::{FnEvalMap, Theta},
    },
};
use tracing::debug;

/// Maximize `f` over unconstrained `θ` starting from `theta0`.
///
/// Errors
/// ------
/// - Anything returned by `f.check` before the solver starts.
/// - Solver and evaluation failures mapped into `OptError`.
pub fn maximize<F: FitObjective>(
    f: &F, theta0: Theta, data: &F::Data, opts: &FitOptions,
) -> OptResult<FitOutcome> {
    f.check(&theta0, data)?;
    let problem = CostAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

/// Improve an acceptable fit `seed` with L-BFGS.
///
/// Returns whichever of the seed and the solver's best point has the larger
/// objective. `converged` is set only when the solver met a tolerance and
/// its point was kept; a solver error keeps the seed with the error text as
/// `status`.
///
/// Errors
/// ------
/// - Anything returned by `f.check` or by evaluating the seed.
/// - `OptError::NonFiniteCost` when the seed objective is not finite.
pub fn polish<F: FitObjective>(
    f: &F, seed: Theta, data: &F::Data, opts: &FitOptions,
) -> OptResult<FitOutcome> {
    f.check(&seed, data)?;
    let seed_value = f.value(&seed, data)?;
    if !seed_value.is_finite() {
        return Err(OptError::NonFiniteCost { value: seed_value });
    }
    match maximize(f, seed.clone(), data, opts) {
        Ok(outcome) if outcome.value >= seed_value => Ok(outcome),
        Ok(outcome) => Ok(FitOutcome {
            theta_hat: seed,
            value: seed_value,
            converged: false,
            grad_norm: None,
            ..outcome
        }),
        Err(err) => {
            debug!(error = %err, "l-bfgs polish stopped; keeping the seed");
            Ok(FitOutcome {
                theta_hat: seed,
                value: seed_value,
                converged: false,
                status: err.to_string(),
                iterations: 0,
                fn_evals: FnEvalMap::new(),
                grad_norm: None,
            })
        }
    }
}
