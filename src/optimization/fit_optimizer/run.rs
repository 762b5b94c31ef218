//! Execute an L-BFGS solver on a [`CostAdapter`] and normalize the result
//! into a [`FitOutcome`].
use crate::optimization::{
    errors::OptResult,
    fit_optimizer::{
        adapter::CostAdapter,
        traits::{FitObjective, FitOptions, FitOutcome},
        types::{Grad, Theta},
    },
};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin::core::{Executor, IterState, Solver, State};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;
use tracing::debug;

/// Run `solver` from `theta0` and report the best parameters found.
///
/// Notes
/// -----
/// - `opts.tols.max_iter` caps the executor; tolerances were applied by the
///   builder.
/// - With the `obs_slog` feature and `opts.verbose`, the initial objective
///   and a per-iteration observer are printed.
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &FitOptions, problem: CostAdapter<'a, F>, solver: S,
) -> OptResult<FitOutcome>
where
    F: FitObjective,
    S: Solver<CostAdapter<'a, F>, IterState<Theta, Grad, (), (), (), f64>>,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    debug!(iterations, status = ?termination, "l-bfgs fit finished");
    let grad = result.take_gradient();
    FitOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}

#[cfg(feature = "obs_slog")]
fn log_initial_state<F: FitObjective>(
    theta0: &Theta, problem: &CostAdapter<'_, F>,
) -> OptResult<()> {
    let value0 = -problem.cost(theta0)?;
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());
    eprintln!(
        "init: objective(theta0) = {:.6}{}",
        value0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}
