//! fit_optimizer::builders — L-BFGS solver construction.
//!
//! Purpose
//! -------
//! Hide argmin's generic wiring behind two builders keyed by line search and
//! apply the tolerances from [`FitOptions`]. The initial parameter vector and
//! the iteration cap are runtime concerns left to [`run_lbfgs`](super::run::run_lbfgs).
//!
//! Invariants & assumptions
//! ------------------------
//! - The L-BFGS memory is `opts.lbfgs_mem` or [`DEFAULT_LBFGS_MEM`].
//! - Tolerances rejected by argmin surface as `OptError` via `From<Error>`.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    fit_optimizer::{
        traits::FitOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

pub fn build_optimizer_hager_zhang(opts: &FitOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

pub fn build_optimizer_more_thuente(opts: &FitOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the optional gradient and cost-change tolerances to an L-BFGS
/// solver with any line search.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &FitOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::fit_optimizer::traits::{LineSearcher, Tolerances};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction of both line-search variants with default and explicit
    //   memory.
    //
    // They intentionally DO NOT cover:
    // - Executor behavior, exercised through `maximize` in `api`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Both builders succeed with default memory and valid tolerances.
    fn builders_succeed_with_default_memory() {
        // Arrange
        let tols = Tolerances::new(Some(1e-6), Some(1e-8), Some(50)).unwrap();
        let hz = FitOptions::new(tols, LineSearcher::HagerZhang, false, None).unwrap();
        let mt = FitOptions::new(tols, LineSearcher::MoreThuente, false, None).unwrap();

        // Act / Assert
        assert!(build_optimizer_hager_zhang(&hz).is_ok());
        assert!(build_optimizer_more_thuente(&mt).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // An explicit memory size and a grad-only tolerance set are accepted.
    fn builders_accept_explicit_memory_and_partial_tolerances() {
        let tols = Tolerances::new(Some(1e-6), None, Some(25)).unwrap();
        let opts = FitOptions::new(tols, LineSearcher::HagerZhang, false, Some(11)).unwrap();

        assert!(build_optimizer_hager_zhang(&opts).is_ok());
        assert!(build_optimizer_more_thuente(&opts).is_ok());
    }
}
