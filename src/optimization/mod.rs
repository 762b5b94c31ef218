//! optimization — solvers, guarded transforms, and one error surface.
//!
//! Purpose
//! -------
//! Give the lag estimators a small set of argmin-backed optimizers without
//! exposing backend types: L-BFGS for smooth curve fits, Brent for bounded
//! scalar searches, and simulated annealing for rough likelihood surfaces.
//!
//! Key behaviors
//! -------------
//! - `fit_optimizer`: maximize a [`FitObjective`](fit_optimizer::FitObjective)
//!   over unconstrained parameters, with a finite-difference fallback when no
//!   analytic gradient exists.
//! - `scalar_search`: bounded 1-D maximization.
//! - `annealing`: seeded simulated annealing over a parameter box that keeps
//!   a log of every trial.
//! - `numerical_stability`: logistic, softplus and box transforms mapping
//!   unconstrained parameters into bounded ones.
//! - `errors`: every failure, argmin's included, becomes an `OptError`.
//!
//! Conventions
//! -----------
//! - Every entry point maximizes; the minimizers see the negated value.
//! - Solver progress is reported through `tracing` at debug level; the
//!   optional `obs_slog` feature adds argmin's slog observer for verbose
//!   L-BFGS runs.
//!
//! Testing notes
//! -------------
//! - Each submodule tests its solver on toy objectives with known optima;
//!   estimator-level behavior is tested in `estimators`.

pub mod annealing;
pub mod errors;
pub mod fit_optimizer;
pub mod numerical_stability;
pub mod scalar_search;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::annealing::{AnnealObjective, AnnealOptions, AnnealOutcome, Perturbation, anneal};
pub use self::errors::{OptError, OptResult};
pub use self::fit_optimizer::{FitObjective, FitOptions, FitOutcome, LineSearcher, maximize};
pub use self::scalar_search::{MESH_REFINE_ITERS, ScalarOutcome, maximize_over_mesh, maximize_scalar};

pub mod prelude {
    pub use super::annealing::{AnnealObjective, AnnealOptions, Perturbation, anneal};
    pub use super::errors::{OptError, OptResult};
    pub use super::fit_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
    pub use super::scalar_search::{maximize_over_mesh, maximize_scalar};
}
