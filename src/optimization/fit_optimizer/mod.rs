//! fit_optimizer — L-BFGS maximization of smooth curve-fit objectives.
//!
//! Purpose
//! -------
//! Solve the small nonlinear least-squares problems the lag estimators pose
//! (asymmetric polynomial arms, quadratic-family peak fits) through one
//! argmin-backed entry point, [`maximize`].
//!
//! Key behaviors
//! -------------
//! - Objectives implement [`FitObjective`] and are maximized; the adapter
//!   minimizes the negated value.
//! - Missing analytic gradients fall back to finite differences
//!   (central first, forward on failure).
//! - [`FitOutcome::converged`] is only set when a tolerance was met.
//! - [`polish`] refines a seed that is already a usable fit and never
//!   returns anything worse than it.
//!
//! Conventions
//! -----------
//! - Parameters are unconstrained; bounded quantities are mapped through
//!   `numerical_stability::transformations` by the objective itself.
//!
//! Downstream usage
//! ----------------
//! - `estimators::asym_poly_fit` and `estimators::quad_fit`.
pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{maximize, polish};
pub use self::traits::{FitObjective, FitOptions, FitOutcome, LineSearcher, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};
pub use self::validation::validate_theta;

pub mod prelude {
    pub use super::api::{maximize, polish};
    pub use super::traits::{FitObjective, FitOptions, FitOutcome, LineSearcher, Tolerances};
    pub use super::types::{Grad, Theta};
}
