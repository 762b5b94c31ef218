//! likelihood — scoring candidate lags.
//!
//! Purpose
//! -------
//! Turn a lag mesh of detector-2 histograms into one score per lag, using
//! an interchangeable strategy chosen at configuration time.
//!
//! Key behaviors
//! -------------
//! - [`LikelihoodEvaluator`] is the capability every strategy implements;
//!   mesh evaluation is row-independent (rayon with `parallel`).
//! - Strategies: [`ExactSum`] (marginal Poisson mixture), [`ClosedFormApprox`]
//!   (per-bin profile over the shared rate), [`CrossCovariance`] (coarse
//!   proxy).
//! - [`LikelihoodChoice`] is the registry; names parse via `FromStr`.
//! - [`LagScorer`] scores off-mesh lags for global search.
//!
//! Downstream usage
//! ----------------
//! - `pipeline` evaluates the mesh and hands the scores to `estimators`.
//! - `estimators::anneal` consumes a `LagScorer`.
pub mod choice;
pub mod closed_form;
pub mod cross_covariance;
pub mod errors;
pub mod evaluator;
pub mod exact_sum;
pub mod scorer;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::choice::LikelihoodChoice;
pub use self::closed_form::ClosedFormApprox;
pub use self::cross_covariance::CrossCovariance;
pub use self::errors::{LikelihoodError, LikelihoodResult};
pub use self::evaluator::LikelihoodEvaluator;
pub use self::exact_sum::{DEFAULT_REL_PRECISION, ExactSum};
pub use self::scorer::{BinnedScorer, LagScorer, MeshInterpolator};

pub mod prelude {
    pub use super::choice::LikelihoodChoice;
    pub use super::errors::{LikelihoodError, LikelihoodResult};
    pub use super::evaluator::LikelihoodEvaluator;
    pub use super::scorer::LagScorer;
}
