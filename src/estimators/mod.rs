//! estimators — turning a likelihood curve into a lag with uncertainty.
//!
//! Purpose
//! -------
//! Offer ten interchangeable strategies for reading a `(lag,
//! log-likelihood)` curve, all returning the same [`LagEstimate`] shape
//! under one post-processing contract.
//!
//! Key behaviors
//! -------------
//! - [`LagEstimator`] is the capability; `estimate_lag` wraps a strategy's
//!   `estimate` in the [`base`] contract: sort, drop non-finite points,
//!   substitute the midpoint default on failure, clamp `dt` and each error
//!   side, and derive `var = dt_err²`.
//! - Strategies: [`RawMax`], [`PolyFit`], [`AsymPolyFit`], [`FixedPolyFit`],
//!   [`CumProb`], [`MeanVar`], [`PolyCum`], [`GaussSmooth`], [`QuadFit`],
//!   [`AnnealLag`].
//! - [`EstimatorChoice`] is the registry; names parse via `FromStr`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `dt` lies inside the mesh range and every error side inside
//!   `[ε · span, distance to that edge]` (the floor wins if larger).
//! - Only `LengthMismatch` and `DegenerateMesh` escape `estimate_lag`;
//!   every strategy failure is logged and replaced by the default.
//! - All strategies except annealing are deterministic; annealing is
//!   deterministic under a seed.
//!
//! Downstream usage
//! ----------------
//! - `pipeline` calls `estimate_scored` so annealing can re-bin at
//!   arbitrary lags; mesh-only callers use `estimate_lag`.
//!
//! Testing notes
//! -------------
//! - Each strategy has unit tests on exact curves; the contract invariants
//!   are property-tested in `tests/estimator_properties.rs`.
pub mod anneal;
pub mod asym_poly_fit;
pub mod base;
pub mod choice;
pub mod cum_prob;
pub mod errors;
pub mod estimator;
pub mod fixed_poly_fit;
pub mod gauss_smooth;
pub mod mean_var;
pub mod poly_cum;
pub mod poly_fit;
pub mod quad_fit;
pub mod raw_max;
pub mod types;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::anneal::{AnnealLag, PostHoc};
pub use self::asym_poly_fit::{ArmPolynomials, AsymPolyFit};
pub use self::base::{ERR_CEILING_SCALE, apply_contract, default_estimate, prepare_mesh};
pub use self::choice::EstimatorChoice;
pub use self::cum_prob::{CumProb, ONE_SIDED_MASS, normalized_cumulative};
pub use self::errors::{EstimatorError, EstimatorResult};
pub use self::estimator::LagEstimator;
pub use self::fixed_poly_fit::FixedPolyFit;
pub use self::gauss_smooth::{GaussSmooth, GaussianSmoother};
pub use self::mean_var::MeanVar;
pub use self::poly_cum::{PolyCum, QuantileMethod};
pub use self::poly_fit::PolyFit;
pub use self::quad_fit::{QuadCost, QuadFit};
pub use self::raw_max::RawMax;
pub use self::types::{
    AnnealTrace, LagEstimate, LikelihoodFit, PartialEstimate, Spread, Uncertainty,
};

pub mod prelude {
    pub use super::choice::EstimatorChoice;
    pub use super::errors::{EstimatorError, EstimatorResult};
    pub use super::estimator::LagEstimator;
    pub use super::types::{LagEstimate, LikelihoodFit, Spread};
}
