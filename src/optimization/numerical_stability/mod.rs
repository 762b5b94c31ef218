//! numerical_stability — guarded transforms for bounded curve fits.
//!
//! Purpose
//! -------
//! Let the fitting code optimize over unconstrained parameters while the
//! fitted quantities stay inside their physical boxes: peak positions inside
//! the lag mesh, curvatures strictly negative, variances inside a window.
//!
//! Key behaviors
//! -------------
//! - Stable logistic/logit and softplus/inverse-softplus pairs.
//! - [`BoxTransform`] for `ℝ ↔ [lower, upper]`, exposing its derivative so
//!   analytic gradients can apply the chain rule.
//!
//! Invariants & assumptions
//! ------------------------
//! - All helpers are total on finite inputs and saturate rather than
//!   overflow in the tails.
//!
//! Downstream usage
//! ----------------
//! - The asymmetric-arm polynomial fit bounds its peak with a logistic and
//!   its quadratic coefficients with a negated softplus.
//! - The quadratic-template fit bounds all three parameters with
//!   [`BoxTransform`].

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    BoxTransform, LOGIT_EPS, safe_logistic, safe_logit, safe_softplus, safe_softplus_inv,
};

pub mod prelude {
    pub use super::transformations::{
        BoxTransform, safe_logistic, safe_logit, safe_softplus, safe_softplus_inv,
    };
}
