//! numerics — polynomial fits, quadrature, and log-space helpers.
//!
//! Purpose
//! -------
//! Collect the small numerical kernels shared by the likelihood models and
//! the lag estimators so that each estimator reads as a short composition of
//! well-tested pieces.
//!
//! Key behaviors
//! -------------
//! - [`polynomial`]: weighted least-squares power-basis fits (SVD via
//!   `nalgebra`), derivatives, antiderivatives, and companion-matrix roots.
//! - [`quadrature`]: trapezium rule, running integrals, linear
//!   interpolation, and inverse lookup of cumulative curves.
//! - [`special`]: `xlogy` and a streaming log-sum-exp accumulator.
//! - [`weights`]: point-weighting schemes for curve fits.
//!
//! Conventions
//! -----------
//! - Arrays are `ndarray` views over `f64`; abscissae are sorted ascending.
//! - Fallible routines return [`NumericsResult`]; nothing here logs.

pub mod errors;
pub mod polynomial;
pub mod quadrature;
pub mod special;
pub mod weights;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{NumericsError, NumericsResult};
pub use self::polynomial::{
    DomainMap, MappedPolynomial, Polynomial, fit_polynomial, fit_power_basis,
};
pub use self::quadrature::{cumulative_trapezoid, interp, inverse_cumulative, trapezoid};
pub use self::special::{LogSumExp, xlogy};
pub use self::weights::CurveWeights;

pub mod prelude {
    pub use super::errors::{NumericsError, NumericsResult};
    pub use super::polynomial::{DomainMap, MappedPolynomial, Polynomial};
    pub use super::weights::CurveWeights;
}
