//! Errors for lag estimation.
//!
//! Only two variants escape [`estimate_lag`](super::LagEstimator::estimate_lag):
//! `LengthMismatch` and `DegenerateMesh`. Every other failure raised inside a
//! strategy is recovered into the default estimate by the base contract.
use crate::{
    likelihood::errors::LikelihoodError, numerics::errors::NumericsError,
    optimization::errors::OptError,
};

/// Result alias for estimator operations.
pub type EstimatorResult<T> = Result<T, EstimatorError>;

#[derive(Debug, Clone, PartialEq)]
pub enum EstimatorError {
    // ---- Input ----
    /// Lag and likelihood arrays must have equal length.
    LengthMismatch { lags: usize, values: usize },

    /// Not enough usable mesh points to estimate anything.
    DegenerateMesh { usable: usize, reason: &'static str },

    // ---- Strategy ----
    /// A fit produced no usable answer.
    FitFailed { strategy: &'static str, reason: String },

    /// An estimator option is out of range.
    InvalidOption { name: &'static str, value: f64, reason: &'static str },

    /// Strategy name not present in the registry.
    UnknownStrategy { name: String },

    // ---- Wrapped ----
    Optimizer(OptError),
    Numerics(NumericsError),
    Likelihood(LikelihoodError),
}

impl std::error::Error for EstimatorError {}

impl std::fmt::Display for EstimatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimatorError::LengthMismatch { lags, values } => {
                write!(f, "Length mismatch: {lags} lags but {values} likelihood values")
            }
            EstimatorError::DegenerateMesh { usable, reason } => {
                write!(f, "Degenerate lag mesh ({usable} usable points): {reason}")
            }
            EstimatorError::FitFailed { strategy, reason } => {
                write!(f, "{strategy} fit failed: {reason}")
            }
            EstimatorError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid estimator option {name} = {value}: {reason}")
            }
            EstimatorError::UnknownStrategy { name } => {
                write!(f, "Unknown lag estimator '{name}'.")
            }
            EstimatorError::Optimizer(e) => write!(f, "Optimizer error: {e}"),
            EstimatorError::Numerics(e) => write!(f, "Numerics error: {e}"),
            EstimatorError::Likelihood(e) => write!(f, "Likelihood error: {e}"),
        }
    }
}

impl From<OptError> for EstimatorError {
    fn from(err: OptError) -> Self {
        EstimatorError::Optimizer(err)
    }
}

impl From<NumericsError> for EstimatorError {
    fn from(err: NumericsError) -> Self {
        EstimatorError::Numerics(err)
    }
}

impl From<LikelihoodError> for EstimatorError {
    fn from(err: LikelihoodError) -> Self {
        EstimatorError::Likelihood(err)
    }
}
