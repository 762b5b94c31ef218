//! Error surface for the optimization layer.
//!
//! Conventions
//! -----------
//! - Backend (`argmin`) errors are normalized into [`OptError`] through the
//!   `From<argmin::core::Error>` conversion so callers never match on
//!   `argmin` types.
//! - Fit objectives report domain problems through the same enum.
use argmin::core::{ArgminError, Error};

/// Result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Objective has no analytic gradient; finite differences are used.
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch { expected: usize, found: usize },

    /// Gradient elements need to be finite.
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- FitOptions ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad { tol: f64, reason: &'static str },

    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost { tol: f64, reason: &'static str },

    /// Maximum iterations needs to be positive.
    InvalidMaxIter { max_iter: usize, reason: &'static str },

    /// At least one stopping rule must be provided.
    NoTolerancesProvided,

    /// Unknown line searcher name.
    InvalidLineSearch { name: String, reason: &'static str },

    /// L-BFGS memory needs to be at least 1.
    InvalidLBFGSMem { mem: usize, reason: &'static str },

    // ---- Objective ----
    /// Objective returned a non-finite value.
    NonFiniteCost { value: f64 },

    /// Unconstrained parameter vector has the wrong length.
    ThetaLengthMismatch { expected: usize, actual: usize },

    /// Unconstrained parameters must be finite.
    InvalidThetaInput { index: usize, value: f64 },

    /// Search interval must be finite with `lower < upper`.
    InvalidBounds { lower: f64, upper: f64, reason: &'static str },

    /// The objective could not be evaluated.
    ObjectiveFailed { text: String },

    // ---- Outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },

    /// Solver finished without a best parameter.
    MissingThetaHat,

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter { text: String },
    /// Wrapper for argmin::NotImplemented
    NotImplemented { text: String },
    /// Wrapper for argmin::NotInitialized
    NotInitialized { text: String },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated { text: String },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound { text: String },
    /// Wrapper for argmin::PotentialBug
    PotentialBug { text: String },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError { text: String },
    /// Wrapper for other argmin::Error types
    BackendError { text: String },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => write!(f, "Analytic gradient not implemented"),
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- FitOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => write!(f, "No stopping rule provided"),
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }

            // ---- Objective ----
            OptError::NonFiniteCost { value } => write!(f, "Non-finite objective value: {value}"),
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }
            OptError::InvalidBounds { lower, upper, reason } => {
                write!(f, "Invalid search interval [{lower}, {upper}]: {reason}")
            }
            OptError::ObjectiveFailed { text } => write!(f, "Objective evaluation failed: {text}"),

            // ---- Outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => write!(f, "Solver returned no best parameter"),

            // ---- Argmin ----
            OptError::InvalidParameter { text } => write!(f, "Invalid parameter: {text}"),
            OptError::NotImplemented { text } => write!(f, "Not implemented: {text}"),
            OptError::NotInitialized { text } => write!(f, "Not initialized: {text}"),
            OptError::ConditionViolated { text } => write!(f, "Condition violated: {text}"),
            OptError::CheckPointNotFound { text } => write!(f, "Checkpoint not found: {text}"),
            OptError::PotentialBug { text } => write!(f, "Potential bug: {text}"),
            OptError::ImpossibleError { text } => write!(f, "Impossible error: {text}"),
            OptError::BackendError { text } => write!(f, "Backend error: {text}"),

            // ---- Fallback ----
            OptError::UnknownError => write!(f, "Unknown error"),
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        match original_err.downcast::<OptError>() {
            Ok(opt_err) => opt_err,
            Err(err) => match err.downcast() {
                Ok(argmin_err) => match argmin_err {
                    ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                    ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                    ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                    ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                    ArgminError::CheckpointNotFound { text } => {
                        OptError::CheckPointNotFound { text }
                    }
                    ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                    ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                    _ => OptError::UnknownError,
                },
                Err(err) => OptError::BackendError { text: err.to_string() },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // - Round-tripping crate errors through `argmin::core::Error`.
    // - Mapping of `ArgminError` variants and foreign errors.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // An `OptError` raised inside an objective and carried through argmin's
    // error type comes back out unchanged.
    fn opt_error_round_trips_through_backend_error() {
        let original = OptError::NonFiniteCost { value: f64::INFINITY };

        let wrapped: Error = original.clone().into();

        assert_eq!(OptError::from(wrapped), original);
    }

    #[test]
    // Purpose
    // -------
    // Argmin's own variants map onto the matching wrapper and anything else
    // becomes `BackendError`.
    fn argmin_errors_map_to_wrappers() {
        let argmin_err: Error =
            ArgminError::InvalidParameter { text: "bad temp".to_string() }.into();
        let foreign: Error = Error::msg("disk on fire");

        assert_eq!(OptError::from(argmin_err), OptError::InvalidParameter {
            text: "bad temp".to_string()
        });
        assert!(matches!(OptError::from(foreign), OptError::BackendError { .. }));
    }
}
