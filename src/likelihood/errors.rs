//! Errors for likelihood evaluation over lag meshes.
use crate::{binning::errors::BinningError, model::errors::ModelError};

/// Result alias for likelihood operations.
pub type LikelihoodResult<T> = Result<T, LikelihoodError>;

#[derive(Debug, Clone, PartialEq)]
pub enum LikelihoodError {
    /// Reference and shifted histograms must have equal length.
    LengthMismatch { reference: usize, shifted: usize },

    /// Relative precision must be finite and inside `(0, 1)`.
    InvalidPrecision { value: f64 },

    /// Strategy name not present in the registry.
    UnknownStrategy { name: String },

    /// A mesh handed to an interpolating scorer is unusable.
    InvalidMesh { reason: &'static str },

    /// The scorer cannot re-evaluate under a different detector relation.
    NuisanceUnsupported,

    // ---- Wrapped ----
    Model(ModelError),
    Binning(BinningError),
}

impl std::error::Error for LikelihoodError {}

impl std::fmt::Display for LikelihoodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LikelihoodError::LengthMismatch { reference, shifted } => write!(
                f,
                "Histogram length mismatch: reference has {reference} bins, shifted has {shifted}"
            ),
            LikelihoodError::InvalidPrecision { value } => {
                write!(f, "Invalid relative precision {value}: must lie in (0, 1).")
            }
            LikelihoodError::UnknownStrategy { name } => write!(
                f,
                "Unknown likelihood strategy '{name}'. Valid options are 'exact_sum', \
                 'closed_form' or 'cross_covariance'."
            ),
            LikelihoodError::InvalidMesh { reason } => write!(f, "Invalid likelihood mesh: {reason}"),
            LikelihoodError::NuisanceUnsupported => {
                write!(f, "Scorer cannot evaluate under alternative detector relations.")
            }
            LikelihoodError::Model(e) => write!(f, "Detector relation error: {e}"),
            LikelihoodError::Binning(e) => write!(f, "Binning error: {e}"),
        }
    }
}

impl From<ModelError> for LikelihoodError {
    fn from(err: ModelError) -> Self {
        LikelihoodError::Model(err)
    }
}

impl From<BinningError> for LikelihoodError {
    fn from(err: BinningError) -> Self {
        LikelihoodError::Binning(err)
    }
}
