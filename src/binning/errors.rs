//! Errors for series binning and lag-mesh construction.
use crate::{model::errors::ModelError, series::errors::SeriesError};

/// Result alias for binning operations.
pub type BinningResult<T> = Result<T, BinningError>;

#[derive(Debug, Clone, PartialEq)]
pub enum BinningError {
    // ---- Options ----
    /// A binning option is out of range.
    InvalidOption { name: &'static str, value: f64, reason: &'static str },

    /// Mesh spacing must be finite and strictly positive.
    InvalidMeshSpacing { value: f64 },

    /// Lags passed to a shifted histogram must be finite.
    NonFiniteLag { index: usize, value: f64 },

    // ---- Wrapped ----
    Series(SeriesError),
    Model(ModelError),
}

impl std::error::Error for BinningError {}

impl std::fmt::Display for BinningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinningError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid binning option {name} = {value}: {reason}")
            }
            BinningError::InvalidMeshSpacing { value } => {
                write!(f, "Invalid mesh spacing {value}: must be finite and positive.")
            }
            BinningError::NonFiniteLag { index, value } => {
                write!(f, "Non-finite lag at index {index}: {value}")
            }
            BinningError::Series(e) => write!(f, "Series error: {e}"),
            BinningError::Model(e) => write!(f, "Detector relation error: {e}"),
        }
    }
}

impl From<SeriesError> for BinningError {
    fn from(err: SeriesError) -> Self {
        BinningError::Series(err)
    }
}

impl From<ModelError> for BinningError {
    fn from(err: ModelError) -> Self {
        BinningError::Model(err)
    }
}
