//! Errors for the end-to-end lag pipeline.
//!
//! `MissingInput` is the abstain signal: an upstream record was absent and
//! the caller should skip the pair rather than treat it as a failure. Every
//! other variant wraps the stage that failed.
use crate::{
    binning::errors::BinningError, estimators::errors::EstimatorError,
    likelihood::errors::LikelihoodError,
};

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    // ---- Input ----
    /// A required series was not supplied.
    MissingInput { field: &'static str },

    // ---- Wrapped ----
    Binning(BinningError),
    Likelihood(LikelihoodError),
    Estimator(EstimatorError),
}

impl PipelineError {
    /// True when the pipeline abstained for lack of input.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, PipelineError::MissingInput { .. })
    }
}

impl std::error::Error for PipelineError {}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::MissingInput { field } => {
                write!(f, "Missing input '{field}': no estimate produced.")
            }
            PipelineError::Binning(e) => write!(f, "Binning error: {e}"),
            PipelineError::Likelihood(e) => write!(f, "Likelihood error: {e}"),
            PipelineError::Estimator(e) => write!(f, "Estimator error: {e}"),
        }
    }
}

impl From<BinningError> for PipelineError {
    fn from(err: BinningError) -> Self {
        PipelineError::Binning(err)
    }
}

impl From<LikelihoodError> for PipelineError {
    fn from(err: LikelihoodError) -> Self {
        PipelineError::Likelihood(err)
    }
}

impl From<EstimatorError> for PipelineError {
    fn from(err: EstimatorError) -> Self {
        PipelineError::Estimator(err)
    }
}
