//! Errors for the two-detector Poisson relation model.

/// Result alias for detector-relation operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Construction ----
    /// Background rates must be finite and non-negative.
    InvalidBackground { detector: usize, value: f64 },

    /// Sensitivity ratio must be finite and strictly positive.
    InvalidSensitivityRatio { value: f64 },

    /// Source suppression must be finite and at least 1.
    InvalidSuppression { value: f64 },

    /// Durations and bin widths must be finite and strictly positive.
    InvalidInterval { name: &'static str, value: f64 },

    // ---- Scoring ----
    /// Both histograms must have the same number of bins.
    HistogramLengthMismatch { reference: usize, shifted: usize },

    /// Histogram entries must be finite, non-negative counts.
    InvalidCount { index: usize, value: f64 },

    /// Relative precision must be finite and inside `(0, 1)`.
    InvalidPrecision { value: f64 },
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Construction ----
            ModelError::InvalidBackground { detector, value } => {
                write!(f, "Invalid background rate for detector {detector}: {value}, must be finite and >= 0")
            }
            ModelError::InvalidSensitivityRatio { value } => {
                write!(f, "Invalid sensitivity ratio {value}: must be finite and > 0")
            }
            ModelError::InvalidSuppression { value } => {
                write!(f, "Invalid source suppression {value}: must be finite and >= 1")
            }
            ModelError::InvalidInterval { name, value } => {
                write!(f, "Invalid {name} {value}: must be finite and > 0")
            }

            // ---- Scoring ----
            ModelError::HistogramLengthMismatch { reference, shifted } => {
                write!(f, "Histogram length mismatch: reference has {reference} bins, shifted has {shifted}")
            }
            ModelError::InvalidCount { index, value } => {
                write!(f, "Invalid histogram count at bin {index}: {value}, must be a finite non-negative count")
            }
            ModelError::InvalidPrecision { value } => {
                write!(f, "Invalid relative precision {value}: must be finite and in (0, 1)")
            }
        }
    }
}
