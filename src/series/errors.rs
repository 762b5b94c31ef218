//! Errors for event time series (construction and histogram requests).
//!
//! Conventions
//! -----------
//! - Indices are 0-based positions into the event-time buffer.
//! - Validity bounds are closed intervals `[start, stop]` in the same time
//!   unit as the events (seconds throughout the crate).

/// Result alias for time-series operations that may produce [`SeriesError`].
pub type SeriesResult<T> = Result<T, SeriesError>;

/// Error type for [`TimeSeries`](crate::series::TimeSeries) construction and
/// binning requests.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesError {
    // ---- Construction ----
    /// No events and no explicit bounds to infer a validity window from.
    EmptySeries,

    /// An event time is NaN/±inf.
    NonFiniteTime { index: usize, value: f64 },

    /// Event times must be non-decreasing.
    UnsortedTimes { index: usize, previous: f64, value: f64 },

    /// Validity bounds must be finite with `start < stop`.
    InvalidBounds { start: f64, stop: f64, reason: &'static str },

    /// An event lies outside the declared validity bounds.
    EventOutsideBounds { index: usize, value: f64, start: f64, stop: f64 },

    // ---- Histogram requests ----
    /// Histograms need at least one bin.
    InvalidBinCount { n_bins: usize },

    /// Histogram range must be finite with `start < stop`.
    InvalidHistogramRange { start: f64, stop: f64 },
}

impl std::error::Error for SeriesError {}

impl std::fmt::Display for SeriesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Construction ----
            SeriesError::EmptySeries => {
                write!(f, "Time series has no events to infer validity bounds from")
            }
            SeriesError::NonFiniteTime { index, value } => {
                write!(f, "Non-finite event time at index {index}: {value}")
            }
            SeriesError::UnsortedTimes { index, previous, value } => {
                write!(
                    f,
                    "Event times must be sorted: index {index} holds {value} after {previous}"
                )
            }
            SeriesError::InvalidBounds { start, stop, reason } => {
                write!(f, "Invalid validity bounds [{start}, {stop}]: {reason}")
            }
            SeriesError::EventOutsideBounds { index, value, start, stop } => {
                write!(f, "Event {index} at {value} lies outside validity bounds [{start}, {stop}]")
            }

            // ---- Histogram requests ----
            SeriesError::InvalidBinCount { n_bins } => {
                write!(f, "Invalid histogram bin count {n_bins}: must be at least 1")
            }
            SeriesError::InvalidHistogramRange { start, stop } => {
                write!(f, "Invalid histogram range [{start}, {stop}]: must be finite and increasing")
            }
        }
    }
}
