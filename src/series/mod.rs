//! series — detector event streams and their binning primitives.
//!
//! Purpose
//! -------
//! Represent one detector's raw arrival times together with the interval over
//! which the data are valid, and answer the counting and histogram queries
//! used to build binned comparisons between detectors.
//!
//! Key behaviors
//! -------------
//! - [`TimeSeries`] validates sorted, finite events inside declared bounds.
//! - Counting (`integral`) and equal-width histograms (`histogram`) are
//!   pure, allocation-light queries on the sorted buffer.
//!
//! Downstream usage
//! ----------------
//! - The `binning` module reads two series to build the reference histogram,
//!   the detector relation counts, and the lag-shifted histograms.
//! - Callers typically import via `series::prelude::*`.

pub mod errors;
pub mod time_series;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{SeriesError, SeriesResult};
pub use self::time_series::TimeSeries;

pub mod prelude {
    pub use super::errors::{SeriesError, SeriesResult};
    pub use super::time_series::TimeSeries;
}
