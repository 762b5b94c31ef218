//! Validated event-time series with declared data-validity bounds.
//!
//! Purpose
//! -------
//! Hold the raw, sorted arrival times recorded by one detector together with
//! the interval over which the detector was live. Provide the two queries the
//! binning stage relies on: event counts over an arbitrary closed interval and
//! equal-width histograms over an arbitrary range.
//!
//! Key behaviors
//! -------------
//! - [`TimeSeries::new`] validates finiteness, ordering, and containment of
//!   every event inside `[start, stop]`.
//! - [`TimeSeries::integral`] counts events with `start <= t <= stop` using
//!   binary search on the sorted buffer.
//! - [`TimeSeries::histogram`] bins events into `n_bins` equal bins. Requests
//!   that reach outside the validity bounds are honored (those regions are
//!   simply empty) and emit a `tracing` warning.
//!
//! Invariants & assumptions
//! ------------------------
//! - Event times are finite and non-decreasing.
//! - `start < stop`, both finite, and every event lies in `[start, stop]`.
//! - Histogram bins are half-open `[e_i, e_{i+1})` except the last, which
//!   also includes its right edge, so every event in range lands in exactly
//!   one bin.
//!
//! Conventions
//! -----------
//! - Counts are returned as `f64` so they can flow directly into likelihood
//!   arithmetic and `ndarray` batch operations.
//! - The last histogram edge is set to `stop` exactly rather than accumulated
//!   from `start + n * width`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover construction failures, closed-interval counting, edge
//!   placement, right-edge inclusion, and zero-filled out-of-bounds ranges.
use crate::series::errors::{SeriesError, SeriesResult};
use ndarray::{Array1, ArrayView1};
use tracing::warn;

/// `TimeSeries` — sorted event times plus a validity window.
///
/// Fields
/// ------
/// - `times`: event arrival times, finite and non-decreasing.
/// - `start`, `stop`: closed validity bounds; `start < stop`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    times: Vec<f64>,
    start: f64,
    stop: f64,
}

impl TimeSeries {
    /// Construct a validated series from event times and validity bounds.
    ///
    /// Parameters
    /// ----------
    /// - `times`: event arrival times. Must be finite and sorted.
    /// - `start`, `stop`: validity bounds. Must be finite with `start < stop`
    ///   and must contain every event.
    ///
    /// Errors
    /// ------
    /// - `SeriesError::InvalidBounds` for non-finite or non-increasing bounds.
    /// - `SeriesError::NonFiniteTime` / `SeriesError::UnsortedTimes` /
    ///   `SeriesError::EventOutsideBounds` for the first offending event.
    pub fn new(times: Vec<f64>, start: f64, stop: f64) -> SeriesResult<Self> {
        if !start.is_finite() || !stop.is_finite() {
            return Err(SeriesError::InvalidBounds { start, stop, reason: "Bounds must be finite." });
        }
        if start >= stop {
            return Err(SeriesError::InvalidBounds {
                start,
                stop,
                reason: "Start must be strictly before stop.",
            });
        }
        let mut previous = f64::NEG_INFINITY;
        for (index, &value) in times.iter().enumerate() {
            if !value.is_finite() {
                return Err(SeriesError::NonFiniteTime { index, value });
            }
            if value < previous {
                return Err(SeriesError::UnsortedTimes { index, previous, value });
            }
            if value < start || value > stop {
                return Err(SeriesError::EventOutsideBounds { index, value, start, stop });
            }
            previous = value;
        }
        Ok(Self { times, start, stop })
    }

    /// Construct a series whose validity bounds are the first and last event.
    ///
    /// Errors
    /// ------
    /// - `SeriesError::EmptySeries` when `times` is empty.
    /// - `SeriesError::InvalidBounds` when all events share one timestamp.
    /// - Any validation error from [`TimeSeries::new`].
    pub fn from_events(times: Vec<f64>) -> SeriesResult<Self> {
        let (first, last) = match (times.first(), times.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Err(SeriesError::EmptySeries),
        };
        Self::new(times, first, last)
    }

    pub fn times(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(self.times.as_slice())
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of events with `start <= t <= stop`. An inverted interval
    /// counts nothing.
    pub fn integral(&self, start: f64, stop: f64) -> usize {
        if !(start <= stop) {
            return 0;
        }
        self.count_at_or_before(stop) - self.count_before(start)
    }

    /// Histogram of event counts over `n_bins` equal bins spanning
    /// `[start, stop]`.
    ///
    /// Parameters
    /// ----------
    /// - `n_bins`: number of bins, at least 1.
    /// - `start`, `stop`: histogram range; may extend past the validity
    ///   bounds.
    ///
    /// Returns
    /// -------
    /// `(counts, edges)` with `counts.len() == n_bins` and
    /// `edges.len() == n_bins + 1`.
    ///
    /// Errors
    /// ------
    /// - `SeriesError::InvalidBinCount` when `n_bins == 0`.
    /// - `SeriesError::InvalidHistogramRange` for a non-finite or
    ///   non-increasing range.
    ///
    /// Notes
    /// -----
    /// - Ranges outside `[self.start, self.stop]` are not an error: the
    ///   uncovered part has no events and a warning is logged.
    pub fn histogram(
        &self, n_bins: usize, start: f64, stop: f64,
    ) -> SeriesResult<(Array1<f64>, Array1<f64>)> {
        if n_bins == 0 {
            return Err(SeriesError::InvalidBinCount { n_bins });
        }
        if !start.is_finite() || !stop.is_finite() || start >= stop {
            return Err(SeriesError::InvalidHistogramRange { start, stop });
        }
        if start < self.start || stop > self.stop {
            warn!(
                start,
                stop,
                valid_start = self.start,
                valid_stop = self.stop,
                "histogram range exceeds series validity bounds; uncovered bins are zero-filled"
            );
        }

        let width = (stop - start) / n_bins as f64;
        let mut edges = Array1::from_shape_fn(n_bins + 1, |i| start + i as f64 * width);
        edges[n_bins] = stop;

        let mut counts = Array1::<f64>::zeros(n_bins);
        let mut lower = self.count_before(edges[0]);
        for i in 0..n_bins {
            let upper = if i + 1 == n_bins {
                self.count_at_or_before(edges[i + 1])
            } else {
                self.count_before(edges[i + 1])
            };
            counts[i] = (upper - lower) as f64;
            lower = upper;
        }
        Ok((counts, edges))
    }

    // ---- Helper Methods ----

    fn count_before(&self, t: f64) -> usize {
        self.times.partition_point(|&x| x < t)
    }

    fn count_at_or_before(&self, t: f64) -> usize {
        self.times.partition_point(|&x| x <= t)
    }
}
