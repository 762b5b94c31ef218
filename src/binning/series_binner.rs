//! Two-detector series binning over a lag-safe reference window.
//!
//! Purpose
//! -------
//! Turn two raw event streams into the inputs of every lag likelihood: one
//! reference histogram for detector 1, a detector relation fitted from the
//! counts in the common live interval, and a histogram function for
//! detector 2 that re-bins the raw events at any lag.
//!
//! Key behaviors
//! -------------
//! - The reference window starts late enough that shifting detector 2 by
//!   up to `max_lag` in either direction stays inside its validity bounds,
//!   then moves by `lead_time`.
//! - The window holds `floor(window / bin_width)` bins (at least one) of
//!   exactly `bin_width`.
//! - A window that still reaches past either detector's data logs a
//!   `range overflow` warning; binning proceeds with empty bins there.
//! - Detector 2 at lag `L` is binned over the reference edges minus `L`.
//!   Each evaluation is independent and side-effect free.
//!
//! Invariants & assumptions
//! ------------------------
//! - The relation counts events over the overlap of the two validity
//!   intervals. Without an overlap, the reference window is used instead
//!   and a warning is logged.
//!
//! Conventions
//! -----------
//! - A positive lag means detector 2 saw the burst earlier: its events at
//!   `t - L` line up with detector 1 events at `t`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover window placement, overflow detection, relation
//!   counting, and batched versus single-lag equality.
use crate::{
    binning::errors::{BinningError, BinningResult},
    model::relation::DetectorRelation,
    series::time_series::TimeSeries,
};
use ndarray::{Array1, Array2, ArrayView1};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};

/// Default search half-range for lags, in the units of the event times.
pub const DEFAULT_MAX_LAG: f64 = 0.1;

/// Relative distance to an integer below which a ratio counts as exact.
pub(crate) const INTEGER_RATIO_TOL: f64 = 1e-9;

/// `BinningOptions` — per-pair binning configuration.
///
/// Fields
/// ------
/// - `background_rates`: mean background rate of each detector.
/// - `bin_width`: histogram bin width, `> 0`.
/// - `window`: requested reference window length, `>= bin_width`.
/// - `max_lag`: lag search half-range, `> 0` (default 0.1).
/// - `source_suppression`: relation suppression factor, `>= 1` (default 1).
/// - `lead_time`: shift of the reference window start (default 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinningOptions {
    pub background_rates: (f64, f64),
    pub bin_width: f64,
    pub window: f64,
    pub max_lag: f64,
    pub source_suppression: f64,
    pub lead_time: f64,
}

impl BinningOptions {
    /// Options with default `max_lag`, `source_suppression` and `lead_time`.
    ///
    /// Errors
    /// ------
    /// - `BinningError::InvalidOption` for the first out-of-range field.
    pub fn new(background_rates: (f64, f64), bin_width: f64, window: f64) -> BinningResult<Self> {
        let opts = Self {
            background_rates,
            bin_width,
            window,
            max_lag: DEFAULT_MAX_LAG,
            source_suppression: 1.0,
            lead_time: 0.0,
        };
        opts.validate()?;
        Ok(opts)
    }

    pub fn with_max_lag(self, max_lag: f64) -> BinningResult<Self> {
        let opts = Self { max_lag, ..self };
        opts.validate()?;
        Ok(opts)
    }

    pub fn with_source_suppression(self, source_suppression: f64) -> BinningResult<Self> {
        let opts = Self { source_suppression, ..self };
        opts.validate()?;
        Ok(opts)
    }

    pub fn with_lead_time(self, lead_time: f64) -> BinningResult<Self> {
        let opts = Self { lead_time, ..self };
        opts.validate()?;
        Ok(opts)
    }

    /// Check every field; fields are public, so callers that build the
    /// struct literally should call this before binning.
    pub fn validate(&self) -> BinningResult<()> {
        let (bg1, bg2) = self.background_rates;
        for (name, value) in [("background_rate_1", bg1), ("background_rate_2", bg2)] {
            if !value.is_finite() || value < 0.0 {
                return Err(BinningError::InvalidOption {
                    name,
                    value,
                    reason: "Background rates must be finite and non-negative.",
                });
            }
        }
        for (name, value) in [("bin_width", self.bin_width), ("max_lag", self.max_lag)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BinningError::InvalidOption {
                    name,
                    value,
                    reason: "Must be finite and strictly positive.",
                });
            }
        }
        if !self.window.is_finite() || self.window < self.bin_width {
            return Err(BinningError::InvalidOption {
                name: "window",
                value: self.window,
                reason: "Window must be finite and hold at least one bin.",
            });
        }
        if !self.source_suppression.is_finite() || self.source_suppression < 1.0 {
            return Err(BinningError::InvalidOption {
                name: "source_suppression",
                value: self.source_suppression,
                reason: "Suppression must be finite and at least 1.",
            });
        }
        if !self.lead_time.is_finite() {
            return Err(BinningError::InvalidOption {
                name: "lead_time",
                value: self.lead_time,
                reason: "Lead time must be finite.",
            });
        }
        Ok(())
    }

    /// Number of whole bins in the window (at least one).
    pub fn n_bins(&self) -> usize {
        whole_count(self.window / self.bin_width, f64::floor).max(1)
    }
}

/// Integer count for a ratio, snapping to the nearest integer when the
/// ratio is within [`INTEGER_RATIO_TOL`] of it and applying `round_fn`
/// otherwise.
pub(crate) fn whole_count(ratio: f64, round_fn: fn(f64) -> f64) -> usize {
    let nearest = ratio.round();
    if (ratio - nearest).abs() <= INTEGER_RATIO_TOL * nearest.abs().max(1.0) {
        nearest as usize
    } else {
        round_fn(ratio) as usize
    }
}

/// Detector-2 histogram as a function of lag over the reference window.
#[derive(Debug, Clone, Copy)]
pub struct ShiftedHistogram<'a> {
    series: &'a TimeSeries,
    n_bins: usize,
    start: f64,
    stop: f64,
}

impl ShiftedHistogram<'_> {
    /// Histogram of detector 2 over `[start - lag, stop - lag]`.
    ///
    /// Errors
    /// ------
    /// - `BinningError::NonFiniteLag` for NaN/±inf.
    pub fn at(&self, lag: f64) -> BinningResult<Array1<f64>> {
        if !lag.is_finite() {
            return Err(BinningError::NonFiniteLag { index: 0, value: lag });
        }
        let (counts, _edges) = self.series.histogram(self.n_bins, self.start - lag, self.stop - lag)?;
        Ok(counts)
    }

    /// One histogram row per lag; row `i` equals `self.at(lags[i])`.
    pub fn batch(&self, lags: ArrayView1<'_, f64>) -> BinningResult<Array2<f64>> {
        if let Some((index, &value)) = lags.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(BinningError::NonFiniteLag { index, value });
        }
        let lags: Vec<f64> = lags.to_vec();

        #[cfg(feature = "parallel")]
        let rows: Vec<Array1<f64>> =
            lags.par_iter().map(|&lag| self.at(lag)).collect::<BinningResult<_>>()?;

        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Array1<f64>> =
            lags.iter().map(|&lag| self.at(lag)).collect::<BinningResult<_>>()?;

        let mut out = Array2::<f64>::zeros((rows.len(), self.n_bins));
        for (mut target, row) in out.rows_mut().into_iter().zip(rows) {
            target.assign(&row);
        }
        Ok(out)
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    pub fn series(&self) -> &TimeSeries {
        self.series
    }
}

/// `SeriesBinning` — the binned view of one detector pair.
///
/// Fields
/// ------
/// - `bin_width`, `n_bins`, `edges`: reference window geometry.
/// - `reference`: detector-1 counts over `edges`.
/// - `shifted`: detector-2 histogram as a function of lag.
/// - `relation`: detector relation fitted from the overlap counts.
/// - `max_lag`: lag search half-range.
/// - `overflow`: how far the window reaches past usable data (0 if none).
#[derive(Debug, Clone)]
pub struct SeriesBinning<'a> {
    pub bin_width: f64,
    pub n_bins: usize,
    pub edges: Array1<f64>,
    pub reference: Array1<f64>,
    pub shifted: ShiftedHistogram<'a>,
    pub relation: DetectorRelation,
    pub max_lag: f64,
    pub overflow: f64,
}

impl<'a> SeriesBinning<'a> {
    /// Bin a detector pair.
    ///
    /// Parameters
    /// ----------
    /// - `series_1`: reference detector.
    /// - `series_2`: detector whose lag is estimated.
    /// - `opts`: binning configuration.
    ///
    /// Errors
    /// ------
    /// - `BinningError::InvalidOption` from `opts.validate()`.
    /// - `BinningError::Model` if the relation cannot be built.
    ///
    /// Notes
    /// -----
    /// - Data gaps never fail the call; they produce warnings and empty bins.
    pub fn build(
        series_1: &TimeSeries, series_2: &'a TimeSeries, opts: &BinningOptions,
    ) -> BinningResult<Self> {
        opts.validate()?;
        let max_lag = opts.max_lag;
        let n_bins = opts.n_bins();
        let start = series_1.start().max(series_2.start() + max_lag) + opts.lead_time;
        let stop = start + n_bins as f64 * opts.bin_width;

        let usable_stop = series_1.stop().min(series_2.stop() - max_lag);
        let overflow = (stop - usable_stop).max(0.0);
        if overflow > 0.0 {
            warn!(overflow, start, stop, usable_stop, "reference window exceeds data range");
        }

        let mut overlap_start = series_1.start().max(series_2.start());
        let mut overlap_stop = series_1.stop().min(series_2.stop());
        if overlap_start >= overlap_stop {
            warn!(
                overlap_start,
                overlap_stop, "series validity bounds do not overlap; counting over reference window"
            );
            overlap_start = start;
            overlap_stop = stop;
        }
        let n1 = series_1.integral(overlap_start, overlap_stop);
        let n2 = series_2.integral(overlap_start, overlap_stop);
        let (bg1, bg2) = opts.background_rates;
        let relation = DetectorRelation::from_counts(
            bg1,
            bg2,
            n1,
            n2,
            overlap_stop - overlap_start,
            opts.bin_width,
            opts.source_suppression,
        )?;
        debug!(n1, n2, n_bins, start, ratio = relation.sensitivity_ratio_2_to_1(), "binned pair");

        let (reference, edges) = series_1.histogram(n_bins, start, stop)?;
        let shifted = ShiftedHistogram { series: series_2, n_bins, start, stop };
        Ok(Self {
            bin_width: opts.bin_width,
            n_bins,
            edges,
            reference,
            shifted,
            relation,
            max_lag,
            overflow,
        })
    }

    pub fn window_start(&self) -> f64 {
        self.shifted.start
    }

    pub fn window_stop(&self) -> f64 {
        self.shifted.stop
    }
}
