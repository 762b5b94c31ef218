//! Lag mesh construction: candidate lags and their detector-2 histograms.
//!
//! The mesh runs from `-max_lag` upward in steps of `mesh_spacing` and
//! stops before `+max_lag`. Its length is `ceil(2 max_lag / spacing)`,
//! except that a ratio within rounding of an integer is taken as exact, so
//! an evenly dividing spacing never gains a point at `+max_lag`.
use crate::binning::{
    errors::{BinningError, BinningResult},
    series_binner::{SeriesBinning, whole_count},
};
use ndarray::{Array1, Array2, ArrayView1};

/// `LagMesh` — ascending candidate lags and one detector-2 histogram row
/// per lag.
#[derive(Debug, Clone, PartialEq)]
pub struct LagMesh {
    pub lags: Array1<f64>,
    pub histograms: Array2<f64>,
    pub spacing: f64,
}

impl LagMesh {
    /// Build the mesh for a binned pair.
    ///
    /// Errors
    /// ------
    /// - `BinningError::InvalidMeshSpacing` for a non-finite or
    ///   non-positive spacing.
    /// - Histogram errors from the shifted-histogram batch.
    pub fn build(binning: &SeriesBinning<'_>, mesh_spacing: f64) -> BinningResult<Self> {
        let lags = mesh_lags(binning.max_lag, mesh_spacing)?;
        let histograms = binning.shifted.batch(lags.view())?;
        Ok(Self { lags, histograms, spacing: mesh_spacing })
    }

    pub fn len(&self) -> usize {
        self.lags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lags.is_empty()
    }

    pub fn lags(&self) -> ArrayView1<'_, f64> {
        self.lags.view()
    }

    pub fn histogram(&self, row: usize) -> Option<ArrayView1<'_, f64>> {
        (row < self.histograms.nrows()).then(|| self.histograms.row(row))
    }
}

/// Candidate lags `-max_lag + i * spacing` for `i` in `0..count`.
///
/// Errors
/// ------
/// - `BinningError::InvalidMeshSpacing` for a non-finite or non-positive
///   spacing.
/// - `BinningError::InvalidOption` for a non-finite or non-positive
///   `max_lag`.
pub fn mesh_lags(max_lag: f64, spacing: f64) -> BinningResult<Array1<f64>> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(BinningError::InvalidMeshSpacing { value: spacing });
    }
    if !max_lag.is_finite() || max_lag <= 0.0 {
        return Err(BinningError::InvalidOption {
            name: "max_lag",
            value: max_lag,
            reason: "Must be finite and strictly positive.",
        });
    }
    let count = whole_count(2.0 * max_lag / spacing, f64::ceil).max(1);
    Ok(Array1::from_shape_fn(count, |i| -max_lag + i as f64 * spacing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{binning::series_binner::BinningOptions, series::time_series::TimeSeries};
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // The mesh is half-open: an evenly dividing spacing excludes `+max_lag`
    // and an uneven one rounds the count up.
    //
    // Given
    // -----
    // - max_lag 0.1 with spacings 0.05 and 0.03.
    //
    // Expect
    // ------
    // - 4 lags ending at 0.05, and 7 lags ending at 0.08.
    fn mesh_lags_are_half_open_and_ceil_counted() {
        let even = mesh_lags(0.1, 0.05).unwrap();
        let uneven = mesh_lags(0.1, 0.03).unwrap();

        assert_eq!(even.len(), 4);
        assert_relative_eq!(even[0], -0.1);
        assert_relative_eq!(even[3], 0.05, epsilon = 1e-12);
        assert_eq!(uneven.len(), 7);
        assert_relative_eq!(uneven[6], 0.08, epsilon = 1e-12);
        assert!(even.windows(2).into_iter().all(|w| w[1] > w[0]));
    }

    #[test]
    // Purpose
    // -------
    // Zero or negative spacing is rejected.
    fn mesh_lags_reject_bad_spacing() {
        assert_eq!(mesh_lags(0.1, 0.0).unwrap_err(), BinningError::InvalidMeshSpacing { value: 0.0 });
        assert!(mesh_lags(0.1, -1.0).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Each mesh row is the shifted histogram at the corresponding lag.
    fn build_rows_match_single_lag_histograms() {
        let s1 = TimeSeries::new(vec![1.0, 1.2, 1.4], 0.0, 3.0).unwrap();
        let s2 = TimeSeries::new(vec![0.95, 1.15, 1.35], 0.0, 3.0).unwrap();
        let opts = BinningOptions::new((0.0, 0.0), 0.1, 1.0).unwrap();
        let binning = SeriesBinning::build(&s1, &s2, &opts).unwrap();

        let mesh = LagMesh::build(&binning, 0.025).unwrap();

        assert_eq!(mesh.len(), 8);
        assert_eq!(mesh.histograms.dim(), (8, binning.n_bins));
        for (i, &lag) in mesh.lags.iter().enumerate() {
            assert_eq!(mesh.histogram(i).unwrap().to_owned(), binning.shifted.at(lag).unwrap());
        }
        assert!(mesh.histogram(8).is_none());
    }
}
