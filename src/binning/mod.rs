//! binning — from raw event streams to lag-indexed histograms.
//!
//! Purpose
//! -------
//! Discretize a detector pair so that every candidate lag can be scored by
//! comparing two equal-length histograms.
//!
//! Key behaviors
//! -------------
//! - [`SeriesBinning::build`] picks a lag-safe reference window, bins
//!   detector 1 once, fits the [`DetectorRelation`](crate::model::DetectorRelation)
//!   from overlap counts, and exposes detector 2 as a [`ShiftedHistogram`].
//! - [`LagMesh::build`] expands `max_lag` into an ascending, half-open lag
//!   grid and bins detector 2 at every grid point in one batch.
//!
//! Conventions
//! -----------
//! - Batches run on rayon with the `parallel` feature; rows are identical
//!   either way.
//!
//! Downstream usage
//! ----------------
//! - `likelihood` scores a `LagMesh` against the reference histogram.
//! - `likelihood::scorer::BinnedScorer` re-bins at arbitrary lags for
//!   annealing.
pub mod errors;
pub mod lag_mesh;
pub mod series_binner;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{BinningError, BinningResult};
pub use self::lag_mesh::{LagMesh, mesh_lags};
pub use self::series_binner::{BinningOptions, DEFAULT_MAX_LAG, SeriesBinning, ShiftedHistogram};

pub mod prelude {
    pub use super::errors::{BinningError, BinningResult};
    pub use super::lag_mesh::LagMesh;
    pub use super::series_binner::{BinningOptions, SeriesBinning};
}
