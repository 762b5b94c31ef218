//! model — statistical relation between two detectors' binned counts.
//!
//! Purpose
//! -------
//! Encapsulate the nuisance description of a detector pair (per-bin
//! backgrounds, sensitivity split, source suppression) and the Poisson
//! mixture likelihood used to score how well two histograms line up.
//!
//! Key behaviors
//! -------------
//! - [`DetectorRelation`] is built once per pair from observed counts
//!   (`from_counts`) and then used read-only by the binning and likelihood
//!   stages.
//! - [`ComputeContext`] carries the cached log-factorial table. It is
//!   constructed explicitly by the caller and threaded through every scoring
//!   call by reference; there is no hidden global cache.
//!
//! Downstream usage
//! ----------------
//! - `binning::SeriesBinner` constructs the relation.
//! - `likelihood` strategies read its parameters or delegate to
//!   [`DetectorRelation::log_likelihood`].

pub mod context;
pub mod errors;
pub mod relation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::context::{ComputeContext, DEFAULT_LOG_FACTORIAL_LEN};
pub use self::errors::{ModelError, ModelResult};
pub use self::relation::DetectorRelation;

pub mod prelude {
    pub use super::context::ComputeContext;
    pub use super::errors::{ModelError, ModelResult};
    pub use super::relation::DetectorRelation;
}
