//! pipeline — end-to-end lag estimation for detector pairs.
//!
//! Purpose
//! -------
//! Bundle the stage configurations and run binning, mesh construction,
//! likelihood evaluation and lag estimation for one pair or a batch.
//!
//! Key behaviors
//! -------------
//! - [`PipelineOptions`] holds binning, mesh, likelihood and estimator
//!   settings, validated on construction.
//! - [`LagPipeline`] returns a [`PairEstimate`] carrying the intermediate
//!   records along with the estimate.
//! - Absent input is a distinct `MissingInput` error so callers can skip a
//!   cycle without treating it as a failure.
//!
//! Downstream usage
//! ----------------
//! - Callers typically import via `pipeline::prelude::*`.

pub mod errors;
pub mod lag_pipeline;
pub mod options;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{PipelineError, PipelineResult};
pub use self::lag_pipeline::{DetectorPair, LagPipeline, PairEstimate};
pub use self::options::{MeshOptions, PipelineOptions};

pub mod prelude {
    pub use super::errors::{PipelineError, PipelineResult};
    pub use super::lag_pipeline::{DetectorPair, LagPipeline, PairEstimate};
    pub use super::options::{MeshOptions, PipelineOptions};
}
