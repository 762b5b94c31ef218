//! burst_timing — arrival-time lag estimation between two detector streams.
//!
//! Purpose
//! -------
//! Estimate the time offset between two detectors observing a common burst
//! from their raw event times. The crate bins both streams over a shared
//! reference window, scores a mesh of candidate lags with a Poisson-mixture
//! likelihood, and turns the resulting curve into a point estimate with
//! uncertainty using one of several interchangeable strategies.
//!
//! Key behaviors
//! -------------
//! - `series`: validated event streams with validity bounds, counting and
//!   histogram queries.
//! - `model`: the detector relation (backgrounds, sensitivity ratio, source
//!   suppression) and the shared log-factorial `ComputeContext`.
//! - `binning`: reference window binning, lag-shifted histograms and the
//!   candidate lag mesh.
//! - `likelihood`: exact, closed-form and cross-covariance scorers over the
//!   mesh, plus continuous scorers for off-mesh search.
//! - `estimators`: the base estimation contract and ten lag strategies.
//! - `numerics` / `optimization`: polynomial fitting, quadrature and the
//!   argmin-backed solvers the strategies build on.
//! - `pipeline`: wiring for one detector pair or a batch of pairs.
//!
//! Invariants & assumptions
//! ------------------------
//! - Event times are seconds on a common clock for both detectors.
//! - A positive lag means detector 2 saw the signal earlier: detector 2 at
//!   lag `L` is binned over `[start - L, stop - L]`.
//! - Library code never panics on bad input; every fallible operation
//!   returns the owning module's `Result` alias.
//!
//! Conventions
//! -------------
//! - Non-fatal conditions are reported through `tracing`; the crate never
//!   installs a subscriber.
//! - The `parallel` feature evaluates mesh rows and pair batches with
//!   `rayon`; results are identical with and without it.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code; `tests/` holds end-to-end runs on
//!   synthetic bursts and property tests of the estimator contract.

pub mod binning;
pub mod estimators;
pub mod likelihood;
pub mod model;
pub mod numerics;
pub mod optimization;
pub mod pipeline;
pub mod series;

pub mod prelude {
    pub use crate::binning::prelude::*;
    pub use crate::estimators::prelude::*;
    pub use crate::likelihood::prelude::*;
    pub use crate::model::prelude::*;
    pub use crate::pipeline::prelude::*;
    pub use crate::series::prelude::*;
}
