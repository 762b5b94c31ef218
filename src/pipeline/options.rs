//! Pipeline configuration: mesh geometry plus the per-stage option bundle.
use crate::{
    binning::{errors::BinningError, series_binner::BinningOptions},
    estimators::choice::EstimatorChoice,
    likelihood::choice::LikelihoodChoice,
    pipeline::errors::PipelineResult,
};

/// `MeshOptions` — spacing of the candidate lag mesh.
///
/// Fields
/// ------
/// - `mesh_spacing`: distance between consecutive candidate lags, `> 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshOptions {
    pub mesh_spacing: f64,
}

impl MeshOptions {
    /// Errors
    /// ------
    /// - `PipelineError::Binning(InvalidMeshSpacing)` for a non-finite or
    ///   non-positive spacing.
    pub fn new(mesh_spacing: f64) -> PipelineResult<Self> {
        let opts = Self { mesh_spacing };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if !self.mesh_spacing.is_finite() || self.mesh_spacing <= 0.0 {
            return Err(BinningError::InvalidMeshSpacing { value: self.mesh_spacing }.into());
        }
        Ok(())
    }
}

/// `PipelineOptions` — everything needed to run one detector pair.
///
/// Fields
/// ------
/// - `binning`: reference window and detector background configuration.
/// - `mesh`: candidate lag spacing.
/// - `likelihood`: scoring strategy (default `exact_sum`).
/// - `estimator`: lag estimation strategy (default `cum_prob`).
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub binning: BinningOptions,
    pub mesh: MeshOptions,
    pub likelihood: LikelihoodChoice,
    pub estimator: EstimatorChoice,
}

impl PipelineOptions {
    /// Bundle with the default likelihood and estimator.
    ///
    /// Errors
    /// ------
    /// - Validation errors from `binning` or `mesh`.
    pub fn new(binning: BinningOptions, mesh: MeshOptions) -> PipelineResult<Self> {
        let opts = Self {
            binning,
            mesh,
            likelihood: LikelihoodChoice::default(),
            estimator: EstimatorChoice::default(),
        };
        opts.validate()?;
        Ok(opts)
    }

    pub fn with_likelihood(self, likelihood: LikelihoodChoice) -> Self {
        Self { likelihood, ..self }
    }

    pub fn with_estimator(self, estimator: EstimatorChoice) -> Self {
        Self { estimator, ..self }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        self.binning.validate()?;
        self.mesh.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::errors::PipelineError;

    #[test]
    // Purpose
    // -------
    // Mesh spacing is validated and defaults fill the strategy slots.
    //
    // Given
    // -----
    // - Spacings 0, NaN and 0.01; valid binning options.
    //
    // Expect
    // ------
    // - The invalid spacings fail with `InvalidMeshSpacing`.
    // - The bundle defaults to `exact_sum` and `cum_prob`.
    fn mesh_spacing_is_validated_and_defaults_apply() {
        // Arrange
        let binning = BinningOptions::new((1.0, 1.0), 0.01, 1.0).unwrap();

        // Act
        let zero = MeshOptions::new(0.0);
        let nan = MeshOptions::new(f64::NAN);
        let opts = PipelineOptions::new(binning, MeshOptions::new(0.01).unwrap()).unwrap();

        // Assert
        assert_eq!(
            zero,
            Err(PipelineError::Binning(BinningError::InvalidMeshSpacing { value: 0.0 }))
        );
        assert!(matches!(nan, Err(PipelineError::Binning(BinningError::InvalidMeshSpacing { .. }))));
        assert_eq!(opts.likelihood, LikelihoodChoice::default());
        assert_eq!(opts.estimator, EstimatorChoice::default());
    }
}
