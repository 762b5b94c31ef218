//! Errors for the numerical building blocks (fits, roots, quadrature).

/// Result alias for numerical helpers that may produce [`NumericsError`].
pub type NumericsResult<T> = Result<T, NumericsError>;

#[derive(Debug, Clone, PartialEq)]
pub enum NumericsError {
    /// Paired arrays (abscissae, ordinates, weights) must share a length.
    LengthMismatch { expected: usize, found: usize },

    /// Least-squares fit needs at least as many points as basis terms.
    Underdetermined { points: usize, terms: usize },

    /// A value fed into a fit or quadrature was NaN/±inf.
    NonFiniteInput { index: usize, value: f64 },

    /// The linear solver rejected the design matrix.
    LeastSquaresFailed { reason: &'static str },

    /// A weighting scheme name was not recognized.
    UnknownWeighting { name: String },
}

impl std::error::Error for NumericsError {}

impl std::fmt::Display for NumericsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericsError::LengthMismatch { expected, found } => {
                write!(f, "Length mismatch: expected {expected}, found {found}")
            }
            NumericsError::Underdetermined { points, terms } => {
                write!(f, "Least-squares fit with {terms} terms needs at least {terms} points, got {points}")
            }
            NumericsError::NonFiniteInput { index, value } => {
                write!(f, "Non-finite input at index {index}: {value}")
            }
            NumericsError::LeastSquaresFailed { reason } => {
                write!(f, "Least-squares solve failed: {reason}")
            }
            NumericsError::UnknownWeighting { name } => {
                write!(
                    f,
                    "Unknown curve weighting '{name}': valid options are 'uniform', 'exp', \
                     'exp_half', 'linear', 'inverse', 'inverse_square'"
                )
            }
        }
    }
}
