//! Point weights for least-squares fits of log-likelihood curves.
//!
//! Each scheme maps the observed log-likelihoods `y` to non-negative weights
//! that emphasize the peak region to a different degree. `y_max` and `y_min`
//! are taken over the whole curve.
//!
//! | scheme           | weight                          |
//! |------------------|---------------------------------|
//! | `Uniform`        | `1`                             |
//! | `Exp`            | `exp(y - y_max)`                |
//! | `ExpHalf`        | `exp((y - y_max) / 2)`          |
//! | `Linear`         | `y - y_min`                     |
//! | `Inverse`        | `1 / (1 + y_max - y)`           |
//! | `InverseSquare`  | `1 / (1 + (y_max - y)^2)`       |
use crate::numerics::errors::NumericsError;
use ndarray::{Array1, ArrayView1};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveWeights {
    #[default]
    Uniform,
    Exp,
    ExpHalf,
    Linear,
    Inverse,
    InverseSquare,
}

impl CurveWeights {
    /// Weights for the log-likelihood values `y`.
    pub fn weights(&self, y: ArrayView1<'_, f64>) -> Array1<f64> {
        let y_max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let y_min = y.iter().copied().fold(f64::INFINITY, f64::min);
        match self {
            CurveWeights::Uniform => Array1::ones(y.len()),
            CurveWeights::Exp => y.mapv(|v| (v - y_max).exp()),
            CurveWeights::ExpHalf => y.mapv(|v| (0.5 * (v - y_max)).exp()),
            CurveWeights::Linear => y.mapv(|v| v - y_min),
            CurveWeights::Inverse => y.mapv(|v| 1.0 / (1.0 + y_max - v)),
            CurveWeights::InverseSquare => y.mapv(|v| 1.0 / (1.0 + (y_max - v).powi(2))),
        }
    }
}

impl FromStr for CurveWeights {
    type Err = NumericsError;

    /// Parse a weighting scheme (case-insensitive; `-` and `_` are ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.chars().filter(|c| *c != '_' && *c != '-').collect();
        match key.to_lowercase().as_str() {
            "uniform" | "none" => Ok(CurveWeights::Uniform),
            "exp" => Ok(CurveWeights::Exp),
            "exphalf" => Ok(CurveWeights::ExpHalf),
            "linear" => Ok(CurveWeights::Linear),
            "inverse" => Ok(CurveWeights::Inverse),
            "inversesquare" => Ok(CurveWeights::InverseSquare),
            _ => Err(NumericsError::UnknownWeighting { name: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Peak-emphasizing schemes give weight 1 at the maximum and less
    // elsewhere; `Linear` is zero at the minimum.
    fn peak_weighted_schemes_are_one_at_maximum() {
        let y = array![-4.0, -1.0, 0.0];

        let exp = CurveWeights::Exp.weights(y.view());
        let inv = CurveWeights::InverseSquare.weights(y.view());
        let lin = CurveWeights::Linear.weights(y.view());

        assert_relative_eq!(exp[2], 1.0);
        assert_relative_eq!(exp[1], (-1.0_f64).exp());
        assert_relative_eq!(inv[0], 1.0 / 17.0);
        assert_eq!(lin[0], 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Names parse case-insensitively and unknown names are reported.
    fn parses_scheme_names() {
        assert_eq!("exp_half".parse::<CurveWeights>().unwrap(), CurveWeights::ExpHalf);
        assert_eq!("InverseSquare".parse::<CurveWeights>().unwrap(), CurveWeights::InverseSquare);
        assert!(matches!(
            "cubic".parse::<CurveWeights>(),
            Err(NumericsError::UnknownWeighting { .. })
        ));
    }
}
