//! Numerically stable transforms between bounded and unconstrained space.
//!
//! Curve fits in this crate keep their parameters inside boxes (peak inside
//! the lag mesh, curvature strictly negative, variance inside a window). The
//! optimizer works on unconstrained `θ`, and these helpers map back and
//! forth without overflow in the tails.
//!
//! # Provided items
//! - [`LOGIT_EPS`]: how far inside `(0, 1)` fractions are pushed before
//!   taking a logit.
//! - [`safe_logistic`], [`safe_logit`]: ℝ ↔ (0, 1).
//! - [`safe_softplus`], [`safe_softplus_inv`]: ℝ ↔ (0, ∞).
//! - [`BoxTransform`]: ℝ ↔ `[lower, upper]` via the logistic, with its
//!   derivative for analytic chain rules.

/// Clearance from 0 and 1 applied before taking a logit.
pub const LOGIT_EPS: f64 = 1e-9;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// For `x > 20`, `ln1p(exp(-x))` is below `f64` resolution relative to `x`,
/// so `x` itself is returned; otherwise `ln1p(exp(x))` is exact enough.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Inverse of softplus on `(0, ∞)`: `ln(exp(x) - 1)`, evaluated as
/// `ln(expm1(x))` below the same cutoff.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Logistic `1 / (1 + exp(-x))`, branch-split so neither tail overflows.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Logit `ln(q / (1 - q))` with `q` first clamped into
/// `[LOGIT_EPS, 1 - LOGIT_EPS]`.
pub fn safe_logit(q: f64) -> f64 {
    let q = q.clamp(LOGIT_EPS, 1.0 - LOGIT_EPS);
    q.ln() - (-q).ln_1p()
}

/// Logistic map of ℝ onto `[lower, upper]`.
///
/// A degenerate box (`lower == upper`) pins the parameter and has zero
/// derivative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxTransform {
    pub lower: f64,
    pub upper: f64,
}

impl BoxTransform {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Bounded value for unconstrained `t`.
    pub fn to_bounded(&self, t: f64) -> f64 {
        self.lower + self.width() * safe_logistic(t)
    }

    /// Unconstrained value for bounded `x` (clamped just inside the box).
    pub fn to_unconstrained(&self, x: f64) -> f64 {
        if self.width() <= 0.0 {
            return 0.0;
        }
        safe_logit((x - self.lower) / self.width())
    }

    /// `d to_bounded / dt`.
    pub fn derivative(&self, t: f64) -> f64 {
        let s = safe_logistic(t);
        self.width() * s * (1.0 - s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // - Agreement of the guarded transforms with naive formulas on safe grids.
    // - Finite, saturating behavior in the tails.
    // - `BoxTransform` round trips and its derivative against a central
    //   difference.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Guarded formulas match the naive ones where the latter are safe, and
    // stay finite where they are not.
    fn transforms_match_naive_and_saturate() {
        for &x in &[-5.0, -0.3, 0.0, 1.7, 6.0] {
            assert_relative_eq!(safe_softplus(x), (1.0 + f64::exp(x)).ln(), epsilon = 1e-12);
            assert_relative_eq!(safe_logistic(x), 1.0 / (1.0 + f64::exp(-x)), epsilon = 1e-12);
            assert_relative_eq!(safe_logit(safe_logistic(x)), x, epsilon = 1e-8);
        }
        assert_eq!(safe_softplus(800.0), 800.0);
        assert_eq!(safe_logistic(-800.0), 0.0);
        assert_eq!(safe_logistic(800.0), 1.0);
        assert!(safe_logit(0.0).is_finite());
        assert_relative_eq!(safe_softplus_inv(safe_softplus(0.4)), 0.4, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // `BoxTransform` maps into its box, inverts, and reports the right
    // derivative.
    //
    // Given
    // -----
    // - The box `[-2, 6]` and `t = 0.35`.
    //
    // Expect
    // ------
    // - Round trip within 1e-9 and derivative within 1e-6 of a central
    //   difference.
    fn box_transform_round_trips_with_correct_derivative() {
        let bx = BoxTransform::new(-2.0, 6.0);
        let t = 0.35;
        let h = 1e-6;

        let x = bx.to_bounded(t);
        let fd = (bx.to_bounded(t + h) - bx.to_bounded(t - h)) / (2.0 * h);

        assert!(x > -2.0 && x < 6.0);
        assert_relative_eq!(bx.to_unconstrained(x), t, epsilon = 1e-9);
        assert_relative_eq!(bx.derivative(t), fd, epsilon = 1e-6);
        assert_eq!(BoxTransform::new(1.0, 1.0).to_bounded(3.0), 1.0);
    }
}
