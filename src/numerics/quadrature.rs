//! Trapezoidal quadrature and piecewise-linear interpolation on sorted grids.
//!
//! All helpers assume `x` is sorted ascending (repeated abscissae are
//! allowed and contribute zero width) and that paired arrays share a length;
//! surplus entries in the longer array are ignored.
use ndarray::{Array1, ArrayView1};

/// `∫ y dx` by the trapezium rule.
pub fn trapezoid(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
    let n = x.len().min(y.len());
    (1..n).map(|i| 0.5 * (x[i] - x[i - 1]) * (y[i] + y[i - 1])).sum()
}

/// Running trapezium integral; element 0 is exactly `0.0`.
pub fn cumulative_trapezoid(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Array1<f64> {
    let n = x.len().min(y.len());
    let mut out = Array1::<f64>::zeros(n);
    for i in 1..n {
        out[i] = out[i - 1] + 0.5 * (x[i] - x[i - 1]) * (y[i] + y[i - 1]);
    }
    out
}

/// Linear interpolation of `(xp, fp)` at `x`, clamped to the end values
/// outside `[xp[0], xp[n-1]]`. Returns `NaN` for empty input.
pub fn interp(x: f64, xp: ArrayView1<'_, f64>, fp: ArrayView1<'_, f64>) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    // First index with xp[k] > x; 1 <= k <= n - 1 here.
    let k = match xp.iter().take(n).position(|&v| v > x) {
        Some(k) => k,
        None => return fp[n - 1],
    };
    let (x0, x1) = (xp[k - 1], xp[k]);
    if x1 == x0 {
        return fp[k];
    }
    fp[k - 1] + (fp[k] - fp[k - 1]) * (x - x0) / (x1 - x0)
}

/// Inverse of a non-decreasing cumulative curve at level `p`.
///
/// Locates the first index `k` with `cum[k] >= p` and interpolates linearly
/// between `k - 1` and `k`. Levels at or below `cum[0]` map to `x[0]`;
/// levels above the final value map to the last abscissa.
pub fn inverse_cumulative(x: ArrayView1<'_, f64>, cum: ArrayView1<'_, f64>, p: f64) -> f64 {
    let n = x.len().min(cum.len());
    if n == 0 {
        return f64::NAN;
    }
    let k = match cum.iter().take(n).position(|&c| c >= p) {
        Some(k) => k,
        None => return x[n - 1],
    };
    if k == 0 {
        return x[0];
    }
    let (c0, c1) = (cum[k - 1], cum[k]);
    if c1 == c0 {
        return x[k];
    }
    x[k - 1] + (x[k] - x[k - 1]) * (p - c0) / (c1 - c0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // - Exactness of the trapezium rule on linear integrands.
    // - Clamping and interior behavior of `interp`.
    // - First-crossing semantics of `inverse_cumulative`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The trapezium rule is exact for linear integrands, and the running
    // integral ends at the total.
    fn trapezoid_is_exact_for_linear_integrand() {
        let x = array![0.0, 0.5, 1.5, 2.0];
        let y = x.mapv(|v| 2.0 * v + 1.0);

        let total = trapezoid(x.view(), y.view());
        let running = cumulative_trapezoid(x.view(), y.view());

        assert_relative_eq!(total, 6.0, epsilon = 1e-12);
        assert_eq!(running[0], 0.0);
        assert_relative_eq!(running[3], total, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // `interp` clamps outside the grid and is linear inside it.
    fn interp_clamps_and_interpolates() {
        let xp = array![0.0, 1.0, 2.0];
        let fp = array![0.0, 10.0, 30.0];

        assert_eq!(interp(-1.0, xp.view(), fp.view()), 0.0);
        assert_eq!(interp(5.0, xp.view(), fp.view()), 30.0);
        assert_relative_eq!(interp(1.5, xp.view(), fp.view()), 20.0);
    }

    #[test]
    // Purpose
    // -------
    // `inverse_cumulative` interpolates at the first crossing of a flat
    // stretch rather than somewhere inside it.
    //
    // Given
    // -----
    // - A cumulative curve `[0, 0.5, 0.5, 1]` on `x = [0, 1, 2, 3]`.
    //
    // Expect
    // ------
    // - Level 0.5 maps to `x = 1`; level 0.75 maps to `x = 2.5`.
    fn inverse_cumulative_uses_first_crossing() {
        let x = array![0.0, 1.0, 2.0, 3.0];
        let cum = array![0.0, 0.5, 0.5, 1.0];

        assert_relative_eq!(inverse_cumulative(x.view(), cum.view(), 0.5), 1.0);
        assert_relative_eq!(inverse_cumulative(x.view(), cum.view(), 0.75), 2.5);
        assert_eq!(inverse_cumulative(x.view(), cum.view(), 0.0), 0.0);
    }
}
