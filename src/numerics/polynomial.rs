//! Power-basis polynomials, weighted least-squares fits, and real roots.
//!
//! Purpose
//! -------
//! Supply the polynomial machinery used by the curve-fitting lag estimators:
//! fitting a (possibly sparse) power basis to a likelihood curve, taking
//! derivatives and antiderivatives, and locating real roots inside a window.
//!
//! Key behaviors
//! -------------
//! - [`fit_power_basis`] solves a weighted least-squares problem for an
//!   arbitrary set of powers via an SVD of the design matrix (`nalgebra`).
//!   Weights multiply residuals, not squared residuals.
//! - [`Polynomial::roots`] returns the eigenvalues of the companion matrix;
//!   [`Polynomial::real_roots_in`] filters and Newton-polishes the real ones.
//! - [`DomainMap`] maps a lag interval onto a fitting window (e.g. `[-1, 1]`)
//!   so that high-degree fits stay well conditioned; [`MappedPolynomial`]
//!   evaluates a window-space polynomial and its derivatives in lag units.
//!
//! Invariants & assumptions
//! ------------------------
//! - Coefficients are stored in ascending power order (`c0 + c1 x + …`).
//! - Trailing coefficients that are negligible relative to the largest one
//!   are dropped before building the companion matrix, which keeps spurious
//!   huge roots from degrading the accuracy of the small ones.
//!
//! Testing notes
//! -------------
//! - Unit tests recover known coefficients, derivative/antiderivative pairs,
//!   roots of factored polynomials, and sparse-basis fits.
use crate::numerics::errors::{NumericsError, NumericsResult};
use nalgebra::{Complex, DMatrix, DVector};
use ndarray::ArrayView1;

/// Relative size below which trailing coefficients are treated as zero when
/// solving for roots.
pub const ROOT_COEFF_EPS: f64 = 1e-10;

/// Imaginary-part tolerance (relative to `max(1, |re|)`) for accepting a
/// companion eigenvalue as real.
pub const REAL_ROOT_TOL: f64 = 1e-6;

const NEWTON_POLISH_STEPS: usize = 8;

/// Polynomial in the power basis, ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    /// Build from ascending coefficients. An empty vector is the zero
    /// polynomial.
    pub fn new(coeffs: Vec<f64>) -> Self {
        if coeffs.is_empty() { Self { coeffs: vec![0.0] } } else { Self { coeffs } }
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Nominal degree (`coeffs.len() - 1`), trailing zeros included.
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Horner evaluation.
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }

    pub fn deriv(&self) -> Polynomial {
        if self.coeffs.len() <= 1 {
            return Polynomial::new(vec![0.0]);
        }
        Polynomial::new(self.coeffs.iter().enumerate().skip(1).map(|(k, &c)| k as f64 * c).collect())
    }

    /// Antiderivative with zero constant term.
    pub fn integ(&self) -> Polynomial {
        let mut coeffs = Vec::with_capacity(self.coeffs.len() + 1);
        coeffs.push(0.0);
        coeffs.extend(self.coeffs.iter().enumerate().map(|(k, &c)| c / (k as f64 + 1.0)));
        Polynomial::new(coeffs)
    }

    /// All complex roots, from the eigenvalues of the companion matrix.
    pub fn roots(&self) -> Vec<Complex<f64>> {
        let coeffs = self.significant_coeffs();
        let degree = coeffs.len() - 1;
        match degree {
            0 => Vec::new(),
            1 => vec![Complex::new(-coeffs[0] / coeffs[1], 0.0)],
            _ => {
                let lead = coeffs[degree];
                let companion = DMatrix::from_fn(degree, degree, |i, j| {
                    if j == degree - 1 {
                        -coeffs[i] / lead
                    } else if i == j + 1 {
                        1.0
                    } else {
                        0.0
                    }
                });
                companion.complex_eigenvalues().iter().copied().collect()
            }
        }
    }

    /// Real roots lying in `[lo, hi]`, Newton-polished and sorted ascending.
    pub fn real_roots_in(&self, lo: f64, hi: f64) -> Vec<f64> {
        let deriv = self.deriv();
        let mut roots: Vec<f64> = self
            .roots()
            .into_iter()
            .filter(|z| z.im.abs() <= REAL_ROOT_TOL * z.re.abs().max(1.0))
            .map(|z| self.polish(&deriv, z.re))
            .filter(|&x| x.is_finite() && x >= lo && x <= hi)
            .collect();
        roots.sort_by(|a, b| a.total_cmp(b));
        roots
    }

    // ---- Helper Methods ----

    fn significant_coeffs(&self) -> &[f64] {
        let scale = self.coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        if scale == 0.0 {
            return &self.coeffs[..1];
        }
        let mut len = self.coeffs.len();
        while len > 1 && self.coeffs[len - 1].abs() <= ROOT_COEFF_EPS * scale {
            len -= 1;
        }
        &self.coeffs[..len]
    }

    fn polish(&self, deriv: &Polynomial, x0: f64) -> f64 {
        let mut x = x0;
        let mut fx = self.eval(x);
        for _ in 0..NEWTON_POLISH_STEPS {
            let slope = deriv.eval(x);
            if slope == 0.0 || fx == 0.0 {
                break;
            }
            let candidate = x - fx / slope;
            let f_candidate = self.eval(candidate);
            if !candidate.is_finite() || f_candidate.abs() >= fx.abs() {
                break;
            }
            x = candidate;
            fx = f_candidate;
        }
        x
    }
}

/// Affine map between lag units and a fitting window: `u = (x - offset) / scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainMap {
    offset: f64,
    scale: f64,
}

impl DomainMap {
    pub fn new(offset: f64, scale: f64) -> Self {
        Self { offset, scale }
    }

    /// Map `[lo, hi]` onto `[-1, 1]`.
    pub fn from_domain(lo: f64, hi: f64) -> Self {
        Self { offset: 0.5 * (lo + hi), scale: 0.5 * (hi - lo) }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_window(&self, x: f64) -> f64 {
        (x - self.offset) / self.scale
    }

    pub fn to_domain(&self, u: f64) -> f64 {
        self.offset + u * self.scale
    }
}

/// A window-space polynomial evaluated in lag units.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedPolynomial {
    pub poly: Polynomial,
    pub map: DomainMap,
}

impl MappedPolynomial {
    pub fn new(poly: Polynomial, map: DomainMap) -> Self {
        Self { poly, map }
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.poly.eval(self.map.to_window(x))
    }

    /// Second derivative with respect to lag at `x`.
    pub fn second_derivative(&self, x: f64) -> f64 {
        let scale = self.map.scale();
        self.poly.deriv().deriv().eval(self.map.to_window(x)) / (scale * scale)
    }
}

/// Weighted least-squares fit of `y ≈ Σ_j c_j u^{p_j}` for the given powers.
///
/// Parameters
/// ----------
/// - `u`: abscissae (usually already mapped into a fitting window).
/// - `y`: ordinates.
/// - `w`: per-point weights multiplying the residuals.
/// - `powers`: exponents of the basis terms, in output order.
///
/// Returns
/// -------
/// Coefficients aligned with `powers`.
///
/// Errors
/// ------
/// - `NumericsError::LengthMismatch` when `y` or `w` differ in length from `u`.
/// - `NumericsError::Underdetermined` when there are fewer points than terms.
/// - `NumericsError::NonFiniteInput` for NaN/±inf in any input.
/// - `NumericsError::LeastSquaresFailed` if the SVD solve is rejected.
pub fn fit_power_basis(
    u: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>, w: ArrayView1<'_, f64>, powers: &[u32],
) -> NumericsResult<Vec<f64>> {
    let n = u.len();
    if y.len() != n {
        return Err(NumericsError::LengthMismatch { expected: n, found: y.len() });
    }
    if w.len() != n {
        return Err(NumericsError::LengthMismatch { expected: n, found: w.len() });
    }
    if n < powers.len() || powers.is_empty() {
        return Err(NumericsError::Underdetermined { points: n, terms: powers.len() });
    }
    for (index, ((&ui, &yi), &wi)) in u.iter().zip(y.iter()).zip(w.iter()).enumerate() {
        for value in [ui, yi, wi] {
            if !value.is_finite() {
                return Err(NumericsError::NonFiniteInput { index, value });
            }
        }
    }

    let design = DMatrix::from_fn(n, powers.len(), |i, j| w[i] * u[i].powi(powers[j] as i32));
    let rhs = DVector::from_fn(n, |i, _| w[i] * y[i]);
    let svd = design.svd(true, true);
    let cutoff = svd.singular_values.max() * n.max(powers.len()) as f64 * f64::EPSILON;
    let solution =
        svd.solve(&rhs, cutoff).map_err(|reason| NumericsError::LeastSquaresFailed { reason })?;
    Ok(solution.iter().copied().collect())
}

/// Dense weighted least-squares polynomial fit of the given degree.
pub fn fit_polynomial(
    u: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>, w: ArrayView1<'_, f64>, degree: usize,
) -> NumericsResult<Polynomial> {
    let powers: Vec<u32> = (0..=degree as u32).collect();
    Ok(Polynomial::new(fit_power_basis(u, y, w, &powers)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Horner evaluation, derivative and antiderivative.
    // - Companion-matrix roots and in-window filtering.
    // - Dense and sparse weighted least-squares fits.
    //
    // They intentionally DO NOT cover:
    // - Estimator-level use of fits (see `estimators`).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `integ` followed by `deriv` returns the original coefficients.
    fn integ_then_deriv_round_trips() {
        let p = Polynomial::new(vec![1.0, -2.0, 3.0]);

        let back = p.integ().deriv();

        assert_eq!(back.coeffs(), p.coeffs());
        assert_relative_eq!(p.eval(2.0), 1.0 - 4.0 + 12.0);
    }

    #[test]
    // Purpose
    // -------
    // Roots of `(x - 0.5)(x + 0.25)(x - 3)` are recovered and only those
    // inside `[-1, 1]` survive the window filter.
    //
    // Given
    // -----
    // - Expanded coefficients of the cubic.
    //
    // Expect
    // ------
    // - `real_roots_in(-1, 1)` yields `[-0.25, 0.5]`.
    fn real_roots_in_filters_to_window() {
        // Arrange
        // (x - 0.5)(x + 0.25)(x - 3) = x^3 - 3.25x^2 + 0.625x + 0.375
        let p = Polynomial::new(vec![0.375, 0.625, -3.25, 1.0]);

        // Act
        let roots = p.real_roots_in(-1.0, 1.0);

        // Assert
        assert_eq!(roots.len(), 2);
        assert_relative_eq!(roots[0], -0.25, epsilon = 1e-10);
        assert_relative_eq!(roots[1], 0.5, epsilon = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // Negligible trailing coefficients do not produce spurious roots or
    // degrade the genuine one.
    fn roots_ignore_negligible_leading_terms() {
        let p = Polynomial::new(vec![-1.0, 2.0, 1e-15]);

        let roots = p.real_roots_in(-10.0, 10.0);

        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // A degree-2 fit to exact quadratic data recovers its coefficients, and
    // a sparse `{1, u^2}` basis fit to an even function does the same.
    //
    // Given
    // -----
    // - `y = 2 - 3u^2` sampled on 11 points of `[-1, 1]`, uniform weights.
    //
    // Expect
    // ------
    // - Dense fit ≈ `[2, 0, -3]`; sparse fit ≈ `[2, -3]`.
    fn fits_recover_exact_quadratic() {
        // Arrange
        let u = Array1::linspace(-1.0, 1.0, 11);
        let y = u.mapv(|x| 2.0 - 3.0 * x * x);
        let w = Array1::ones(11);

        // Act
        let dense = fit_polynomial(u.view(), y.view(), w.view(), 2).unwrap();
        let sparse = fit_power_basis(u.view(), y.view(), w.view(), &[0, 2]).unwrap();

        // Assert
        assert_relative_eq!(dense.coeffs()[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(dense.coeffs()[1], 0.0, epsilon = 1e-10);
        assert_relative_eq!(dense.coeffs()[2], -3.0, epsilon = 1e-10);
        assert_relative_eq!(sparse[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(sparse[1], -3.0, epsilon = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // Fits with more terms than points are rejected up front.
    fn fit_rejects_underdetermined_basis() {
        let u = Array1::linspace(-1.0, 1.0, 2);
        let y = Array1::zeros(2);
        let w = Array1::ones(2);

        let err = fit_polynomial(u.view(), y.view(), w.view(), 3).unwrap_err();

        assert_eq!(err, NumericsError::Underdetermined { points: 2, terms: 4 });
    }

    #[test]
    // Purpose
    // -------
    // `MappedPolynomial` reports curvature in lag units.
    //
    // Given
    // -----
    // - `p(u) = -u^2` on the window of `[0, 4]` (scale 2).
    //
    // Expect
    // ------
    // - d²/dx² = -2 / 4 = -0.5 everywhere.
    fn mapped_polynomial_rescales_curvature() {
        let mapped = MappedPolynomial::new(
            Polynomial::new(vec![0.0, 0.0, -1.0]),
            DomainMap::from_domain(0.0, 4.0),
        );

        assert_relative_eq!(mapped.second_derivative(1.3), -0.5, epsilon = 1e-12);
        assert_relative_eq!(mapped.eval(2.0), 0.0, epsilon = 1e-12);
    }
}
