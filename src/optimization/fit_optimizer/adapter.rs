//! Bridge from a [`FitObjective`] to argmin's `CostFunction` and `Gradient`.
//!
//! The solver minimizes `c(θ) = -value(θ)`. Analytic gradients are negated;
//! the finite-difference fallback differentiates the cost closure directly,
//! so it needs no sign flip.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    fit_optimizer::{
        traits::FitObjective,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

#[derive(Debug, Clone)]
pub struct CostAdapter<'a, F: FitObjective> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: FitObjective> CostAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

impl<F: FitObjective> CostFunction for CostAdapter<'_, F> {
    type Param = Theta;
    type Output = Cost;

    /// `-value(θ)`; a non-finite objective is an `OptError::NonFiniteCost`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(-output)
    }
}

impl<F: FitObjective> Gradient for CostAdapter<'_, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Gradient of the cost at `θ`.
    ///
    /// Notes
    /// -----
    /// - Analytic gradients are validated and negated.
    /// - Without one, central differences are tried first. If any cost
    ///   evaluation failed or the result is non-finite, forward differences
    ///   are used once; a failure there is returned.
    /// - The finite-difference closure must return `f64`, so the first cost
    ///   error is parked in a `RefCell` and `NaN` is returned in its place.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |theta: &Theta| -> f64 {
                    match self.cost(theta) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                let central = theta.central_diff(&cost_func);
                if closure_err.borrow().is_none() && validate_grad(&central, dim).is_ok() {
                    return Ok(central);
                }
                forward_diff_checked(theta, &cost_func, &closure_err)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn forward_diff_checked<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> Result<Grad, Error> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use approx::assert_relative_eq;
    use ndarray::array;

    // Objective -(θ0 - 2)^2, with or without its analytic gradient.
    struct Bowl {
        analytic: bool,
    }

    impl FitObjective for Bowl {
        type Data = ();

        fn value(&self, theta: &Theta, _data: &()) -> OptResult<f64> {
            Ok(-(theta[0] - 2.0).powi(2))
        }

        fn check(&self, _theta: &Theta, _data: &()) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, _data: &()) -> OptResult<Grad> {
            if self.analytic {
                Ok(array![-2.0 * (theta[0] - 2.0)])
            } else {
                Err(OptError::GradientNotImplemented)
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The cost and both gradient paths agree on sign and magnitude.
    //
    // Given
    // -----
    // - `value = -(θ - 2)^2` evaluated at θ = 0.
    //
    // Expect
    // ------
    // - cost = 4 and d(cost)/dθ = -4 for analytic and finite-difference paths.
    fn cost_and_gradient_are_sign_flipped_objective() {
        let theta = array![0.0];
        let analytic = Bowl { analytic: true };
        let numeric = Bowl { analytic: false };

        let adapter_a = CostAdapter::new(&analytic, &());
        let adapter_n = CostAdapter::new(&numeric, &());

        assert_relative_eq!(adapter_a.cost(&theta).unwrap(), 4.0);
        assert_relative_eq!(adapter_a.gradient(&theta).unwrap()[0], -4.0);
        assert_relative_eq!(adapter_n.gradient(&theta).unwrap()[0], -4.0, epsilon = 1e-5);
    }
}
