//! annealing — seeded simulated annealing over a bounded parameter box.
//!
//! Purpose
//! -------
//! Maximize a possibly rough, non-differentiable objective (a likelihood on
//! unbinned lags, optionally with nuisance parameters) and keep every
//! evaluated trial for post-hoc analysis.
//!
//! Key behaviors
//! -------------
//! - argmin's `SimulatedAnnealing` drives acceptance with a Boltzmann
//!   temperature schedule and stops after `stall_best` iterations without a
//!   new best, or at `max_iters`.
//! - Each coordinate is perturbed by its own [`Perturbation`]: additive
//!   steps for location-like parameters, log-scale steps for positive
//!   scale parameters. Step size shrinks with the temperature ratio.
//! - Every finite evaluation is appended to the trial log returned in
//!   [`AnnealOutcome::trials`].
//!
//! Invariants & assumptions
//! ------------------------
//! - A fixed `seed` makes the run reproducible: the solver RNG and the
//!   perturbation RNG are both derived from it.
//! - Non-finite objective values map to a cost of `f64::MAX`, which the
//!   acceptance rule never prefers; such points are not logged as trials.
//!
//! Downstream usage
//! ----------------
//! - `estimators::anneal` builds the objective from a `LagScorer`.
use crate::optimization::{
    errors::{OptError, OptResult},
    fit_optimizer::{Theta, validate_theta},
};
use argmin::core::{
    ArgminError, CostFunction, Error, Executor, State, TerminationReason, TerminationStatus,
};
use argmin::solver::simulatedannealing::{Anneal, SATempFunc, SimulatedAnnealing};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Mutex;
use tracing::debug;

const MIN_STEP_SCALE: f64 = 1e-3;
const LOG_STEP: f64 = std::f64::consts::LN_2;
const PERTURB_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Objective maximized by [`anneal`].
pub trait AnnealObjective {
    fn value(&self, theta: &Theta) -> OptResult<f64>;
}

/// How one coordinate moves between annealing steps.
///
/// - `Additive`: `x + u · scale · (upper - lower) / 2`, clamped.
/// - `Multiplicative`: `x · exp(u · scale · ln 2)`, clamped; requires
///   `0 < lower`.
///
/// `u` is uniform on `[-1, 1)` and `scale` is the temperature ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Perturbation {
    Additive { lower: f64, upper: f64 },
    Multiplicative { lower: f64, upper: f64 },
}

impl Perturbation {
    fn bounds(&self) -> (f64, f64) {
        match *self {
            Perturbation::Additive { lower, upper } => (lower, upper),
            Perturbation::Multiplicative { lower, upper } => (lower, upper),
        }
    }

    fn validate(&self) -> OptResult<()> {
        let (lower, upper) = self.bounds();
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(OptError::InvalidBounds {
                lower,
                upper,
                reason: "Perturbation bounds must be finite and increasing.",
            });
        }
        if matches!(self, Perturbation::Multiplicative { .. }) && lower <= 0.0 {
            return Err(OptError::InvalidBounds {
                lower,
                upper,
                reason: "Multiplicative perturbation requires a positive lower bound.",
            });
        }
        Ok(())
    }

    fn apply(&self, x: f64, step: f64) -> f64 {
        let (lower, upper) = self.bounds();
        let moved = match self {
            Perturbation::Additive { .. } => x + step * 0.5 * (upper - lower),
            Perturbation::Multiplicative { .. } => x * (step * LOG_STEP).exp(),
        };
        moved.clamp(lower, upper)
    }
}

/// Annealing schedule and stopping rules.
///
/// Default: `initial_temp = 1.0`, `max_iters = 2000`, `stall_best = 300`,
/// `seed = None` (entropy-seeded).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnealOptions {
    pub initial_temp: f64,
    pub max_iters: u64,
    pub stall_best: u64,
    pub seed: Option<u64>,
}

impl Default for AnnealOptions {
    fn default() -> Self {
        Self { initial_temp: 1.0, max_iters: 2000, stall_best: 300, seed: None }
    }
}

/// Result of [`anneal`].
///
/// - `theta_hat` / `value`: best point and its objective value.
/// - `trials`: every finite `(θ, value)` evaluated, in evaluation order.
/// - `hit_iteration_cap`: the run stopped at `max_iters` rather than by
///   stalling.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub iterations: u64,
    pub trials: Vec<(Theta, f64)>,
    pub hit_iteration_cap: bool,
}

struct AnnealProblem<'a, O> {
    objective: &'a O,
    moves: &'a [Perturbation],
    initial_temp: f64,
    rng: Mutex<Xoshiro256PlusPlus>,
    trials: &'a Mutex<Vec<(Theta, f64)>>,
}

impl<O: AnnealObjective> CostFunction for AnnealProblem<'_, O> {
    type Param = Theta;
    type Output = f64;

    fn cost(&self, theta: &Theta) -> Result<f64, Error> {
        let value = self.objective.value(theta)?;
        if !value.is_finite() {
            return Ok(f64::MAX);
        }
        if let Ok(mut trials) = self.trials.lock() {
            trials.push((theta.clone(), value));
        }
        Ok(-value)
    }
}

impl<O: AnnealObjective> Anneal for AnnealProblem<'_, O> {
    type Param = Theta;
    type Output = Theta;
    type Float = f64;

    fn anneal(&self, param: &Theta, temp: f64) -> Result<Theta, Error> {
        let ratio = temp / self.initial_temp;
        let scale = if ratio.is_finite() { ratio.clamp(MIN_STEP_SCALE, 1.0) } else { 1.0 };
        let mut rng = self.rng.lock().map_err(|_| ArgminError::PotentialBug {
            text: "annealing rng mutex poisoned".to_string(),
        })?;
        let mut next = param.clone();
        for (x, mv) in next.iter_mut().zip(self.moves) {
            let u: f64 = rng.gen_range(-1.0..1.0);
            *x = mv.apply(*x, u * scale);
        }
        Ok(next)
    }
}

/// Maximize `objective` from `theta0` by simulated annealing.
///
/// Parameters
/// ----------
/// - `theta0`: starting point, one entry per element of `moves`; values are
///   clamped into their bounds first.
/// - `moves`: per-coordinate perturbation rule and bounds.
/// - `opts`: schedule, stopping rules and seed.
///
/// Errors
/// ------
/// - `OptError::ThetaLengthMismatch` / `OptError::InvalidThetaInput` for a
///   bad starting point.
/// - `OptError::InvalidBounds` for an invalid perturbation rule.
/// - `OptError::InvalidParameter` (from argmin) for a non-positive
///   temperature.
/// - Any error raised by the objective.
pub fn anneal<O: AnnealObjective>(
    objective: &O, theta0: Theta, moves: &[Perturbation], opts: &AnnealOptions,
) -> OptResult<AnnealOutcome> {
    validate_theta(&theta0, moves.len())?;
    for mv in moves {
        mv.validate()?;
    }
    let mut start = theta0;
    for (x, mv) in start.iter_mut().zip(moves) {
        let (lower, upper) = mv.bounds();
        *x = x.clamp(lower, upper);
    }

    let seed = opts.seed.unwrap_or_else(rand::random);
    let solver =
        SimulatedAnnealing::new_with_rng(opts.initial_temp, Xoshiro256PlusPlus::seed_from_u64(seed))?
            .with_temp_func(SATempFunc::Boltzmann)
            .with_stall_best(opts.stall_best);
    let trials = Mutex::new(Vec::new());
    let problem = AnnealProblem {
        objective,
        moves,
        initial_temp: opts.initial_temp,
        rng: Mutex::new(Xoshiro256PlusPlus::seed_from_u64(seed ^ PERTURB_STREAM)),
        trials: &trials,
    };

    let result = Executor::new(problem, solver)
        .configure(|state| state.param(start).max_iters(opts.max_iters))
        .run()?;
    let state = result.state();
    let theta_hat = state.get_best_param().cloned().ok_or(OptError::MissingThetaHat)?;
    let value = -state.get_best_cost();
    if !value.is_finite() || state.get_best_cost() == f64::MAX {
        return Err(OptError::NonFiniteCost { value });
    }
    let iterations = state.get_iter();
    let hit_iteration_cap = matches!(
        state.get_termination_status(),
        TerminationStatus::Terminated(TerminationReason::MaxItersReached)
    );
    debug!(iterations, value, hit_iteration_cap, seed, "annealing finished");
    let trials = trials.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
    Ok(AnnealOutcome { theta_hat, value, iterations, trials, hit_iteration_cap })
}
