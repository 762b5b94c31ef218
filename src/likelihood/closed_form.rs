//! ClosedFormApprox: per-bin profile likelihood over the shared source rate.
//!
//! Purpose
//! -------
//! Replace the marginal series of the exact model with the likelihood at the
//! best shared rate `λ` in each bin. Detector 1 sees `aλ + b`, detector 2
//! sees `pλ + q`, where `(a, p)` are the relation's split fractions and
//! `(b, q)` its per-bin backgrounds.
//!
//! Key behaviors
//! -------------
//! - Setting the `λ`-derivative of the bin log-likelihood to zero gives
//!   `A λ² + B λ + C = 0` with `A = ap`, `B = aq + pb − (n + m)ap` and
//!   `C = bq − aqn − pbm`.
//! - Roots come from the cancellation-safe form `x = −(B/2 + sgn(B)√D)`,
//!   roots `x / A` and `C / x`, with `D = (B/2)² − AC`.
//! - Both roots are evaluated and the larger log-likelihood kept.
//!
//! Invariants & assumptions
//! ------------------------
//! - A negative rate is clamped to zero before evaluation. When the clamped
//!   root is the one kept, the bin's best rate lies outside the model and a
//!   warning is logged; a clamped root that loses is routine and only
//!   logged at debug level.
//! - A negative discriminant is clamped to zero and logged as a warning.
use crate::{
    likelihood::{
        errors::LikelihoodResult,
        evaluator::{LikelihoodEvaluator, check_lengths},
    },
    model::{
        context::ComputeContext,
        relation::{DetectorRelation, count_of},
    },
    numerics::special::xlogy,
};
use ndarray::ArrayView1;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClosedFormApprox;

/// Split fractions and backgrounds for one relation.
#[derive(Debug, Clone, Copy)]
struct BinModel {
    a: f64,
    p: f64,
    b: f64,
    q: f64,
}

#[derive(Debug, Default, PartialEq)]
struct ClampTally {
    negative_rates: usize,
    clamped_kept: usize,
    negative_discriminants: usize,
}

impl BinModel {
    fn from_relation(relation: &DetectorRelation) -> Self {
        let (a, p) = relation.split_fractions();
        let (b, q) = relation.bin_background_rates();
        Self { a, p, b, q }
    }

    fn log_likelihood_at(&self, ctx: &ComputeContext, n: usize, m: usize, rate: f64) -> f64 {
        let (nf, mf) = (n as f64, m as f64);
        -(rate + self.b + self.q) + xlogy(nf, self.a * rate + self.b) + xlogy(mf, self.p * rate + self.q)
            - ctx.ln_factorial(n)
            - ctx.ln_factorial(m)
    }

    fn rate_roots(&self, n: f64, m: f64, tally: &mut ClampTally) -> (f64, f64) {
        let qa = self.a * self.p;
        let qb = self.a * self.q + self.p * self.b - (n + m) * qa;
        let qc = self.b * self.q - self.a * self.q * n - self.p * self.b * m;
        let half_b = 0.5 * qb;
        let mut disc = half_b * half_b - qa * qc;
        if disc < 0.0 {
            tally.negative_discriminants += 1;
            disc = 0.0;
        }
        let sign = if qb < 0.0 { -1.0 } else { 1.0 };
        let x = -(half_b + sign * disc.sqrt());
        if x == 0.0 {
            return (0.0, 0.0);
        }
        (x / qa, qc / x)
    }

    fn bin_score(&self, ctx: &ComputeContext, n: usize, m: usize, tally: &mut ClampTally) -> f64 {
        let (r1, r2) = self.rate_roots(n as f64, m as f64, tally);
        let (mut best, mut best_clamped) = (f64::NEG_INFINITY, false);
        for rate in [r1, r2] {
            let clamped = rate < 0.0 || rate.is_nan();
            if clamped {
                tally.negative_rates += 1;
            }
            let value = self.log_likelihood_at(ctx, n, m, if clamped { 0.0 } else { rate });
            if value > best {
                (best, best_clamped) = (value, clamped);
            }
        }
        if best_clamped {
            tally.clamped_kept += 1;
        }
        best
    }
}

impl ClosedFormApprox {
    fn score_with_tally(
        &self, ctx: &ComputeContext, relation: &DetectorRelation, reference: ArrayView1<'_, f64>,
        shifted: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<(f64, ClampTally)> {
        check_lengths(reference, shifted)?;
        let model = BinModel::from_relation(relation);
        let mut tally = ClampTally::default();
        let mut total = 0.0;
        for (index, (&h1, &h2)) in reference.iter().zip(shifted.iter()).enumerate() {
            let n = count_of(index, h1)?;
            let m = count_of(index, h2)?;
            total += model.bin_score(ctx, n, m, &mut tally);
        }
        Ok((total, tally))
    }
}

impl LikelihoodEvaluator for ClosedFormApprox {
    fn name(&self) -> &'static str {
        "closed_form"
    }

    fn score(
        &self, ctx: &ComputeContext, relation: &DetectorRelation, reference: ArrayView1<'_, f64>,
        shifted: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<f64> {
        let (total, tally) = self.score_with_tally(ctx, relation, reference, shifted)?;
        if tally.negative_discriminants > 0 {
            warn!(bins = tally.negative_discriminants, "negative rate discriminant clamped to zero");
        }
        if tally.clamped_kept > 0 {
            warn!(bins = tally.clamped_kept, "best shared rate was negative; scored at zero");
        }
        if tally.negative_rates > tally.clamped_kept {
            debug!(roots = tally.negative_rates, "negative solved rates clamped to zero");
        }
        Ok(total)
    }
}
