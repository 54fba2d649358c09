//! Numerically guarded scalar helpers.
//!
//! Small transforms that are prone to overflow, underflow or division by
//! zero in naïve form. Estimate transforms, mortality events and
//! likelihoods share them so the same cutoffs apply everywhere.
//!
//! # Provided items
//! - [`safe_logistic`]: `1 / (1 + exp(-x))` without overflow for large `|x|`.
//! - [`safe_logit`]: `ln(p / (1 - p))` with `p` clamped into
//!   `[f64::MIN_POSITIVE, LOGIT_CEILING]`, the widest interval on which the
//!   result is finite.
//! - [`zero_fun`]: smooth floor that keeps denominators and logarithm
//!   arguments strictly positive while staying differentiable.
//! - [`relative_eq`]: relative comparison used by transform checks.

/// Margin keeping probabilities off 0 and 1 where a density would diverge.
pub const PROBABILITY_EPS: f64 = 1e-12;

/// Largest `f64` below one; `safe_logit` of it is about 36.7.
pub const LOGIT_CEILING: f64 = 1.0 - f64::EPSILON / 2.0;

/// Largest logit that survives `safe_logit(safe_logistic(x))` within
/// `1e-9` relative. Beyond it `safe_logistic` rounds toward one and the
/// round trip loses digits, reaching about 1e-3 absolute at 30.
pub const LOGIT_EXACT_LIMIT: f64 = 16.0;

/// Threshold below which [`zero_fun`] replaces its argument.
pub const ZERO_FUN_DELTA: f64 = 1e-11;

/// Default tolerance for relative comparisons.
pub const GENERAL_TOL: f64 = 1e-9;

/// Numerically stable logistic: `σ(x) = 1 / (1 + exp(-x))`.
///
/// Branches on the sign of `x` so the exponential is always of a
/// non-positive number.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Logit of a probability, clamped away from 0 and 1.
pub fn safe_logit(p: f64) -> f64 {
    let p = p.clamp(f64::MIN_POSITIVE, LOGIT_CEILING);
    (p / (1.0 - p)).ln()
}

/// Smooth positive floor.
///
/// Returns `x` unchanged when `x >= ZERO_FUN_DELTA`; otherwise returns
/// `δ / (2 - x/δ)`, which is positive, continuous and has a continuous
/// first derivative at `x = δ`.
pub fn zero_fun(x: f64) -> f64 {
    if x >= ZERO_FUN_DELTA {
        x
    } else {
        ZERO_FUN_DELTA / (2.0 - x / ZERO_FUN_DELTA)
    }
}

/// `|a - b| <= tol * max(1, |a|, |b|)`.
pub fn relative_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * 1.0_f64.max(a.abs()).max(b.abs())
}
