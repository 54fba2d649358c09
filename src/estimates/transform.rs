//! Estimate transformations between natural and optimizer space.
//!
//! Purpose
//! -------
//! Let the optimizer search an unconstrained (or better conditioned) space
//! while domain objects keep natural-space values. `forward` maps natural →
//! transformed, `inverse` maps back.
//!
//! Key behaviors
//! -------------
//! - `Identity`: no change.
//! - `Log`: `ln(y)` for `y > 0`.
//! - `Logit`: `ln(y / (1 - y))` for `y` in `[0, 1]`; transformed values
//!   span about `[-708, 36.7]`.
//! - `Inverse`: `1 / y` for `y != 0`.
//!
//! Invariants & assumptions
//! ------------------------
//! - On the transformed image of an estimate's bounds,
//!   `forward(inverse(v)) == v` within `1e-9` relative. For `Logit` this
//!   holds up to [`LOGIT_EXACT_LIMIT`](crate::numerics::LOGIT_EXACT_LIMIT);
//!   above it the natural value rounds toward one, so keep start vectors
//!   and upper bounds of logit estimates below `logistic(16)`.
//! - Domain checks happen once at estimate declaration through
//!   [`Transform::admits_bounds`]; the maps themselves never fail.
use std::fmt;

use crate::{
    numerics::{safe_logistic, safe_logit},
    parameters::FromToken,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transform {
    #[default]
    Identity,
    Log,
    Logit,
    Inverse,
}

impl Transform {
    /// Natural → transformed.
    pub fn forward(self, natural: f64) -> f64 {
        match self {
            Transform::Identity => natural,
            Transform::Log => natural.ln(),
            Transform::Logit => safe_logit(natural),
            Transform::Inverse => 1.0 / natural,
        }
    }

    /// Transformed → natural.
    pub fn inverse(self, transformed: f64) -> f64 {
        match self {
            Transform::Identity => transformed,
            Transform::Log => transformed.exp(),
            Transform::Logit => safe_logistic(transformed),
            Transform::Inverse => 1.0 / transformed,
        }
    }

    /// Whether `[lower, upper]` lies inside the natural-space domain.
    pub fn admits_bounds(self, lower: f64, upper: f64) -> bool {
        match self {
            Transform::Identity => true,
            Transform::Log => lower > 0.0,
            Transform::Logit => lower >= 0.0 && upper <= 1.0,
            Transform::Inverse => lower > 0.0 || upper < 0.0,
        }
    }

    /// Image of `[lower, upper]`, ordered low to high.
    pub fn bounds(self, lower: f64, upper: f64) -> (f64, f64) {
        let (a, b) = (self.forward(lower), self.forward(upper));
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn name(self) -> &'static str {
        match self {
            Transform::Identity => "none",
            Transform::Log => "log",
            Transform::Logit => "logit",
            Transform::Inverse => "inverse",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromToken for Transform {
    const EXPECTED: &'static str = "a transformation (none, log, logit, inverse)";

    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "none" | "identity" => Some(Transform::Identity),
            "log" => Some(Transform::Log),
            "logit" => Some(Transform::Logit),
            "inverse" => Some(Transform::Inverse),
            _ => None,
        }
    }
}
