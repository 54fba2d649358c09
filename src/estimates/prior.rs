//! Priors on estimated parameters.
//!
//! Each prior scores a natural-space value as a negative log-density (up
//! to an additive constant). Hyper-parameters follow the usual stock
//! assessment conventions: normal and lognormal priors take a mean and a
//! coefficient of variation, the beta prior takes a mean and standard
//! deviation on a rescaled interval `[a, b]`.
use std::fmt;

use statrs::distribution::{Beta, Continuous, LogNormal, Normal};

use crate::numerics::PROBABILITY_EPS;

#[derive(Debug, Clone, Default)]
pub enum Prior {
    /// Flat on the bounds; contributes zero.
    #[default]
    Uniform,
    /// Flat in `ln(x)`; contributes `ln(x)`.
    UniformLog,
    Normal { mu: f64, cv: f64, dist: Normal },
    Lognormal { mu: f64, cv: f64, dist: LogNormal },
    Beta { mu: f64, sigma: f64, a: f64, b: f64, dist: Beta },
}

impl Prior {
    /// Normal with mean `mu` and standard deviation `|mu| * cv`.
    pub fn normal(mu: f64, cv: f64) -> Result<Prior, String> {
        if !(cv > 0.0) || mu == 0.0 || !mu.is_finite() {
            return Err(format!("normal prior needs mu != 0 and cv > 0; got mu = {mu}, cv = {cv}"));
        }
        let dist = Normal::new(mu, mu.abs() * cv).map_err(|e| e.to_string())?;
        Ok(Prior::Normal { mu, cv, dist })
    }

    /// Lognormal with arithmetic mean `mu` and coefficient of variation `cv`.
    pub fn lognormal(mu: f64, cv: f64) -> Result<Prior, String> {
        if !(mu > 0.0) || !(cv > 0.0) {
            return Err(format!("lognormal prior needs mu > 0 and cv > 0; got mu = {mu}, cv = {cv}"));
        }
        let sigma = (1.0 + cv * cv).ln().sqrt();
        let location = mu.ln() - 0.5 * sigma * sigma;
        let dist = LogNormal::new(location, sigma).map_err(|e| e.to_string())?;
        Ok(Prior::Lognormal { mu, cv, dist })
    }

    /// Beta on `[a, b]` with mean `mu` and standard deviation `sigma`.
    pub fn beta(mu: f64, sigma: f64, a: f64, b: f64) -> Result<Prior, String> {
        if !(a < b) || !(a < mu && mu < b) || !(sigma > 0.0) {
            return Err(format!(
                "beta prior needs a < mu < b and sigma > 0; got mu = {mu}, sigma = {sigma}, a = {a}, b = {b}"
            ));
        }
        let width = b - a;
        let t = (mu - a) / width;
        let s = sigma / width;
        let nu = t * (1.0 - t) / (s * s) - 1.0;
        if !(nu > 0.0) {
            return Err(format!("beta prior sigma = {sigma} is too large for mean {mu} on [{a}, {b}]"));
        }
        let dist = Beta::new(t * nu, (1.0 - t) * nu).map_err(|e| e.to_string())?;
        Ok(Prior::Beta { mu, sigma, a, b, dist })
    }

    /// Check the prior's support against an estimate's bounds.
    pub fn admits_bounds(&self, lower: f64, upper: f64) -> Result<(), String> {
        match self {
            Prior::UniformLog | Prior::Lognormal { .. } if lower <= 0.0 => {
                Err(format!("{} prior needs a positive lower bound; got {lower}", self.name()))
            }
            Prior::Beta { a, b, .. } if lower < *a || upper > *b => Err(format!(
                "beta prior range [{a}, {b}] must contain the bounds [{lower}, {upper}]"
            )),
            _ => Ok(()),
        }
    }

    /// Negative log-density at natural-space `x`, up to a constant.
    pub fn score(&self, x: f64) -> f64 {
        match self {
            Prior::Uniform => 0.0,
            Prior::UniformLog => x.ln(),
            Prior::Normal { dist, .. } => -dist.ln_pdf(x),
            Prior::Lognormal { dist, .. } => -dist.ln_pdf(x),
            Prior::Beta { a, b, dist, .. } => {
                let z = ((x - a) / (b - a)).clamp(PROBABILITY_EPS, 1.0 - PROBABILITY_EPS);
                -dist.ln_pdf(z)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Prior::Uniform => "uniform",
            Prior::UniformLog => "uniform_log",
            Prior::Normal { .. } => "normal",
            Prior::Lognormal { .. } => "lognormal",
            Prior::Beta { .. } => "beta",
        }
    }
}

impl fmt::Display for Prior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prior::Uniform | Prior::UniformLog => f.write_str(self.name()),
            Prior::Normal { mu, cv, .. } | Prior::Lognormal { mu, cv, .. } => {
                write!(f, "{}(mu = {mu}, cv = {cv})", self.name())
            }
            Prior::Beta { mu, sigma, a, b, .. } => {
                write!(f, "beta(mu = {mu}, sigma = {sigma}, a = {a}, b = {b})")
            }
        }
    }
}
