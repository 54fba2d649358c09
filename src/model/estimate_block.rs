//! `estimate` and `penalty` blocks.
//!
//! Both are read with the same binder as model components; an estimate is
//! only turned into an [`Estimate`] once every addressable is registered.
use crate::{
    addressable::Addressables,
    estimates::{Estimate, Prior, Transform},
    model::{
        config::ConfigBlock,
        errors::ModelResult,
        traits::report,
    },
    objective::Penalty,
    parameters::{BindResult, Binding, Bound, ConfigError, Diagnostics, ParameterList},
};

/// Block kind for estimates.
pub const ESTIMATE_KIND: &str = "estimate";

/// Block kind for penalties.
pub const PENALTY_KIND: &str = "penalty";

/// One `estimate` block after loading.
#[derive(Debug)]
pub struct EstimateBlock {
    label: String,
    parameters: ParameterList,
    parameter: Bound<String>,
    lower_bound: Bound<f64>,
    upper_bound: Bound<f64>,
    transformation: Bound<Transform>,
    prior: Bound<String>,
    mu: Bound<f64>,
    cv: Bound<f64>,
    sigma: Bound<f64>,
    a: Bound<f64>,
    b: Bound<f64>,
    enabled: Bound<bool>,
}

impl EstimateBlock {
    pub fn new(label: &str) -> BindResult<EstimateBlock> {
        let block = EstimateBlock {
            label: label.to_string(),
            parameters: ParameterList::new(),
            parameter: Bound::new(String::new()),
            lower_bound: Bound::new(0.0),
            upper_bound: Bound::new(0.0),
            transformation: Bound::new(Transform::Identity),
            prior: Bound::new("uniform".to_string()),
            mu: Bound::new(0.0),
            cv: Bound::new(0.0),
            sigma: Bound::new(0.0),
            a: Bound::new(0.0),
            b: Bound::new(1.0),
            enabled: Bound::new(true),
        };
        let mut parameters = ParameterList::new();
        parameters.bind("parameter", Binding::scalar(&block.parameter), "Addressable to estimate")?;
        parameters.bind("lower_bound", Binding::scalar(&block.lower_bound), "Lower bound")?;
        parameters.bind("upper_bound", Binding::scalar(&block.upper_bound), "Upper bound")?;
        parameters.bind(
            "transformation",
            Binding::scalar_or(&block.transformation, Transform::Identity),
            "Transform seen by the minimiser",
        )?;
        parameters.bind("prior", Binding::scalar_or(&block.prior, "uniform".to_string()), "Prior type")?;
        parameters.bind("mu", Binding::scalar_or(&block.mu, 0.0), "Prior mean")?;
        parameters.bind("cv", Binding::scalar_or(&block.cv, 0.0), "Prior coefficient of variation")?;
        parameters.bind("sigma", Binding::scalar_or(&block.sigma, 0.0), "Prior standard deviation (beta)")?;
        parameters.bind("a", Binding::scalar_or(&block.a, 0.0), "Beta lower limit")?;
        parameters.bind("b", Binding::scalar_or(&block.b, 1.0), "Beta upper limit")?;
        parameters.bind("enabled", Binding::scalar_or(&block.enabled, true), "Handed to the minimiser")?;
        Ok(EstimateBlock { parameters, ..block })
    }

    /// Bind and load `block`.
    pub fn load(block: &ConfigBlock, diagnostics: &mut Diagnostics) -> BindResult<EstimateBlock> {
        let mut estimate = EstimateBlock::new(&block.label)?;
        block.load_into(&mut estimate.parameters, diagnostics)?;
        Ok(estimate)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn require(&self, names: &[&str], diagnostics: &mut Diagnostics) -> bool {
        let prior = self.prior.borrow();
        let mut complete = true;
        for name in names.iter().filter(|n| !self.parameters.is_defined(n)) {
            report(diagnostics, &self.parameters, "prior", format!("a {prior} prior requires '{name}'"));
            complete = false;
        }
        complete
    }

    fn build_prior(&self, diagnostics: &mut Diagnostics) -> Option<Prior> {
        let name = self.prior.borrow().to_ascii_lowercase();
        let prior = match name.as_str() {
            "uniform" => Ok(Prior::Uniform),
            "uniform_log" => Ok(Prior::UniformLog),
            "normal" if self.require(&["mu", "cv"], diagnostics) => Prior::normal(self.mu.get(), self.cv.get()),
            "lognormal" if self.require(&["mu", "cv"], diagnostics) => {
                Prior::lognormal(self.mu.get(), self.cv.get())
            }
            "beta" if self.require(&["mu", "sigma"], diagnostics) => {
                Prior::beta(self.mu.get(), self.sigma.get(), self.a.get(), self.b.get())
            }
            "normal" | "lognormal" | "beta" => return None,
            other => Err(format!("unknown prior '{other}'")),
        };
        match prior {
            Ok(prior) => Some(prior),
            Err(message) => {
                report(diagnostics, &self.parameters, "prior", message);
                None
            }
        }
    }

    /// Declare the estimate against `registry`.
    ///
    /// Configuration problems go to `diagnostics` and yield `None`; a slot
    /// that cannot be read is an internal error.
    pub fn build(&self, registry: &Addressables, diagnostics: &mut Diagnostics) -> ModelResult<Option<Estimate>> {
        let target = self.parameter.cloned();
        let handle = match registry.resolve(&target) {
            Ok(handle) => Some(handle),
            Err(_) => {
                report(diagnostics, &self.parameters, "parameter", format!("parameter '{target}' is not addressable"));
                None
            }
        };
        let prior = self.build_prior(diagnostics);
        let (Some(handle), Some(prior)) = (handle, prior) else {
            return Ok(None);
        };

        let declared =
            Estimate::new(handle, self.lower_bound.get(), self.upper_bound.get(), self.transformation.get(), prior);
        let estimate = match declared {
            Ok(estimate) => estimate,
            Err(err) => {
                let mut err = ConfigError::from(err);
                err.location = self.parameters.location_of("lower_bound");
                diagnostics.push(err);
                return Ok(None);
            }
        };
        let start = estimate.value()?;
        if !estimate.contains(start) {
            report(
                diagnostics,
                &self.parameters,
                "parameter",
                format!(
                    "starting value {start} of '{target}' is outside the bounds [{}, {}]",
                    estimate.lower(),
                    estimate.upper()
                ),
            );
            return Ok(None);
        }
        Ok(Some(estimate))
    }
}

/// Bind and load a `penalty` block, then build the [`Penalty`].
pub fn load_penalty(block: &ConfigBlock, diagnostics: &mut Diagnostics) -> BindResult<Penalty> {
    let multiplier = Bound::new(1.0);
    let log_scale = Bound::new(false);
    let mut parameters = ParameterList::new();
    parameters.bind("multiplier", Binding::scalar_or(&multiplier, 1.0), "Penalty multiplier")?;
    parameters.bind("log_scale", Binding::scalar_or(&log_scale, false), "Compare on the log scale")?;
    block.load_into(&mut parameters, diagnostics)?;
    if multiplier.get() < 0.0 {
        report(diagnostics, &parameters, "multiplier", "multiplier cannot be negative");
    }
    Ok(Penalty::new(block.label.clone(), multiplier.get(), log_scale.get()))
}
