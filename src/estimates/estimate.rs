//! One estimated parameter.
//!
//! An [`Estimate`] wraps the [`AddressableHandle`] of the value it tunes
//! together with its bounds, transform and prior. It never stores the
//! value itself: reads and writes go straight through the handle, so the
//! owning domain object always sees the current trial value.
use crate::{
    addressable::AddressableHandle,
    estimates::{
        errors::{EstimateError, EstimateResult},
        prior::Prior,
        transform::Transform,
    },
};

#[derive(Debug, Clone)]
pub struct Estimate {
    handle: AddressableHandle,
    lower: f64,
    upper: f64,
    transform: Transform,
    prior: Prior,
    enabled: bool,
}

impl Estimate {
    /// Declare an estimate over `handle`.
    ///
    /// # Errors
    /// - [`EstimateError::InvalidBounds`] unless both bounds are finite and
    ///   `lower < upper`.
    /// - [`EstimateError::OutsideTransformDomain`] if the bounds leave the
    ///   transform's domain.
    /// - [`EstimateError::InvalidPrior`] if the prior's support does not
    ///   cover the bounds.
    pub fn new(
        handle: AddressableHandle, lower: f64, upper: f64, transform: Transform, prior: Prior,
    ) -> EstimateResult<Estimate> {
        let label = handle.label().to_string();
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(EstimateError::InvalidBounds { label, lower, upper });
        }
        if !transform.admits_bounds(lower, upper) {
            return Err(EstimateError::OutsideTransformDomain { label, transform, lower, upper });
        }
        prior.admits_bounds(lower, upper).map_err(|reason| EstimateError::InvalidPrior { label, reason })?;
        Ok(Estimate { handle, lower, upper, transform, prior, enabled: true })
    }

    pub fn label(&self) -> &str {
        self.handle.label()
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn prior(&self) -> &Prior {
        &self.prior
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Natural-space value.
    pub fn value(&self) -> EstimateResult<f64> {
        Ok(self.handle.read()?)
    }

    pub fn set_value(&self, value: f64) -> EstimateResult<()> {
        Ok(self.handle.write(value)?)
    }

    /// Optimizer-space value.
    pub fn transformed_value(&self) -> EstimateResult<f64> {
        Ok(self.transform.forward(self.value()?))
    }

    /// Map `value` back to natural space and write it through.
    pub fn set_transformed_value(&self, value: f64) -> EstimateResult<()> {
        self.set_value(self.transform.inverse(value))
    }

    /// Bounds mapped into optimizer space.
    pub fn transformed_bounds(&self) -> (f64, f64) {
        self.transform.bounds(self.lower, self.upper)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }

    /// Distance from `value` to the bounds; zero inside them.
    pub fn bound_excess(&self, value: f64) -> f64 {
        if value < self.lower {
            self.lower - value
        } else if value > self.upper {
            value - self.upper
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{addressable::Addressables, parameters::Bound};

    fn handle(value: f64) -> (Bound<f64>, Addressables) {
        let target = Bound::new(value);
        let mut registry = Addressables::new();
        registry.register_scalar("process[recruitment].r0", &target).unwrap();
        (target, registry)
    }

    #[test]
    // Purpose
    // -------
    // Transformed writes land in the owner's field in natural space.
    fn transformed_write_reaches_owner() {
        // Arrange
        let (r0, registry) = handle(1.0e6);
        let h = registry.resolve("process[recruitment].r0").unwrap();
        let estimate = Estimate::new(h, 1.0e4, 1.0e8, Transform::Log, Prior::Uniform).unwrap();

        // Act
        estimate.set_transformed_value(2.0e6_f64.ln()).unwrap();

        // Assert
        assert!((r0.get() - 2.0e6).abs() < 1e-6);
        assert!((estimate.transformed_value().unwrap() - 2.0e6_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn bad_bounds_and_domains_are_declaration_errors() {
        let (_r0, registry) = handle(1.0);
        let h = || registry.resolve("process[recruitment].r0").unwrap();

        let inverted = Estimate::new(h(), 2.0, 1.0, Transform::Identity, Prior::Uniform).unwrap_err();
        let domain = Estimate::new(h(), 0.0, 1.0, Transform::Log, Prior::Uniform).unwrap_err();
        let prior = Estimate::new(h(), 0.0, 1.0, Transform::Identity, Prior::UniformLog).unwrap_err();

        assert!(matches!(inverted, EstimateError::InvalidBounds { .. }));
        assert!(matches!(domain, EstimateError::OutsideTransformDomain { .. }));
        assert!(matches!(prior, EstimateError::InvalidPrior { .. }));
        assert!(inverted.is_declaration_error());
    }

    #[test]
    fn bound_excess_is_distance_outside() {
        let (_r0, registry) = handle(1.0);
        let h = registry.resolve("process[recruitment].r0").unwrap();
        let estimate = Estimate::new(h, 0.0, 1.0, Transform::Identity, Prior::Uniform).unwrap();

        assert_eq!(estimate.bound_excess(0.5), 0.0);
        assert_eq!(estimate.bound_excess(1.5), 0.5);
        assert_eq!(estimate.bound_excess(-0.25), 0.25);
    }
}
