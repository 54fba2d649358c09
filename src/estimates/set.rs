//! Ordered collection of estimates.
//!
//! Purpose
//! -------
//! Hold every declared [`Estimate`] and expose the enabled ones through a
//! frozen index order that the optimizer's parameter vector follows.
//!
//! Key behaviors
//! -------------
//! - Estimates are kept in declaration order; `build_enabled_order` picks
//!   the enabled ones in that order and freezes it.
//! - Index-based accessors (`get_value`, `set_transformed_value`, ...)
//!   address positions in the frozen order.
//! - As a [`ScoreSource`], contributes one prior term per enabled estimate
//!   plus a quadratic penalty for any value outside its bounds.
//!
//! Invariants & assumptions
//! ------------------------
//! - Once the order is built, no estimate can be added and no enabled flag
//!   can change ([`EstimateError::OrderFrozen`]).
//! - Index access before the order exists fails with
//!   [`EstimateError::OrderNotBuilt`]; past the end, with
//!   [`EstimateError::IndexOutOfRange`].
//! - Priors are evaluated at the value clamped into the bounds, so an
//!   out-of-bounds trial is scored by the bound penalty alone.
use ndarray::Array1;
use tracing::debug;

use crate::{
    estimates::{
        errors::{EstimateError, EstimateResult},
        estimate::Estimate,
    },
    objective::{Contribution, ContributionKind, ObjResult, ScoreSource},
};

/// Multiplier on the squared distance outside an estimate's bounds.
pub const BOUND_PENALTY: f64 = 1.0e4;

#[derive(Debug, Clone, Default)]
pub struct EstimateSet {
    estimates: Vec<Estimate>,
    order: Option<Vec<usize>>,
}

impl EstimateSet {
    pub fn new() -> EstimateSet {
        EstimateSet::default()
    }

    /// Append a declared estimate.
    ///
    /// # Errors
    /// - [`EstimateError::OrderFrozen`] after `build_enabled_order`.
    /// - [`EstimateError::DuplicateEstimate`] if the label is taken.
    pub fn add(&mut self, estimate: Estimate) -> EstimateResult<()> {
        if self.order.is_some() {
            return Err(EstimateError::OrderFrozen { label: estimate.label().to_string() });
        }
        if self.get(estimate.label()).is_some() {
            return Err(EstimateError::DuplicateEstimate { label: estimate.label().to_string() });
        }
        self.estimates.push(estimate);
        Ok(())
    }

    /// Toggle an estimate before the order is frozen.
    pub fn set_enabled(&mut self, label: &str, enabled: bool) -> EstimateResult<()> {
        if self.order.is_some() {
            return Err(EstimateError::OrderFrozen { label: label.to_string() });
        }
        let estimate = self
            .estimates
            .iter_mut()
            .find(|e| e.label() == label)
            .ok_or_else(|| EstimateError::UnknownEstimate { label: label.to_string() })?;
        estimate.set_enabled(enabled);
        Ok(())
    }

    /// Freeze the enabled order and return its length. Calling again
    /// returns the existing order's length.
    pub fn build_enabled_order(&mut self) -> usize {
        if let Some(order) = &self.order {
            return order.len();
        }
        let order: Vec<usize> =
            self.estimates.iter().enumerate().filter(|(_, e)| e.is_enabled()).map(|(i, _)| i).collect();
        debug!(enabled = order.len(), declared = self.estimates.len(), "froze estimate order");
        let n = order.len();
        self.order = Some(order);
        n
    }

    pub fn is_frozen(&self) -> bool {
        self.order.is_some()
    }

    fn order(&self) -> EstimateResult<&[usize]> {
        self.order.as_deref().ok_or(EstimateError::OrderNotBuilt)
    }

    pub fn enabled_count(&self) -> EstimateResult<usize> {
        Ok(self.order()?.len())
    }

    /// Enabled estimate at position `index` of the frozen order.
    pub fn enabled(&self, index: usize) -> EstimateResult<&Estimate> {
        let order = self.order()?;
        let slot = *order.get(index).ok_or(EstimateError::IndexOutOfRange { index, len: order.len() })?;
        Ok(&self.estimates[slot])
    }

    pub fn get_value(&self, index: usize) -> EstimateResult<f64> {
        self.enabled(index)?.value()
    }

    pub fn set_value(&self, index: usize, value: f64) -> EstimateResult<()> {
        self.enabled(index)?.set_value(value)
    }

    pub fn get_transformed_value(&self, index: usize) -> EstimateResult<f64> {
        self.enabled(index)?.transformed_value()
    }

    pub fn set_transformed_value(&self, index: usize, value: f64) -> EstimateResult<()> {
        self.enabled(index)?.set_transformed_value(value)
    }

    /// Current optimizer-space vector in frozen order.
    pub fn transformed_values(&self) -> EstimateResult<Array1<f64>> {
        self.order()?.iter().map(|&i| self.estimates[i].transformed_value()).collect()
    }

    /// Current natural-space vector in frozen order.
    pub fn natural_values(&self) -> EstimateResult<Array1<f64>> {
        self.order()?.iter().map(|&i| self.estimates[i].value()).collect()
    }

    /// Optimizer-space bounds in frozen order.
    pub fn transformed_bounds(&self) -> EstimateResult<Vec<(f64, f64)>> {
        Ok(self.order()?.iter().map(|&i| self.estimates[i].transformed_bounds()).collect())
    }

    /// Labels of the enabled estimates in frozen order.
    pub fn enabled_labels(&self) -> EstimateResult<Vec<&str>> {
        Ok(self.order()?.iter().map(|&i| self.estimates[i].label()).collect())
    }

    pub fn get(&self, label: &str) -> Option<&Estimate> {
        self.estimates.iter().find(|e| e.label() == label)
    }

    /// All declared estimates, enabled or not, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Estimate> {
        self.estimates.iter()
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    fn scored(&self) -> Box<dyn Iterator<Item = &Estimate> + '_> {
        match &self.order {
            Some(order) => Box::new(order.iter().map(|&i| &self.estimates[i])),
            None => Box::new(self.estimates.iter().filter(|e| e.is_enabled())),
        }
    }
}

impl ScoreSource for EstimateSet {
    fn contributions(&self, sink: &mut Vec<Contribution>) -> ObjResult<()> {
        for estimate in self.scored() {
            let value = estimate.value()?;
            let clamped = value.clamp(estimate.lower(), estimate.upper());
            sink.push(Contribution::new(
                ContributionKind::Prior,
                estimate.label(),
                estimate.prior().score(clamped),
            ));
            let excess = estimate.bound_excess(value);
            if excess > 0.0 {
                sink.push(Contribution::new(
                    ContributionKind::Bounds,
                    estimate.label(),
                    BOUND_PENALTY * excess * excess,
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        addressable::Addressables,
        estimates::{Prior, Transform},
        numerics::relative_eq,
        parameters::Bound,
    };

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Frozen enabled order and its errors.
    // - Index-based transformed writes.
    // - Prior and bound contributions.
    // -------------------------------------------------------------------------

    struct Fixture {
        _q: Bound<f64>,
        _sigma: Bound<f64>,
        _m: Bound<f64>,
        registry: Addressables,
    }

    fn fixture() -> Fixture {
        let q = Bound::new(0.5);
        let sigma = Bound::new(0.3);
        let m = Bound::new(0.2);
        let mut registry = Addressables::new();
        registry.register_scalar("q", &q).unwrap();
        registry.register_scalar("sigma", &sigma).unwrap();
        registry.register_scalar("m", &m).unwrap();
        Fixture { _q: q, _sigma: sigma, _m: m, registry }
    }

    fn declare(set: &mut EstimateSet, registry: &Addressables, label: &str, t: Transform) {
        let h = registry.resolve(label).unwrap();
        set.add(Estimate::new(h, 0.01, 10.0, t, Prior::Uniform).unwrap()).unwrap();
    }

    #[test]
    // Purpose
    // -------
    // Only enabled estimates enter the frozen order, in declaration order,
    // and the order cannot change afterwards.
    fn enabled_order_is_declaration_order_and_frozen() {
        // Arrange
        let f = fixture();
        let mut set = EstimateSet::new();
        declare(&mut set, &f.registry, "q", Transform::Identity);
        declare(&mut set, &f.registry, "m", Transform::Identity);
        declare(&mut set, &f.registry, "sigma", Transform::Log);
        set.set_enabled("m", false).unwrap();

        // Act
        let n = set.build_enabled_order();

        // Assert
        assert_eq!(n, 2);
        assert_eq!(set.enabled_labels().unwrap(), vec!["q", "sigma"]);
        assert_eq!(set.set_enabled("m", true), Err(EstimateError::OrderFrozen { label: "m".to_string() }));
        assert_eq!(set.build_enabled_order(), 2);
    }

    #[test]
    fn index_access_requires_a_built_order_in_range() {
        let f = fixture();
        let mut set = EstimateSet::new();
        declare(&mut set, &f.registry, "q", Transform::Identity);

        assert_eq!(set.get_value(0), Err(EstimateError::OrderNotBuilt));
        set.build_enabled_order();
        assert_eq!(set.get_value(1), Err(EstimateError::IndexOutOfRange { index: 1, len: 1 }));
    }

    #[test]
    // Purpose
    // -------
    // Transformed writes go through the transform into the owner's slot.
    fn transformed_writes_follow_the_order() {
        // Arrange
        let f = fixture();
        let mut set = EstimateSet::new();
        declare(&mut set, &f.registry, "q", Transform::Identity);
        declare(&mut set, &f.registry, "sigma", Transform::Log);
        set.build_enabled_order();

        // Act
        set.set_transformed_value(0, 0.7).unwrap();
        set.set_transformed_value(1, 0.0).unwrap();

        // Assert
        assert_eq!(f.registry.get("q").unwrap(), 0.7);
        assert_eq!(f.registry.get("sigma").unwrap(), 1.0);
        assert_eq!(set.transformed_values().unwrap().to_vec(), vec![0.7, 0.0]);
        assert_eq!(set.transformed_bounds().unwrap()[1], (0.01_f64.ln(), 10.0_f64.ln()));
    }

    #[test]
    // Purpose
    // -------
    // Natural writes read back through the transform, and transformed writes
    // read back unchanged, for every transform.
    //
    // Given
    // -----
    // - One estimate per transform: identity and log on [0.01, 10], logit
    //   on [0.01, 0.99], inverse on [0.1, 10].
    //
    // Expect
    // ------
    // - `set_value(i, y)` then `get_transformed_value(i) == T(y)` within
    //   1e-9 relative.
    // - `set_transformed_value(i, x)` then `get_transformed_value(i) == x`
    //   and `get_value(i) == T⁻¹(x)` within 1e-9 relative.
    fn every_transform_round_trips_through_the_index_api() {
        // Arrange
        let slots: Vec<Bound<f64>> = (0..4).map(|_| Bound::new(0.5)).collect();
        let mut registry = Addressables::new();
        let cases = [
            ("identity", Transform::Identity, (0.01, 10.0), 2.5, 2.5_f64, 1.5),
            ("log", Transform::Log, (0.01, 10.0), 2.5, 2.5_f64.ln(), 0.2),
            ("logit", Transform::Logit, (0.01, 0.99), 0.3, (0.3_f64 / 0.7).ln(), -0.4),
            ("inverse", Transform::Inverse, (0.1, 10.0), 2.5, 0.4, 0.8),
        ];
        let mut set = EstimateSet::new();
        for ((label, t, (lower, upper), ..), slot) in cases.iter().zip(&slots) {
            registry.register_scalar(label, slot).unwrap();
            let handle = registry.resolve(label).unwrap();
            set.add(Estimate::new(handle, *lower, *upper, *t, Prior::Uniform).unwrap()).unwrap();
        }
        set.build_enabled_order();

        for (i, (label, t, _, natural, expected_transformed, trial)) in cases.into_iter().enumerate() {
            // Act
            set.set_value(i, natural).unwrap();
            let transformed = set.get_transformed_value(i).unwrap();
            set.set_transformed_value(i, trial).unwrap();

            // Assert
            assert!(relative_eq(transformed, expected_transformed, 1e-9), "{label}: {transformed}");
            assert!(relative_eq(set.get_transformed_value(i).unwrap(), trial, 1e-9), "{label}");
            assert!(relative_eq(set.get_value(i).unwrap(), t.inverse(trial), 1e-9), "{label}");
            assert!(relative_eq(registry.get(label).unwrap(), t.inverse(trial), 1e-9), "{label}");
        }
    }

    #[test]
    fn out_of_bounds_values_add_a_bound_penalty() {
        let f = fixture();
        let mut set = EstimateSet::new();
        declare(&mut set, &f.registry, "q", Transform::Identity);
        set.build_enabled_order();
        set.set_value(0, 12.0).unwrap();

        let mut sink = Vec::new();
        set.contributions(&mut sink).unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].kind, ContributionKind::Prior);
        assert_eq!(sink[1], Contribution::new(ContributionKind::Bounds, "q", BOUND_PENALTY * 4.0));
    }

    #[test]
    fn add_after_freeze_and_duplicates_are_rejected() {
        let f = fixture();
        let mut set = EstimateSet::new();
        declare(&mut set, &f.registry, "q", Transform::Identity);
        let again = Estimate::new(f.registry.resolve("q").unwrap(), 0.1, 1.0, Transform::Identity, Prior::Uniform)
            .unwrap();

        assert!(matches!(set.add(again.clone()), Err(EstimateError::DuplicateEstimate { .. })));
        set.build_enabled_order();
        assert!(matches!(set.add(again), Err(EstimateError::OrderFrozen { .. })));
    }
}
