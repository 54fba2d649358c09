//! Model-scoped addressable registry.
//!
//! Purpose
//! -------
//! Map labels such as `process[fishing].u_max` to the [`NumericSlot`] that
//! reads and writes the underlying value, so the estimate set and reports
//! can address any tunable number without knowing its owner's type.
//!
//! Invariants & assumptions
//! ------------------------
//! - Labels are unique within one registry; one registry belongs to one
//!   model instance and is passed explicitly to whatever builds that model.
//! - The registry owns only the label → capability association. Slots hold
//!   weak references; reads or writes after the owner is dropped fail with
//!   [`AddressableError::Expired`].
//! - Every error returned here is an internal consistency failure.
use std::{collections::BTreeMap, fmt, rc::Rc};

use tracing::trace;

use crate::{
    addressable::{
        errors::{AddrResult, AddressableError},
        slot::{ElementSlot, NumericSlot, ScalarSlot},
    },
    parameters::Bound,
};

/// Shared handle to one registered slot, resolved once by label.
#[derive(Clone)]
pub struct AddressableHandle {
    label: String,
    slot: Rc<dyn NumericSlot>,
}

impl AddressableHandle {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn read(&self) -> AddrResult<f64> {
        self.slot.read().ok_or_else(|| AddressableError::Expired { label: self.label.clone() })
    }

    pub fn write(&self, value: f64) -> AddrResult<()> {
        if self.slot.write(value) {
            Ok(())
        } else {
            Err(AddressableError::Expired { label: self.label.clone() })
        }
    }
}

impl fmt::Debug for AddressableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressableHandle")
            .field("label", &self.label)
            .field("value", &self.slot.read())
            .finish()
    }
}

/// Label → slot catalog for one model instance.
#[derive(Default)]
pub struct Addressables {
    slots: BTreeMap<String, Rc<dyn NumericSlot>>,
}

impl Addressables {
    pub fn new() -> Addressables {
        Addressables::default()
    }

    /// Register `slot` under `label`.
    ///
    /// # Errors
    /// - [`AddressableError::DuplicateLabel`] if `label` is taken.
    pub fn register(&mut self, label: &str, slot: impl NumericSlot + 'static) -> AddrResult<()> {
        if self.slots.contains_key(label) {
            return Err(AddressableError::DuplicateLabel { label: label.to_string() });
        }
        trace!(label, "registered addressable");
        self.slots.insert(label.to_string(), Rc::new(slot));
        Ok(())
    }

    /// Register a scalar field.
    pub fn register_scalar(&mut self, label: &str, target: &Bound<f64>) -> AddrResult<()> {
        self.register(label, ScalarSlot::new(target))
    }

    /// Register every current element of a vector field as `label{i}`,
    /// with `i` starting at 1.
    pub fn register_vector(&mut self, label: &str, target: &Bound<Vec<f64>>) -> AddrResult<()> {
        for index in 0..target.len() {
            self.register(&format!("{label}{{{}}}", index + 1), ElementSlot::new(target, index))?;
        }
        Ok(())
    }

    /// Remove `label`; returns whether it was present.
    pub fn unregister(&mut self, label: &str) -> bool {
        self.slots.remove(label).is_some()
    }

    /// Current value behind `label`.
    pub fn get(&self, label: &str) -> AddrResult<f64> {
        self.resolve(label)?.read()
    }

    /// Overwrite the value behind `label`.
    pub fn set(&self, label: &str, value: f64) -> AddrResult<()> {
        self.resolve(label)?.write(value)
    }

    /// Shared handle for repeated access without further lookups.
    pub fn resolve(&self, label: &str) -> AddrResult<AddressableHandle> {
        let slot = self
            .slots
            .get(label)
            .ok_or_else(|| AddressableError::UnknownLabel { label: label.to_string() })?;
        Ok(AddressableHandle { label: label.to_string(), slot: Rc::clone(slot) })
    }

    pub fn contains(&self, label: &str) -> bool {
        self.slots.contains_key(label)
    }

    /// Registered labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for Addressables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.slots.iter().map(|(k, v)| (k, v.read()))).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact set/get round trips through registered slots.
    // - Duplicate, unknown and expired label failures.
    // - Vector registration labels.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `set(v)` followed by `get()` returns exactly `v`, including extreme
    // and signed-zero values.
    fn set_then_get_is_exact() {
        // Arrange
        let q = Bound::new(0.0);
        let mut registry = Addressables::new();
        registry.register_scalar("q", &q).unwrap();

        for v in [0.5, -1.2e-300, f64::MAX, f64::MIN_POSITIVE, -0.0, 1.0 / 3.0] {
            // Act
            registry.set("q", v).unwrap();

            // Assert
            assert_eq!(registry.get("q").unwrap().to_bits(), v.to_bits());
            assert_eq!(q.get().to_bits(), v.to_bits());
        }
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let a = Bound::new(1.0);
        let b = Bound::new(2.0);
        let mut registry = Addressables::new();
        registry.register_scalar("m", &a).unwrap();

        let err = registry.register_scalar("m", &b).unwrap_err();

        assert_eq!(err, AddressableError::DuplicateLabel { label: "m".to_string() });
        assert_eq!(registry.get("m").unwrap(), 1.0);
    }

    #[test]
    fn unknown_label_is_a_lookup_error() {
        let registry = Addressables::new();

        assert_eq!(
            registry.set("sigma", 1.0),
            Err(AddressableError::UnknownLabel { label: "sigma".to_string() })
        );
        assert!(registry.get("sigma").is_err());
    }

    #[test]
    fn expired_owner_is_reported() {
        let mut registry = Addressables::new();
        {
            let m = Bound::new(0.2);
            registry.register_scalar("m", &m).unwrap();
        }

        assert_eq!(registry.get("m"), Err(AddressableError::Expired { label: "m".to_string() }));
    }

    #[test]
    fn vector_elements_are_addressable_one_based() {
        let ycs = Bound::new(vec![1.0, 2.0]);
        let mut registry = Addressables::new();

        registry.register_vector("ycs_values", &ycs).unwrap();
        registry.set("ycs_values{2}", 0.5).unwrap();

        assert_eq!(registry.labels().collect::<Vec<_>>(), vec!["ycs_values{1}", "ycs_values{2}"]);
        assert_eq!(ycs.cloned(), vec![1.0, 0.5]);
    }
}
