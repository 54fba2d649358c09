//! Numeric slot capabilities.
//!
//! A slot is the only thing the registry knows about a tunable value: it can
//! be read and written as `f64`. Thin adapters expose a scalar
//! [`Bound<f64>`] or one element of a [`Bound<Vec<f64>>`] without the
//! registry knowing which object owns it. Adapters hold weak references, so
//! a slot whose owner was dropped reports itself gone instead of keeping
//! the value alive.
use std::{cell::RefCell, rc::Weak};

use crate::parameters::Bound;

/// Read/write access to one `f64` owned elsewhere.
pub trait NumericSlot {
    /// Current value, or `None` once the owner is gone.
    fn read(&self) -> Option<f64>;

    /// Overwrite the value; returns `false` once the owner is gone.
    fn write(&self, value: f64) -> bool;
}

/// Slot over a scalar field.
#[derive(Debug, Clone)]
pub struct ScalarSlot {
    target: Weak<RefCell<f64>>,
}

impl ScalarSlot {
    pub fn new(target: &Bound<f64>) -> ScalarSlot {
        ScalarSlot { target: target.downgrade() }
    }
}

impl NumericSlot for ScalarSlot {
    fn read(&self) -> Option<f64> {
        self.target.upgrade().map(|t| *t.borrow())
    }

    fn write(&self, value: f64) -> bool {
        match self.target.upgrade() {
            Some(t) => {
                *t.borrow_mut() = value;
                true
            }
            None => false,
        }
    }
}

/// Slot over one element of a vector field.
///
/// The element is located by index at every access; if the owner shrinks
/// the vector below `index` the slot behaves as gone.
#[derive(Debug, Clone)]
pub struct ElementSlot {
    target: Weak<RefCell<Vec<f64>>>,
    index: usize,
}

impl ElementSlot {
    pub fn new(target: &Bound<Vec<f64>>, index: usize) -> ElementSlot {
        ElementSlot { target: target.downgrade(), index }
    }
}

impl NumericSlot for ElementSlot {
    fn read(&self) -> Option<f64> {
        self.target.upgrade().and_then(|t| t.borrow().get(self.index).copied())
    }

    fn write(&self, value: f64) -> bool {
        let Some(t) = self.target.upgrade() else {
            return false;
        };
        let mut values = t.borrow_mut();
        match values.get_mut(self.index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}
