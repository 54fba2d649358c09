//! Shared, domain-owned storage for bindable values.
//!
//! A [`Bound<T>`] is the field a domain object declares for anything that
//! configuration may populate or an optimizer may rewrite. The object keeps
//! the strong handle; the binder and the addressable registry only keep
//! weak handles obtained through [`Bound::downgrade`], so neither extends the
//! lifetime of the value beyond its owner.
//!
//! All access is single-threaded (`Rc` + `RefCell`). Borrows are taken for
//! the duration of one read or write and never held across calls.
use std::{
    cell::{Ref, RefCell},
    fmt,
    rc::{Rc, Weak},
};

/// Strong, owner-side handle to one bindable value.
pub struct Bound<T>(Rc<RefCell<T>>);

impl<T> Bound<T> {
    pub fn new(value: T) -> Bound<T> {
        Bound(Rc::new(RefCell::new(value)))
    }

    /// Borrow the current value.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Replace the current value.
    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    /// Apply `f` to the value in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    /// Weak handle used by binders and registries.
    pub fn downgrade(&self) -> Weak<RefCell<T>> {
        Rc::downgrade(&self.0)
    }
}

impl<T: Copy> Bound<T> {
    pub fn get(&self) -> T {
        *self.0.borrow()
    }
}

impl<T: Clone> Bound<T> {
    pub fn cloned(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T> Bound<Vec<T>> {
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

impl<T> Clone for Bound<T> {
    fn clone(&self) -> Self {
        Bound(Rc::clone(&self.0))
    }
}

impl<T: Default> Default for Bound<T> {
    fn default() -> Self {
        Bound::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Bound<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Bound").field(&*self.0.borrow()).finish()
    }
}

impl<T: PartialEq> PartialEq for Bound<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.0.borrow() == *other.0.borrow()
    }
}
