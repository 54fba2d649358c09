//! Adapter that exposes a [`Calibration`] as an `argmin` problem.
//!
//! The objective is already a cost (lower is better), so no sign flips
//! happen here. Gradients are always finite differences of the cost.
use argmin::core::{CostFunction, Error, Gradient};

use crate::{
    model::Model,
    objective::ObjectiveFunction,
    optimization::{
        calibration::Calibration,
        errors::OptError,
        minimiser::{
            finite_diff::fd_gradient,
            types::{Cost, Grad, Theta},
        },
    },
};

/// Bridges a [`Calibration`] to `argmin`'s `CostFunction` and `Gradient`.
pub struct ArgMinAdapter<'a, M, O> {
    pub calibration: &'a Calibration<M, O>,
}

impl<'a, M: Model, O: ObjectiveFunction> ArgMinAdapter<'a, M, O> {
    pub fn new(calibration: &'a Calibration<M, O>) -> Self {
        Self { calibration }
    }
}

impl<M: Model, O: ObjectiveFunction> CostFunction for ArgMinAdapter<'_, M, O> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the objective at `θ`.
    ///
    /// # Errors
    /// - Any [`OptError`] from [`Calibration::evaluate`].
    /// - [`OptError::NonFiniteCost`] if the score is not finite.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.calibration.evaluate_theta(theta)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(output)
    }
}

impl<M: Model, O: ObjectiveFunction> Gradient for ArgMinAdapter<'_, M, O> {
    type Param = Theta;
    type Gradient = Grad;

    /// Finite-difference gradient of the cost; see [`fd_gradient`].
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        Ok(fd_gradient(theta, |t| self.cost(t))?)
    }
}
