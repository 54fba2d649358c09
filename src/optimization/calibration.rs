//! Calibration — the bridge between an optimizer's vector and the model.
//!
//! Purpose
//! -------
//! Own a model, its estimate set and an objective function, and expose one
//! operation an optimizer can call repeatedly: [`Calibration::evaluate`],
//! which writes a trial vector into the model, runs it and scores it.
//!
//! Key behaviors
//! -------------
//! - The trial vector is in optimizer (transformed) space and follows the
//!   estimate set's frozen enabled order.
//! - Each call runs: dimension check → transformed writes → full model
//!   iteration → objective recalculation → return the score.
//! - The model and objective sit behind `RefCell` so evaluation works
//!   through `&self`, which is what `argmin`'s `CostFunction` hands out.
//!
//! Invariants & assumptions
//! ------------------------
//! - A wrong-length trial fails with [`OptError::DimensionMismatch`] before
//!   any value is written.
//! - Evaluation is deterministic: the same trial on the same calibration
//!   returns the same score bit for bit.
//! - Every error is fatal to the run; nothing here retries.
//!
//! Conventions
//! -----------
//! - Evaluation is single-threaded. Parallel calibration means one
//!   `Calibration` (and model) per thread.
use std::cell::{Ref, RefCell};

use tracing::trace;

use crate::{
    estimates::EstimateSet,
    model::Model,
    objective::{Objective, ObjectiveFunction},
    optimization::{
        errors::{OptError, OptResult},
        minimiser::types::Theta,
    },
};

pub struct Calibration<M, O = Objective> {
    model: RefCell<M>,
    estimates: EstimateSet,
    objective: RefCell<O>,
}

impl<M: Model, O: ObjectiveFunction> Calibration<M, O> {
    /// Assemble a calibration and freeze the estimate order.
    pub fn new(model: M, mut estimates: EstimateSet, objective: O) -> Calibration<M, O> {
        estimates.build_enabled_order();
        Calibration { model: RefCell::new(model), estimates, objective: RefCell::new(objective) }
    }

    /// Number of enabled estimates, i.e. the trial vector length.
    pub fn dimension(&self) -> OptResult<usize> {
        Ok(self.estimates.enabled_count()?)
    }

    /// Write `trial` into the model, run it and return the objective score.
    ///
    /// # Errors
    /// - [`OptError::DimensionMismatch`] if `trial.len()` differs from
    ///   [`Calibration::dimension`]; nothing is written in that case.
    /// - [`OptError::Estimate`], [`OptError::Model`] or
    ///   [`OptError::Objective`] for failures further down.
    pub fn evaluate(&self, trial: &[f64]) -> OptResult<f64> {
        let expected = self.dimension()?;
        if trial.len() != expected {
            return Err(OptError::DimensionMismatch { expected, found: trial.len() });
        }
        for (index, &value) in trial.iter().enumerate() {
            self.estimates.set_transformed_value(index, value)?;
        }
        let mut model = self.model.borrow_mut();
        model.full_iteration()?;
        let mut objective = self.objective.borrow_mut();
        let score = objective.calculate_score(&[&self.estimates, &*model])?;
        trace!(score, "evaluated trial vector");
        Ok(score)
    }

    /// Same as [`Calibration::evaluate`] for an `ndarray` vector.
    pub fn evaluate_theta(&self, theta: &Theta) -> OptResult<f64> {
        match theta.as_slice() {
            Some(trial) => self.evaluate(trial),
            None => self.evaluate(&theta.to_vec()),
        }
    }

    /// Current optimizer-space vector read back from the model.
    pub fn start_vector(&self) -> OptResult<Theta> {
        Ok(self.estimates.transformed_values()?)
    }

    pub fn estimates(&self) -> &EstimateSet {
        &self.estimates
    }

    pub fn model(&self) -> Ref<'_, M> {
        self.model.borrow()
    }

    pub fn objective(&self) -> Ref<'_, O> {
        self.objective.borrow()
    }

    pub fn into_parts(self) -> (M, EstimateSet, O) {
        (self.model.into_inner(), self.estimates, self.objective.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        addressable::Addressables,
        estimates::{Estimate, Prior, Transform},
        model::ModelResult,
        objective::{Contribution, ObjResult, ScoreSource},
        parameters::Bound,
    };

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The evaluate pipeline on a stub model and objective.
    // - Determinism across repeated calls.
    // - The dimension guard and its no-write guarantee.
    // -------------------------------------------------------------------------

    struct Stub {
        q: Bound<f64>,
        sigma: Bound<f64>,
        runs: usize,
    }

    impl ScoreSource for Stub {
        fn contributions(&self, _sink: &mut Vec<Contribution>) -> ObjResult<()> {
            Ok(())
        }
    }

    impl Model for Stub {
        fn full_iteration(&mut self) -> ModelResult<()> {
            self.runs += 1;
            Ok(())
        }
    }

    struct ClosedForm {
        q: Bound<f64>,
        sigma: Bound<f64>,
        score: f64,
    }

    impl ObjectiveFunction for ClosedForm {
        fn calculate_score(&mut self, _sources: &[&dyn ScoreSource]) -> ObjResult<f64> {
            self.score = (self.q.get() - 0.3).powi(2) + self.sigma.get().ln().powi(2);
            Ok(self.score)
        }

        fn score(&self) -> f64 {
            self.score
        }
    }

    fn calibration() -> (Calibration<Stub, ClosedForm>, Addressables) {
        let q = Bound::new(0.1);
        let sigma = Bound::new(2.0);
        let mut registry = Addressables::new();
        registry.register_scalar("q", &q).unwrap();
        registry.register_scalar("sigma", &sigma).unwrap();
        let mut estimates = EstimateSet::new();
        let hq = registry.resolve("q").unwrap();
        let hs = registry.resolve("sigma").unwrap();
        estimates.add(Estimate::new(hq, -5.0, 5.0, Transform::Identity, Prior::Uniform).unwrap()).unwrap();
        estimates.add(Estimate::new(hs, 1e-3, 10.0, Transform::Log, Prior::Uniform).unwrap()).unwrap();
        let objective = ClosedForm { q: q.clone(), sigma: sigma.clone(), score: 0.0 };
        let model = Stub { q, sigma, runs: 0 };
        (Calibration::new(model, estimates, objective), registry)
    }

    #[test]
    // Purpose
    // -------
    // `evaluate` writes the trial through the transforms, runs the model
    // once and returns the objective's closed form.
    //
    // Given
    // -----
    // - q (identity) and sigma (log) enabled in that order.
    // - Objective (q - 0.3)^2 + ln(sigma)^2.
    //
    // Expect
    // ------
    // - evaluate([0.5, -1.2]) = 0.04 + 1.44 and the model ran once.
    fn evaluate_scores_the_written_trial() {
        // Arrange
        let (calibration, _registry) = calibration();

        // Act
        let score = calibration.evaluate(&[0.5, -1.2]).unwrap();

        // Assert
        assert!((score - (0.04 + 1.44)).abs() < 1e-12);
        assert_eq!(calibration.model().runs, 1);
        assert_eq!(calibration.model().q.get(), 0.5);
        assert!((calibration.model().sigma.get() - (-1.2_f64).exp()).abs() < 1e-15);
        assert_eq!(calibration.objective().score(), score);
    }

    #[test]
    fn evaluate_is_deterministic() {
        let (calibration, _registry) = calibration();

        let first = calibration.evaluate(&[0.5, -1.2]).unwrap();
        calibration.evaluate(&[1.0, 0.4]).unwrap();
        let second = calibration.evaluate(&[0.5, -1.2]).unwrap();

        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    // Purpose
    // -------
    // A wrong-length trial is rejected before anything is written.
    fn dimension_mismatch_writes_nothing() {
        // Arrange
        let (calibration, registry) = calibration();

        // Act
        let err = calibration.evaluate(&[0.5, -1.2, 7.0]).unwrap_err();

        // Assert
        assert_eq!(err, OptError::DimensionMismatch { expected: 2, found: 3 });
        assert_eq!(registry.get("q").unwrap(), 0.1);
        assert_eq!(registry.get("sigma").unwrap(), 2.0);
        assert_eq!(calibration.model().runs, 0);
    }
}
