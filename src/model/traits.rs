//! Contracts between the calibration layer, the model and its components.
use std::ops::RangeInclusive;

use crate::{
    addressable::{AddrResult, Addressables},
    model::{errors::ModelResult, partition::Partition, selectivity::Selectivity},
    objective::{Penalties, ScoreSource},
    parameters::{Diagnostics, ParameterList},
};

/// What the optimizer adapter needs from a model.
///
/// `full_iteration` must recompute everything from the current parameter
/// values: two calls with the same values leave the same state and yield
/// the same contributions.
pub trait Model: ScoreSource {
    fn full_iteration(&mut self) -> ModelResult<()>;
}

/// A configurable piece of the model: owns a [`ParameterList`] and may
/// expose some of its fields as addressables.
pub trait Component {
    fn label(&self) -> &str;

    fn parameters(&self) -> &ParameterList;

    fn parameters_mut(&mut self) -> &mut ParameterList;

    /// Cross-field checks, run after every line has been loaded.
    fn validate(&self, _diagnostics: &mut Diagnostics) {}

    /// Register addressable fields with `registry`.
    fn register(&self, _registry: &mut Addressables) -> AddrResult<()> {
        Ok(())
    }
}

/// When a process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Burn-in before the first model year.
    Initialisation,
    Year(u32),
}

/// Read-only view of the assembled model used to resolve labels.
pub struct BuildContext<'a> {
    pub partition: &'a Partition,
    pub selectivities: &'a [Selectivity],
    pub penalties: &'a Penalties,
    pub years: RangeInclusive<u32>,
}

impl BuildContext<'_> {
    pub fn selectivity_index(&self, label: &str) -> Option<usize> {
        self.selectivities.iter().position(|s| s.label() == label)
    }
}

/// Mutable state a process works on.
pub struct RunState<'a> {
    pub partition: &'a mut Partition,
    pub selectivities: &'a [Selectivity],
    pub penalties: &'a mut Penalties,
}

/// One step of the annual cycle.
pub trait Process: Component {
    /// Resolve labels against the assembled model.
    fn build(&mut self, context: &BuildContext<'_>, diagnostics: &mut Diagnostics);

    fn execute(&mut self, phase: Phase, state: &mut RunState<'_>) -> ModelResult<()>;
}

/// Label under which a component field is addressable.
pub fn addressable_label(kind: &str, component: &str, parameter: &str) -> String {
    format!("{kind}[{component}].{parameter}")
}

/// Record a problem with `parameter`, located at the line that set it.
pub(crate) fn report(
    diagnostics: &mut Diagnostics, parameters: &ParameterList, parameter: &str, message: impl Into<String>,
) {
    diagnostics.error(parameter, parameters.location_of(parameter), message);
}
