//! The assembled age-structured model.
//!
//! Purpose
//! -------
//! Turn a list of [`ConfigBlock`]s into a runnable [`PopulationModel`] and
//! the [`EstimateSet`] over its addressables, and recompute the whole
//! population on demand for the calibration layer.
//!
//! Key behaviors
//! -------------
//! - [`PopulationModel::from_config`] loads every block, validates, builds
//!   label references, registers addressables, then declares estimates.
//!   Each stage reports all of its configuration errors at once.
//! - [`Model::full_iteration`] zeroes the partition, runs the
//!   initialisation cycle `initialisation_years` times, then the annual
//!   cycle for each model year, recording observations at year end.
//!
//! Invariants & assumptions
//! ------------------------
//! - Component labels are unique per block kind, so addressable labels
//!   (`process[label].param`, `selectivity[..]`, `observation[..]`) never
//!   collide.
//! - A run depends only on current parameter values.
use std::collections::BTreeSet;

use tracing::{debug, trace, warn};

use crate::{
    addressable::Addressables,
    estimates::EstimateSet,
    model::{
        config::ConfigBlock,
        errors::{ModelError, ModelResult},
        estimate_block::{ESTIMATE_KIND, EstimateBlock, PENALTY_KIND, load_penalty},
        observation::{AbundanceObservation, KIND as OBSERVATION_KIND},
        partition::Partition,
        processes::{self, KIND as PROCESS_KIND},
        selectivity::{KIND as SELECTIVITY_KIND, Selectivity},
        settings::{KIND as MODEL_KIND, ModelSettings},
        traits::{BuildContext, Component, Model, Phase, Process, RunState},
    },
    objective::{Contribution, ObjResult, Penalties, ScoreSource},
    parameters::{ConfigErrors, Diagnostics, ParameterList},
};

pub struct PopulationModel {
    settings: ModelSettings,
    partition: Partition,
    selectivities: Vec<Selectivity>,
    processes: Vec<Box<dyn Process>>,
    annual_cycle: Vec<usize>,
    initialisation_cycle: Vec<usize>,
    observations: Vec<AbundanceObservation>,
    penalties: Penalties,
    addressables: Addressables,
}

impl PopulationModel {
    /// Build a model and its estimate set from configuration blocks.
    ///
    /// The returned set's enabled order is not frozen yet; wrapping it in a
    /// [`Calibration`](crate::optimization::Calibration) freezes it.
    ///
    /// # Errors
    /// - [`ModelError::Config`] with every configuration problem of the
    ///   first failing stage (load/validate, build, estimates).
    /// - Internal binder or registry errors.
    pub fn from_config(blocks: &[ConfigBlock]) -> ModelResult<(PopulationModel, EstimateSet)> {
        let mut diagnostics = Diagnostics::new();
        let mut seen = BTreeSet::new();
        let mut settings: Option<ModelSettings> = None;
        let mut selectivities = Vec::new();
        let mut processes: Vec<Box<dyn Process>> = Vec::new();
        let mut observations = Vec::new();
        let mut penalties = Penalties::new();
        let mut estimate_blocks = Vec::new();

        // ---- Load ----
        for block in blocks {
            let kind = block.kind.to_ascii_lowercase();
            if !seen.insert((kind.clone(), block.label.clone())) {
                diagnostics.error(
                    &block.label,
                    Some(block.location()),
                    format!("a {kind} block labelled '{}' is already defined", block.label),
                );
                continue;
            }
            match kind.as_str() {
                MODEL_KIND => {
                    if settings.is_some() {
                        diagnostics.error(MODEL_KIND, Some(block.location()), "only one model block may be defined");
                        continue;
                    }
                    let mut loaded = ModelSettings::new()?;
                    block.load_into(loaded.parameters_mut(), &mut diagnostics)?;
                    settings = Some(loaded);
                }
                SELECTIVITY_KIND => {
                    let Some(type_name) = required_type(block, &mut diagnostics) else { continue };
                    match Selectivity::new(&block.label, &type_name)? {
                        Some(mut loaded) => {
                            block.load_into(loaded.parameters_mut(), &mut diagnostics)?;
                            selectivities.push(loaded);
                        }
                        None => unknown_type(block, &type_name, &mut diagnostics),
                    }
                }
                PROCESS_KIND => {
                    let Some(type_name) = required_type(block, &mut diagnostics) else { continue };
                    match processes::create(&block.label, &type_name)? {
                        Some(mut loaded) => {
                            block.load_into(loaded.parameters_mut(), &mut diagnostics)?;
                            processes.push(loaded);
                        }
                        None => unknown_type(block, &type_name, &mut diagnostics),
                    }
                }
                OBSERVATION_KIND => {
                    let Some(type_name) = required_type(block, &mut diagnostics) else { continue };
                    if type_name != "abundance" {
                        unknown_type(block, &type_name, &mut diagnostics);
                        continue;
                    }
                    let mut loaded = AbundanceObservation::new(&block.label)?;
                    block.load_into(loaded.parameters_mut(), &mut diagnostics)?;
                    observations.push(loaded);
                }
                PENALTY_KIND => {
                    penalties.declare(load_penalty(block, &mut diagnostics)?);
                }
                ESTIMATE_KIND => estimate_blocks.push(EstimateBlock::load(block, &mut diagnostics)?),
                other => diagnostics.error(
                    &block.label,
                    Some(block.location()),
                    format!("unknown block kind '{other}'"),
                ),
            }
        }
        let Some(settings) = settings else {
            diagnostics.error(MODEL_KIND, None, "a model block is required");
            return Err(config_error(diagnostics));
        };

        // ---- Validate ----
        settings.validate(&mut diagnostics);
        selectivities.iter().for_each(|s| s.validate(&mut diagnostics));
        processes.iter().for_each(|p| p.validate(&mut diagnostics));
        observations.iter().for_each(|o| o.validate(&mut diagnostics));
        if !diagnostics.is_empty() {
            return Err(config_error(diagnostics));
        }

        // ---- Build ----
        let partition = settings.partition();
        let context = BuildContext {
            partition: &partition,
            selectivities: &selectivities,
            penalties: &penalties,
            years: settings.years(),
        };
        processes.iter_mut().for_each(|p| p.build(&context, &mut diagnostics));
        observations.iter_mut().for_each(|o| o.build(&context, &mut diagnostics));
        let annual_cycle =
            resolve_cycle(&settings.annual_cycle(), "annual_cycle", settings.parameters(), &processes, &mut diagnostics);
        let initialisation_cycle = if settings.parameters().is_defined("initialisation_cycle") {
            resolve_cycle(
                &settings.initialisation_cycle(),
                "initialisation_cycle",
                settings.parameters(),
                &processes,
                &mut diagnostics,
            )
        } else {
            annual_cycle.clone()
        };
        if !diagnostics.is_empty() {
            return Err(config_error(diagnostics));
        }
        for (index, process) in processes.iter().enumerate() {
            if !annual_cycle.contains(&index) && !initialisation_cycle.contains(&index) {
                warn!(process = process.label(), "process is not part of any cycle and will never run");
            }
        }

        // ---- Register ----
        let mut addressables = Addressables::new();
        for selectivity in &selectivities {
            selectivity.register(&mut addressables)?;
        }
        for process in &processes {
            process.register(&mut addressables)?;
        }
        for observation in &observations {
            observation.register(&mut addressables)?;
        }

        // ---- Estimates ----
        let mut estimates = EstimateSet::new();
        for block in &estimate_blocks {
            let Some(estimate) = block.build(&addressables, &mut diagnostics)? else { continue };
            let label = estimate.label().to_string();
            if diagnostics.collect(estimates.add(estimate)).is_some() && !block.is_enabled() {
                estimates.set_enabled(&label, false)?;
            }
        }
        if !diagnostics.is_empty() {
            return Err(config_error(diagnostics));
        }

        debug!(
            processes = processes.len(),
            observations = observations.len(),
            addressables = addressables.len(),
            estimates = estimates.len(),
            "model built"
        );
        let model = PopulationModel {
            settings,
            partition,
            selectivities,
            processes,
            annual_cycle,
            initialisation_cycle,
            observations,
            penalties,
            addressables,
        };
        Ok((model, estimates))
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn penalties(&self) -> &Penalties {
        &self.penalties
    }

    pub fn addressables(&self) -> &Addressables {
        &self.addressables
    }

    pub fn observations(&self) -> &[AbundanceObservation] {
        &self.observations
    }

    pub fn observation(&self, label: &str) -> Option<&AbundanceObservation> {
        self.observations.iter().find(|o| o.label() == label)
    }

    /// Process labels of the annual cycle, in run order.
    pub fn annual_cycle(&self) -> Vec<&str> {
        self.annual_cycle.iter().map(|&i| self.processes[i].label()).collect()
    }

    fn run_cycle(&mut self, phase: Phase) -> ModelResult<()> {
        let PopulationModel {
            partition,
            selectivities,
            processes,
            annual_cycle,
            initialisation_cycle,
            penalties,
            ..
        } = self;
        let (cycle, year) = match phase {
            Phase::Initialisation => (&*initialisation_cycle, None),
            Phase::Year(year) => (&*annual_cycle, Some(year)),
        };
        for &index in cycle {
            let process = &mut processes[index];
            let mut state = RunState { partition: &mut *partition, selectivities: &selectivities[..], penalties: &mut *penalties };
            process.execute(phase, &mut state)?;
            if !partition.is_finite() {
                return Err(ModelError::NonFiniteState { process: process.label().to_string(), year });
            }
        }
        Ok(())
    }
}

impl Model for PopulationModel {
    fn full_iteration(&mut self) -> ModelResult<()> {
        self.partition.reset();
        self.penalties.clear_triggers();
        self.observations.iter_mut().for_each(AbundanceObservation::reset);

        for _ in 0..self.settings.initialisation_years() {
            self.run_cycle(Phase::Initialisation)?;
        }
        for year in self.settings.years() {
            self.run_cycle(Phase::Year(year))?;
            for observation in &mut self.observations {
                observation.observe(year, &self.partition, &self.selectivities);
            }
        }
        trace!(triggers = self.penalties.triggers().len(), "full iteration complete");
        Ok(())
    }
}

impl ScoreSource for PopulationModel {
    fn contributions(&self, sink: &mut Vec<Contribution>) -> ObjResult<()> {
        self.penalties.contributions(sink)?;
        for observation in &self.observations {
            observation.contributions(sink)?;
        }
        Ok(())
    }
}

// ---- Helper methods ----

fn config_error(diagnostics: Diagnostics) -> ModelError {
    ModelError::Config(ConfigErrors(diagnostics.errors().to_vec()))
}

fn required_type(block: &ConfigBlock, diagnostics: &mut Diagnostics) -> Option<String> {
    let type_name = block.type_name();
    if type_name.is_none() {
        diagnostics.error(
            format!("{}[{}].type", block.kind, block.label),
            Some(block.location()),
            "type is required but was not supplied",
        );
    }
    type_name
}

fn unknown_type(block: &ConfigBlock, type_name: &str, diagnostics: &mut Diagnostics) {
    let location = block.line("type").map(|l| l.location()).or_else(|| Some(block.location()));
    diagnostics.error(
        format!("{}[{}].type", block.kind, block.label),
        location,
        format!("unknown {} type '{type_name}'", block.kind),
    );
}

fn resolve_cycle(
    labels: &[String], parameter: &str, parameters: &ParameterList, processes: &[Box<dyn Process>],
    diagnostics: &mut Diagnostics,
) -> Vec<usize> {
    labels
        .iter()
        .filter_map(|label| {
            let index = processes.iter().position(|p| p.label() == label);
            if index.is_none() {
                diagnostics.error(
                    parameter,
                    parameters.location_of(parameter),
                    format!("process '{label}' does not exist. Have you defined it?"),
                );
            }
            index
        })
        .collect()
}
