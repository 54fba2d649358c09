//! Natural mortality and catch removals.
//!
//! Catch removals share one rule: take `catch / vulnerable` of every
//! selected fish, capped at `u_max`. When the cap binds, the shortfall is
//! reported to the configured penalty as `(catch, vulnerable * u_max)`.
use tracing::trace;

use crate::{
    addressable::{AddrResult, Addressables},
    model::{
        errors::ModelResult,
        processes::KIND,
        selectivity::CategorySelectivities,
        traits::{BuildContext, Component, Phase, Process, RunState, addressable_label, report},
    },
    numerics::zero_fun,
    parameters::{BindResult, Binding, Bound, Diagnostics, ParameterList},
};

/// Default cap on the exploitation rate.
pub const DEFAULT_U_MAX: f64 = 0.99;

// ---- Natural mortality ----

/// Instantaneous mortality `m`, scaled by selectivity, every phase.
#[derive(Debug)]
pub struct MortalityConstant {
    label: String,
    parameters: ParameterList,
    m: Bound<f64>,
    selection: CategorySelectivities,
}

impl MortalityConstant {
    pub fn new(label: &str) -> BindResult<MortalityConstant> {
        let mut parameters = ParameterList::new();
        let m = Bound::new(0.0);
        parameters.bind("m", Binding::scalar(&m), "Natural mortality rate")?;
        let selection = CategorySelectivities::bind(&mut parameters)?;
        Ok(MortalityConstant { label: label.to_string(), parameters, m, selection })
    }
}

impl Component for MortalityConstant {
    fn label(&self) -> &str {
        &self.label
    }

    fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut ParameterList {
        &mut self.parameters
    }

    fn validate(&self, diagnostics: &mut Diagnostics) {
        self.selection.validate(&self.parameters, diagnostics);
        if self.m.get() < 0.0 {
            report(diagnostics, &self.parameters, "m", "m cannot be negative");
        }
    }

    fn register(&self, registry: &mut Addressables) -> AddrResult<()> {
        registry.register_scalar(&addressable_label(KIND, &self.label, "m"), &self.m)
    }
}

impl Process for MortalityConstant {
    fn build(&mut self, context: &BuildContext<'_>, diagnostics: &mut Diagnostics) {
        self.selection.build(&self.parameters, context, diagnostics);
    }

    fn execute(&mut self, _phase: Phase, state: &mut RunState<'_>) -> ModelResult<()> {
        let m = self.m.get();
        let min_age = state.partition.min_age();
        for &(category, selectivity) in self.selection.pairs() {
            let selectivity = &state.selectivities[selectivity];
            for (offset, n) in state.partition.numbers_mut(category).iter_mut().enumerate() {
                *n *= (-m * selectivity.at_age(min_age + offset as u32)).exp();
            }
        }
        Ok(())
    }
}

// ---- Catch removals ----

/// Parameters common to both catch-removal processes.
#[derive(Debug)]
struct Removal {
    u_max: Bound<f64>,
    penalty: Bound<String>,
    selection: CategorySelectivities,
}

impl Removal {
    fn bind(parameters: &mut ParameterList) -> BindResult<Removal> {
        let u_max = Bound::new(DEFAULT_U_MAX);
        let penalty = Bound::new(String::new());
        let selection = CategorySelectivities::bind(parameters)?;
        parameters.bind("u_max", Binding::scalar_or(&u_max, DEFAULT_U_MAX), "Maximum exploitation rate")?;
        parameters.bind(
            "penalty",
            Binding::scalar_or(&penalty, String::new()),
            "Penalty applied when the catch cannot be taken",
        )?;
        Ok(Removal { u_max, penalty, selection })
    }

    fn validate(&self, parameters: &ParameterList, diagnostics: &mut Diagnostics) {
        self.selection.validate(parameters, diagnostics);
        let u_max = self.u_max.get();
        if !(0.0..=1.0).contains(&u_max) {
            report(
                diagnostics,
                parameters,
                "u_max",
                format!("u_max must be between 0.0 and 1.0 (inclusive). Value defined was {u_max}"),
            );
        }
    }

    fn build(&mut self, parameters: &ParameterList, context: &BuildContext<'_>, diagnostics: &mut Diagnostics) {
        self.selection.build(parameters, context, diagnostics);
        let penalty = self.penalty.borrow();
        if !penalty.is_empty() && !context.penalties.contains(&penalty) {
            report(
                diagnostics,
                parameters,
                "penalty",
                format!("penalty '{penalty}' does not exist. Have you defined it?"),
            );
        }
    }

    /// Remove `catch` from the selected fish.
    fn remove(&self, source: &str, catch: f64, state: &mut RunState<'_>) -> ModelResult<()> {
        let u_max = self.u_max.get();
        let vulnerable = self.selection.selected_total(&*state.partition, state.selectivities);
        let mut exploitation = catch / zero_fun(vulnerable);
        if exploitation > u_max {
            exploitation = u_max;
            let penalty = self.penalty.borrow();
            if !penalty.is_empty() {
                state.penalties.trigger(&penalty, source, catch, vulnerable * u_max)?;
            }
        } else if exploitation < 0.0 {
            exploitation = 0.0;
        }
        trace!(process = source, vulnerable, catch, exploitation, "removing catch");

        let min_age = state.partition.min_age();
        for &(category, selectivity) in self.selection.pairs() {
            let selectivity = &state.selectivities[selectivity];
            for (offset, n) in state.partition.numbers_mut(category).iter_mut().enumerate() {
                *n -= *n * selectivity.at_age(min_age + offset as u32) * exploitation;
            }
        }
        Ok(())
    }
}

/// Known catches in given model years.
#[derive(Debug)]
pub struct MortalityEvent {
    label: String,
    parameters: ParameterList,
    years: Bound<Vec<u32>>,
    catches: Bound<Vec<f64>>,
    removal: Removal,
}

impl MortalityEvent {
    pub fn new(label: &str) -> BindResult<MortalityEvent> {
        let mut parameters = ParameterList::new();
        let years = Bound::new(Vec::new());
        let catches = Bound::new(Vec::new());
        parameters.bind("years", Binding::sequence(&years, false), "Years with a catch")?;
        parameters.bind("catches", Binding::sequence(&catches, false), "Catch taken in each year")?;
        let removal = Removal::bind(&mut parameters)?;
        Ok(MortalityEvent { label: label.to_string(), parameters, years, catches, removal })
    }

    pub fn u_max(&self) -> f64 {
        self.removal.u_max.get()
    }
}

impl Component for MortalityEvent {
    fn label(&self) -> &str {
        &self.label
    }

    fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut ParameterList {
        &mut self.parameters
    }

    fn validate(&self, diagnostics: &mut Diagnostics) {
        self.removal.validate(&self.parameters, diagnostics);
        let (n_years, n_catches) = (self.years.len(), self.catches.len());
        if n_years != n_catches {
            report(
                diagnostics,
                &self.parameters,
                "catches",
                format!("expected one catch per year: {n_years} years but got {n_catches} catches"),
            );
        }
        if self.catches.borrow().iter().any(|&c| c < 0.0) {
            report(diagnostics, &self.parameters, "catches", "catches cannot be negative");
        }
        let years = self.years.borrow();
        for (i, year) in years.iter().enumerate() {
            if years[..i].contains(year) {
                report(diagnostics, &self.parameters, "years", format!("year {year} is listed more than once"));
            }
        }
    }

    fn register(&self, registry: &mut Addressables) -> AddrResult<()> {
        registry.register_scalar(&addressable_label(KIND, &self.label, "u_max"), &self.removal.u_max)?;
        registry.register_vector(&addressable_label(KIND, &self.label, "catches"), &self.catches)
    }
}

impl Process for MortalityEvent {
    fn build(&mut self, context: &BuildContext<'_>, diagnostics: &mut Diagnostics) {
        self.removal.build(&self.parameters, context, diagnostics);
        for year in self.years.borrow().iter() {
            if !context.years.contains(year) {
                report(
                    diagnostics,
                    &self.parameters,
                    "years",
                    format!(
                        "year {year} is outside the model years {}-{}",
                        context.years.start(),
                        context.years.end()
                    ),
                );
            }
        }
    }

    fn execute(&mut self, phase: Phase, state: &mut RunState<'_>) -> ModelResult<()> {
        let Phase::Year(year) = phase else {
            return Ok(());
        };
        let Some(index) = self.years.borrow().iter().position(|&y| y == year) else {
            return Ok(());
        };
        let catch = self.catches.borrow()[index];
        self.removal.remove(&self.label, catch, state)
    }
}

/// One fixed catch taken in every initialisation year.
#[derive(Debug)]
pub struct MortalityInitialisationEvent {
    label: String,
    parameters: ParameterList,
    catch: Bound<f64>,
    removal: Removal,
}

impl MortalityInitialisationEvent {
    pub fn new(label: &str) -> BindResult<MortalityInitialisationEvent> {
        let mut parameters = ParameterList::new();
        let catch = Bound::new(0.0);
        parameters.bind("catch", Binding::scalar(&catch), "Catch taken in each initialisation year")?;
        let removal = Removal::bind(&mut parameters)?;
        Ok(MortalityInitialisationEvent { label: label.to_string(), parameters, catch, removal })
    }
}

impl Component for MortalityInitialisationEvent {
    fn label(&self) -> &str {
        &self.label
    }

    fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut ParameterList {
        &mut self.parameters
    }

    fn validate(&self, diagnostics: &mut Diagnostics) {
        self.removal.validate(&self.parameters, diagnostics);
        if self.catch.get() < 0.0 {
            report(diagnostics, &self.parameters, "catch", "catch cannot be negative");
        }
    }

    fn register(&self, registry: &mut Addressables) -> AddrResult<()> {
        registry.register_scalar(&addressable_label(KIND, &self.label, "u_max"), &self.removal.u_max)?;
        registry.register_scalar(&addressable_label(KIND, &self.label, "catch"), &self.catch)
    }
}

impl Process for MortalityInitialisationEvent {
    fn build(&mut self, context: &BuildContext<'_>, diagnostics: &mut Diagnostics) {
        self.removal.build(&self.parameters, context, diagnostics);
    }

    fn execute(&mut self, phase: Phase, state: &mut RunState<'_>) -> ModelResult<()> {
        if phase != Phase::Initialisation {
            return Ok(());
        }
        self.removal.remove(&self.label, self.catch.get(), state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{partition::Partition, selectivity::Selectivity},
        objective::{Penalties, Penalty},
    };

    fn constant_selectivity() -> Vec<Selectivity> {
        let mut sel = Selectivity::new("all", "constant").unwrap().unwrap();
        sel.parameters_mut().add("c", &["1"], "m.csl", 1).unwrap();
        vec![sel]
    }

    fn stock(numbers: &[f64]) -> Partition {
        let mut partition = Partition::new(vec!["stock".to_string()], 1, numbers.len() as u32, true);
        partition.numbers_mut(0).copy_from_slice(numbers);
        partition
    }

    fn build<P: Process>(process: &mut P, partition: &Partition, selectivities: &[Selectivity], penalties: &Penalties) {
        let context = BuildContext { partition, selectivities, penalties, years: 2000..=2005 };
        let mut diagnostics = Diagnostics::new();
        process.build(&context, &mut diagnostics);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.errors());
    }

    fn event(lines: &[(&str, &[&str])]) -> MortalityEvent {
        let mut event = MortalityEvent::new("fishing").unwrap();
        for (i, (label, values)) in lines.iter().enumerate() {
            event.parameters_mut().add(label, values, "m.csl", i as u32 + 1).unwrap();
        }
        event
    }

    #[test]
    // Purpose
    // -------
    // An unset u_max takes the default 0.99.
    fn u_max_defaults_to_point_nine_nine() {
        let event = event(&[("categories", &["stock"]), ("selectivities", &["all"])]);

        assert_eq!(event.u_max(), 0.99);
        assert_eq!(event.parameters().get("u_max").unwrap().default_value(), Some("0.99"));
    }

    #[test]
    // Purpose
    // -------
    // A u_max above one loads but fails validation at its line.
    //
    // Given
    // -----
    // - `u_max 1.5` on line 3.
    //
    // Expect
    // ------
    // - One error for `u_max` located at line 3.
    fn u_max_above_one_is_rejected() {
        // Arrange
        let event = event(&[
            ("categories", &["stock"]),
            ("selectivities", &["all"]),
            ("u_max", &["1.5"]),
            ("years", &["2000"]),
            ("catches", &["10"]),
        ]);
        let mut diagnostics = Diagnostics::new();

        // Act
        event.validate(&mut diagnostics);

        // Assert
        assert_eq!(diagnostics.len(), 1);
        let err = &diagnostics.errors()[0];
        assert_eq!(err.label, "u_max");
        assert_eq!(err.location.as_ref().map(|l| l.line), Some(3));
        assert!(err.message.contains("1.5"));
    }

    #[test]
    fn mismatched_years_and_catches_are_rejected() {
        let event = event(&[
            ("categories", &["stock"]),
            ("selectivities", &["all"]),
            ("years", &["2000", "2001"]),
            ("catches", &["10"]),
        ]);
        let mut diagnostics = Diagnostics::new();

        event.validate(&mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.errors()[0].message.contains("2 years but got 1"));
    }

    #[test]
    // Purpose
    // -------
    // A catch the stock can supply is taken in full, only in its year.
    fn catch_is_removed_in_its_year() {
        // Arrange
        let selectivities = constant_selectivity();
        let mut partition = stock(&[50.0, 50.0]);
        let mut penalties = Penalties::new();
        let mut event = event(&[
            ("categories", &["stock"]),
            ("selectivities", &["all"]),
            ("years", &["2001"]),
            ("catches", &["20"]),
        ]);
        build(&mut event, &partition, &selectivities, &penalties);
        let mut state = RunState { partition: &mut partition, selectivities: &selectivities, penalties: &mut penalties };

        // Act
        event.execute(Phase::Year(2000), &mut state).unwrap();
        event.execute(Phase::Initialisation, &mut state).unwrap();
        let untouched = state.partition.total(0);
        event.execute(Phase::Year(2001), &mut state).unwrap();

        // Assert
        assert_eq!(untouched, 100.0);
        assert!((state.partition.total(0) - 80.0).abs() < 1e-9);
        assert!(state.penalties.triggers().is_empty());
    }

    #[test]
    // Purpose
    // -------
    // When the catch exceeds u_max of the vulnerable stock, the rate is
    // capped and the penalty records (catch, vulnerable * u_max).
    fn capped_catch_triggers_penalty() {
        // Arrange
        let selectivities = constant_selectivity();
        let mut partition = stock(&[50.0, 50.0]);
        let mut penalties = Penalties::new();
        penalties.declare(Penalty::new("catch_shortfall", 10.0, false));
        let mut event = event(&[
            ("categories", &["stock"]),
            ("selectivities", &["all"]),
            ("years", &["2000"]),
            ("catches", &["150"]),
            ("u_max", &["0.5"]),
            ("penalty", &["catch_shortfall"]),
        ]);
        build(&mut event, &partition, &selectivities, &penalties);
        let mut state = RunState { partition: &mut partition, selectivities: &selectivities, penalties: &mut penalties };

        // Act
        event.execute(Phase::Year(2000), &mut state).unwrap();

        // Assert
        assert!((state.partition.total(0) - 50.0).abs() < 1e-9);
        let triggers = state.penalties.triggers();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].source, "fishing");
        assert_eq!(triggers[0].requested, 150.0);
        assert!((triggers[0].available - 50.0).abs() < 1e-9);
        assert!((triggers[0].score - 10.0 * 100.0 * 100.0).abs() < 1e-6);
    }

    #[test]
    fn undeclared_penalty_is_a_build_error() {
        let selectivities = constant_selectivity();
        let partition = stock(&[1.0]);
        let penalties = Penalties::new();
        let mut event = event(&[
            ("categories", &["stock"]),
            ("selectivities", &["all"]),
            ("years", &["2000"]),
            ("catches", &["1"]),
            ("penalty", &["missing"]),
        ]);
        let context = BuildContext { partition: &partition, selectivities: &selectivities, penalties: &penalties, years: 2000..=2005 };
        let mut diagnostics = Diagnostics::new();

        event.build(&context, &mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.errors()[0].label, "penalty");
    }

    #[test]
    fn initialisation_event_only_runs_during_initialisation() {
        let selectivities = constant_selectivity();
        let mut partition = stock(&[10.0, 10.0]);
        let mut penalties = Penalties::new();
        let mut event = MortalityInitialisationEvent::new("init_catch").unwrap();
        event.parameters_mut().add("categories", &["stock"], "m.csl", 1).unwrap();
        event.parameters_mut().add("selectivities", &["all"], "m.csl", 2).unwrap();
        event.parameters_mut().add("catch", &["5"], "m.csl", 3).unwrap();
        build(&mut event, &partition, &selectivities, &penalties);
        let mut state = RunState { partition: &mut partition, selectivities: &selectivities, penalties: &mut penalties };

        event.execute(Phase::Year(2000), &mut state).unwrap();
        assert_eq!(state.partition.total(0), 20.0);
        event.execute(Phase::Initialisation, &mut state).unwrap();

        assert!((state.partition.total(0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn natural_mortality_scales_by_exp_minus_m() {
        let selectivities = constant_selectivity();
        let mut partition = stock(&[100.0]);
        let mut penalties = Penalties::new();
        let mut process = MortalityConstant::new("natural").unwrap();
        process.parameters_mut().add("m", &["0.2"], "m.csl", 1).unwrap();
        process.parameters_mut().add("categories", &["stock"], "m.csl", 2).unwrap();
        process.parameters_mut().add("selectivities", &["all"], "m.csl", 3).unwrap();
        build(&mut process, &partition, &selectivities, &penalties);
        let mut state = RunState { partition: &mut partition, selectivities: &selectivities, penalties: &mut penalties };

        process.execute(Phase::Year(2000), &mut state).unwrap();

        assert!((state.partition.total(0) - 100.0 * (-0.2_f64).exp()).abs() < 1e-9);
    }
}
