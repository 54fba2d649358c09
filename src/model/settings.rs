//! The `model` block: ages, years, categories and process order.
use std::ops::RangeInclusive;

use crate::{
    model::{
        partition::Partition,
        traits::{Component, report},
    },
    parameters::{BindResult, Binding, Bound, Diagnostics, ParameterList},
};

/// Block kind.
pub const KIND: &str = "model";

#[derive(Debug)]
pub struct ModelSettings {
    parameters: ParameterList,
    min_age: Bound<u32>,
    max_age: Bound<u32>,
    plus_group: Bound<bool>,
    start_year: Bound<u32>,
    final_year: Bound<u32>,
    categories: Bound<Vec<String>>,
    initialisation_years: Bound<u32>,
    annual_cycle: Bound<Vec<String>>,
    initialisation_cycle: Bound<Vec<String>>,
}

impl ModelSettings {
    pub fn new() -> BindResult<ModelSettings> {
        let mut parameters = ParameterList::new();
        let settings = ModelSettings {
            parameters: ParameterList::new(),
            min_age: Bound::new(0),
            max_age: Bound::new(0),
            plus_group: Bound::new(true),
            start_year: Bound::new(0),
            final_year: Bound::new(0),
            categories: Bound::new(Vec::new()),
            initialisation_years: Bound::new(0),
            annual_cycle: Bound::new(Vec::new()),
            initialisation_cycle: Bound::new(Vec::new()),
        };
        parameters.bind("min_age", Binding::scalar(&settings.min_age), "Youngest age")?;
        parameters.bind("max_age", Binding::scalar(&settings.max_age), "Oldest age")?;
        parameters.bind("plus_group", Binding::scalar_or(&settings.plus_group, true), "Oldest age accumulates")?;
        parameters.bind("start_year", Binding::scalar(&settings.start_year), "First model year")?;
        parameters.bind("final_year", Binding::scalar(&settings.final_year), "Last model year")?;
        parameters.bind("categories", Binding::sequence(&settings.categories, false), "Partition categories")?;
        parameters.bind(
            "initialisation_years",
            Binding::scalar_or(&settings.initialisation_years, 0),
            "Burn-in cycles before the first year",
        )?;
        parameters.bind(
            "annual_cycle",
            Binding::sequence(&settings.annual_cycle, false),
            "Processes run each year, in order",
        )?;
        parameters.bind(
            "initialisation_cycle",
            Binding::sequence(&settings.initialisation_cycle, true),
            "Processes run each burn-in cycle; the annual cycle when unset",
        )?;
        Ok(ModelSettings { parameters, ..settings })
    }

    pub fn min_age(&self) -> u32 {
        self.min_age.get()
    }

    pub fn max_age(&self) -> u32 {
        self.max_age.get()
    }

    pub fn years(&self) -> RangeInclusive<u32> {
        self.start_year.get()..=self.final_year.get()
    }

    pub fn categories(&self) -> Vec<String> {
        self.categories.cloned()
    }

    pub fn initialisation_years(&self) -> u32 {
        self.initialisation_years.get()
    }

    pub fn annual_cycle(&self) -> Vec<String> {
        self.annual_cycle.cloned()
    }

    pub fn initialisation_cycle(&self) -> Vec<String> {
        if self.initialisation_cycle.is_empty() { self.annual_cycle() } else { self.initialisation_cycle.cloned() }
    }

    /// Empty partition shaped by these settings.
    pub fn partition(&self) -> Partition {
        Partition::new(self.categories(), self.min_age(), self.max_age(), self.plus_group.get())
    }
}

impl Component for ModelSettings {
    fn label(&self) -> &str {
        KIND
    }

    fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut ParameterList {
        &mut self.parameters
    }

    fn validate(&self, diagnostics: &mut Diagnostics) {
        if self.min_age() > self.max_age() {
            report(
                diagnostics,
                &self.parameters,
                "max_age",
                format!("max_age ({}) cannot be less than min_age ({})", self.max_age(), self.min_age()),
            );
        }
        if self.start_year.get() > self.final_year.get() {
            report(
                diagnostics,
                &self.parameters,
                "final_year",
                format!(
                    "final_year ({}) cannot be before start_year ({})",
                    self.final_year.get(),
                    self.start_year.get()
                ),
            );
        }
        let categories = self.categories.borrow();
        for (i, category) in categories.iter().enumerate() {
            if categories[..i].contains(category) {
                report(
                    diagnostics,
                    &self.parameters,
                    "categories",
                    format!("category '{category}' is defined more than once"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_initialisation_cycle_fallback() {
        let mut settings = ModelSettings::new().unwrap();
        let params = settings.parameters_mut();
        params.add("min_age", &["1"], "m.csl", 1).unwrap();
        params.add("max_age", &["5"], "m.csl", 2).unwrap();
        params.add("annual_cycle", &["recruit", "ageing"], "m.csl", 3).unwrap();

        assert_eq!(settings.initialisation_years(), 0);
        assert_eq!(settings.initialisation_cycle(), vec!["recruit".to_string(), "ageing".to_string()]);
        assert!(settings.partition().plus_group());
        assert_eq!(settings.partition().age_count(), 5);
    }

    #[test]
    fn inverted_ranges_and_duplicate_categories_are_reported() {
        let mut settings = ModelSettings::new().unwrap();
        let params = settings.parameters_mut();
        params.add("min_age", &["6"], "m.csl", 1).unwrap();
        params.add("max_age", &["5"], "m.csl", 2).unwrap();
        params.add("start_year", &["2001"], "m.csl", 3).unwrap();
        params.add("final_year", &["2000"], "m.csl", 4).unwrap();
        params.add("categories", &["stock", "stock"], "m.csl", 5).unwrap();
        let mut diagnostics = Diagnostics::new();

        settings.validate(&mut diagnostics);

        let labels: Vec<&str> = diagnostics.errors().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["max_age", "final_year", "categories"]);
    }
}
