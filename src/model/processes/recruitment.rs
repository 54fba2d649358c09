//! Constant recruitment split across categories.
use crate::{
    addressable::{AddrResult, Addressables},
    model::{
        errors::ModelResult,
        processes::KIND,
        traits::{BuildContext, Component, Phase, Process, RunState, addressable_label, report},
    },
    numerics::GENERAL_TOL,
    parameters::{BindResult, Binding, Bound, Diagnostics, ParameterList},
};

/// Adds `r0 * proportion` fish to each category at the recruitment age.
#[derive(Debug)]
pub struct RecruitmentConstant {
    label: String,
    parameters: ParameterList,
    r0: Bound<f64>,
    categories: Bound<Vec<String>>,
    proportions: Bound<Vec<f64>>,
    age: Bound<u32>,
    category_indices: Vec<usize>,
    age_index: usize,
}

impl RecruitmentConstant {
    pub fn new(label: &str) -> BindResult<RecruitmentConstant> {
        let mut parameters = ParameterList::new();
        let r0 = Bound::new(0.0);
        let categories = Bound::new(Vec::new());
        let proportions = Bound::new(Vec::new());
        let age = Bound::new(0);
        parameters.bind("r0", Binding::scalar(&r0), "Recruits per year")?;
        parameters.bind("categories", Binding::sequence(&categories, false), "Categories receiving recruits")?;
        parameters.bind(
            "proportions",
            Binding::sequence(&proportions, false),
            "Share of recruits for each category",
        )?;
        parameters.bind("age", Binding::scalar_or(&age, 0), "Age of recruits; the minimum age when unset")?;
        Ok(RecruitmentConstant {
            label: label.to_string(),
            parameters,
            r0,
            categories,
            proportions,
            age,
            category_indices: Vec::new(),
            age_index: 0,
        })
    }
}

impl Component for RecruitmentConstant {
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
        let (n_categories, n_proportions) = (self.categories.len(), self.proportions.len());
        if n_categories != n_proportions {
            report(
                diagnostics,
                &self.parameters,
                "proportions",
                format!("expected one proportion per category: {n_categories} categories but got {n_proportions}"),
            );
            return;
        }
        let proportions = self.proportions.borrow();
        if proportions.iter().any(|&p| p < 0.0) {
            report(diagnostics, &self.parameters, "proportions", "proportions cannot be negative");
        }
        let total: f64 = proportions.iter().sum();
        if (total - 1.0).abs() > GENERAL_TOL {
            report(diagnostics, &self.parameters, "proportions", format!("proportions must sum to 1.0, got {total}"));
        }
        if self.r0.get() < 0.0 {
            report(diagnostics, &self.parameters, "r0", "r0 cannot be negative");
        }
    }

    fn register(&self, registry: &mut Addressables) -> AddrResult<()> {
        registry.register_scalar(&addressable_label(KIND, &self.label, "r0"), &self.r0)?;
        registry.register_vector(&addressable_label(KIND, &self.label, "proportions"), &self.proportions)
    }
}

impl Process for RecruitmentConstant {
    fn build(&mut self, context: &BuildContext<'_>, diagnostics: &mut Diagnostics) {
        self.category_indices.clear();
        for category in self.categories.borrow().iter() {
            match context.partition.category_index(category) {
                Some(index) => self.category_indices.push(index),
                None => report(
                    diagnostics,
                    &self.parameters,
                    "categories",
                    format!("category '{category}' does not exist"),
                ),
            }
        }
        let age = if self.parameters.is_defined("age") { self.age.get() } else { context.partition.min_age() };
        match context.partition.age_index(age) {
            Some(index) => self.age_index = index,
            None => report(
                diagnostics,
                &self.parameters,
                "age",
                format!(
                    "age {age} is outside the model ages {}-{}",
                    context.partition.min_age(),
                    context.partition.max_age()
                ),
            ),
        }
    }

    fn execute(&mut self, _phase: Phase, state: &mut RunState<'_>) -> ModelResult<()> {
        let r0 = self.r0.get();
        let proportions = self.proportions.borrow();
        for (&category, proportion) in self.category_indices.iter().zip(proportions.iter()) {
            state.partition.numbers_mut(category)[self.age_index] += r0 * proportion;
        }
        Ok(())
    }
}
