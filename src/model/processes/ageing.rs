//! Moves fish one age older.
use crate::{
    model::{
        errors::ModelResult,
        traits::{BuildContext, Component, Phase, Process, RunState, report},
    },
    parameters::{BindResult, Binding, Bound, Diagnostics, ParameterList},
};

#[derive(Debug)]
pub struct Ageing {
    label: String,
    parameters: ParameterList,
    categories: Bound<Vec<String>>,
    category_indices: Vec<usize>,
}

impl Ageing {
    pub fn new(label: &str) -> BindResult<Ageing> {
        let mut parameters = ParameterList::new();
        let categories = Bound::new(Vec::new());
        parameters.bind("categories", Binding::sequence(&categories, false), "Categories to age")?;
        Ok(Ageing { label: label.to_string(), parameters, categories, category_indices: Vec::new() })
    }
}

impl Component for Ageing {
    fn label(&self) -> &str {
        &self.label
    }

    fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut ParameterList {
        &mut self.parameters
    }
}

impl Process for Ageing {
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
    }

    fn execute(&mut self, _phase: Phase, state: &mut RunState<'_>) -> ModelResult<()> {
        for &category in &self.category_indices {
            state.partition.age_by_one(category);
        }
        Ok(())
    }
}
