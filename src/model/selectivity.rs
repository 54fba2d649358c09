//! Age-based selectivities and the category/selectivity pairing shared by
//! processes and observations.
use crate::{
    addressable::{AddrResult, Addressables},
    model::{
        partition::Partition,
        traits::{BuildContext, Component, addressable_label, report},
    },
    parameters::{BindResult, Binding, Bound, Diagnostics, ParameterList},
};

/// Block kind and addressable prefix.
pub const KIND: &str = "selectivity";

#[derive(Debug, Clone)]
enum Shape {
    Constant { c: Bound<f64> },
    Logistic { a50: Bound<f64>, ato95: Bound<f64> },
}

/// Fraction of each age a process or observation sees.
#[derive(Debug)]
pub struct Selectivity {
    label: String,
    shape: Shape,
    parameters: ParameterList,
}

impl Selectivity {
    /// Selectivity of `type_name`, or `None` for an unknown type.
    pub fn new(label: &str, type_name: &str) -> BindResult<Option<Selectivity>> {
        let mut parameters = ParameterList::new();
        let shape = match type_name {
            "constant" => {
                let c = Bound::new(1.0);
                parameters.bind("c", Binding::scalar(&c), "Selectivity applied to every age")?;
                Shape::Constant { c }
            }
            "logistic" => {
                let a50 = Bound::new(0.0);
                let ato95 = Bound::new(1.0);
                parameters.bind("a50", Binding::scalar(&a50), "Age at 50% selectivity")?;
                parameters.bind("ato95", Binding::scalar(&ato95), "Ages from 50% to 95% selectivity")?;
                Shape::Logistic { a50, ato95 }
            }
            _ => return Ok(None),
        };
        Ok(Some(Selectivity { label: label.to_string(), shape, parameters }))
    }

    /// Selectivity at `age`.
    ///
    /// A logistic with `ato95 == 0` (reachable through an estimate even
    /// though configuration rejects it) is a knife edge at `a50`.
    pub fn at_age(&self, age: u32) -> f64 {
        match &self.shape {
            Shape::Constant { c } => c.get(),
            Shape::Logistic { a50, ato95 } => {
                let (a50, ato95, age) = (a50.get(), ato95.get(), f64::from(age));
                if ato95 == 0.0 {
                    return if age >= a50 { 1.0 } else { 0.0 };
                }
                let threshold = (a50 - age) / ato95;
                if threshold > 5.0 {
                    0.0
                } else if threshold < -5.0 {
                    1.0
                } else {
                    1.0 / (1.0 + 19.0_f64.powf(threshold))
                }
            }
        }
    }
}

impl Component for Selectivity {
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
        if let Shape::Logistic { ato95, .. } = &self.shape {
            if ato95.get() == 0.0 {
                report(diagnostics, &self.parameters, "ato95", "ato95 cannot be 0");
            }
        }
    }

    fn register(&self, registry: &mut Addressables) -> AddrResult<()> {
        match &self.shape {
            Shape::Constant { c } => registry.register_scalar(&addressable_label(KIND, &self.label, "c"), c),
            Shape::Logistic { a50, ato95 } => {
                registry.register_scalar(&addressable_label(KIND, &self.label, "a50"), a50)?;
                registry.register_scalar(&addressable_label(KIND, &self.label, "ato95"), ato95)
            }
        }
    }
}

/// Parallel `categories` / `selectivities` parameters, resolved to
/// `(category index, selectivity index)` pairs at build time.
#[derive(Debug, Clone)]
pub struct CategorySelectivities {
    categories: Bound<Vec<String>>,
    selectivities: Bound<Vec<String>>,
    pairs: Vec<(usize, usize)>,
}

impl CategorySelectivities {
    pub fn bind(parameters: &mut ParameterList) -> BindResult<CategorySelectivities> {
        let categories = Bound::new(Vec::new());
        let selectivities = Bound::new(Vec::new());
        parameters.bind("categories", Binding::sequence(&categories, false), "Categories to apply to")?;
        parameters.bind(
            "selectivities",
            Binding::sequence(&selectivities, false),
            "One selectivity per category",
        )?;
        Ok(CategorySelectivities { categories, selectivities, pairs: Vec::new() })
    }

    /// Both lists must have the same length.
    pub fn validate(&self, parameters: &ParameterList, diagnostics: &mut Diagnostics) {
        let (n_categories, n_selectivities) = (self.categories.len(), self.selectivities.len());
        if n_categories != n_selectivities {
            report(
                diagnostics,
                parameters,
                "selectivities",
                format!(
                    "number of selectivities provided does not match the number of categories provided: \
                     expected {n_categories} but got {n_selectivities}"
                ),
            );
        }
    }

    /// Resolve every label; unknown labels are reported, not skipped.
    pub fn build(&mut self, parameters: &ParameterList, context: &BuildContext<'_>, diagnostics: &mut Diagnostics) {
        self.pairs.clear();
        let categories = self.categories.borrow();
        let selectivities = self.selectivities.borrow();
        for (category, selectivity) in categories.iter().zip(selectivities.iter()) {
            let c = context.partition.category_index(category);
            if c.is_none() {
                report(diagnostics, parameters, "categories", format!("category '{category}' does not exist"));
            }
            let s = context.selectivity_index(selectivity);
            if s.is_none() {
                report(
                    diagnostics,
                    parameters,
                    "selectivities",
                    format!("selectivity '{selectivity}' does not exist. Have you defined it?"),
                );
            }
            if let (Some(c), Some(s)) = (c, s) {
                self.pairs.push((c, s));
            }
        }
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn category_labels(&self) -> Vec<String> {
        self.categories.cloned()
    }

    /// Selected numbers summed over every pair and age.
    pub fn selected_total(&self, partition: &Partition, selectivities: &[Selectivity]) -> f64 {
        self.pairs
            .iter()
            .map(|&(c, s)| {
                partition.ages().zip(partition.numbers(c)).map(|(age, n)| n * selectivities[s].at_age(age)).sum::<f64>()
            })
            .sum()
    }
}
