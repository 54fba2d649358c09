//! Relative abundance index with a log-normal likelihood.
use std::collections::BTreeMap;

use crate::{
    addressable::{AddrResult, Addressables},
    model::{
        partition::Partition,
        selectivity::{CategorySelectivities, Selectivity},
        traits::{BuildContext, Component, addressable_label, report},
    },
    numerics::zero_fun,
    objective::{Contribution, ContributionKind, ObjResult, ScoreSource},
    parameters::{BindResult, Binding, Bound, Diagnostics, FromToken, ParameterList, Table},
};

/// Block kind and addressable prefix.
pub const KIND: &str = "observation";

/// Observed index per year compared with `q` times the selected numbers.
///
/// Each observed year contributes
/// `ln(sigma) + 0.5 * ((ln(obs) - ln(q * expected)) / sigma)^2`.
#[derive(Debug)]
pub struct AbundanceObservation {
    label: String,
    parameters: ParameterList,
    q: Bound<f64>,
    sigma: Bound<f64>,
    selection: CategorySelectivities,
    observed: Vec<(u32, f64)>,
    expected: BTreeMap<u32, f64>,
}

impl AbundanceObservation {
    pub fn new(label: &str) -> BindResult<AbundanceObservation> {
        let mut parameters = ParameterList::new();
        let q = Bound::new(1.0);
        let sigma = Bound::new(1.0);
        parameters.bind("q", Binding::scalar(&q), "Catchability")?;
        parameters.bind("sigma", Binding::scalar(&sigma), "Log-normal standard deviation")?;
        let selection = CategorySelectivities::bind(&mut parameters)?;
        parameters.bind_table("obs", "Observed index by year (columns: year value)", false)?;
        Ok(AbundanceObservation {
            label: label.to_string(),
            parameters,
            q,
            sigma,
            selection,
            observed: Vec::new(),
            expected: BTreeMap::new(),
        })
    }

    /// `(year, value)` pairs in table order.
    pub fn observed(&self) -> &[(u32, f64)] {
        &self.observed
    }

    /// Expected index recorded for `year` by the last run.
    pub fn expected(&self, year: u32) -> Option<f64> {
        self.expected.get(&year).copied()
    }

    pub fn years(&self) -> impl Iterator<Item = u32> + '_ {
        self.observed.iter().map(|&(year, _)| year)
    }

    pub fn reset(&mut self) {
        self.expected.clear();
    }

    /// Record the selected numbers at the end of `year`, if observed.
    pub fn observe(&mut self, year: u32, partition: &Partition, selectivities: &[Selectivity]) {
        if self.observed.iter().any(|&(y, _)| y == year) {
            self.expected.insert(year, self.selection.selected_total(partition, selectivities));
        }
    }

    fn parse_table(&self, table: &Table, diagnostics: &mut Diagnostics) -> Option<Vec<(u32, f64)>> {
        let years = self.column::<u32>(table, "year", diagnostics);
        let values = self.column::<f64>(table, "value", diagnostics);
        let pairs: Vec<(u32, f64)> = years?.into_iter().zip(values?).collect();
        for (i, &(year, value)) in pairs.iter().enumerate() {
            if pairs[..i].iter().any(|&(y, _)| y == year) {
                report(diagnostics, &self.parameters, "obs", format!("year {year} is listed more than once"));
            }
            if value <= 0.0 {
                report(
                    diagnostics,
                    &self.parameters,
                    "obs",
                    format!("observation {value} in year {year} must be greater than 0"),
                );
            }
        }
        Some(pairs)
    }

    fn column<T: FromToken>(&self, table: &Table, name: &str, diagnostics: &mut Diagnostics) -> Option<Vec<T>> {
        match table.column_as::<T>(name) {
            None => {
                report(diagnostics, &self.parameters, "obs", format!("table has no '{name}' column"));
                None
            }
            Some(Err((row, token))) => {
                report(
                    diagnostics,
                    &self.parameters,
                    "obs",
                    format!("row {}: '{token}' in column '{name}' could not be converted to {}", row + 1, T::EXPECTED),
                );
                None
            }
            Some(Ok(values)) => Some(values),
        }
    }

    pub fn build(&mut self, context: &BuildContext<'_>, diagnostics: &mut Diagnostics) {
        self.selection.build(&self.parameters, context, diagnostics);
        let Some(table) = self.parameters.table("obs") else {
            return;
        };
        let Some(observed) = self.parse_table(table, diagnostics) else {
            return;
        };
        for &(year, _) in &observed {
            if !context.years.contains(&year) {
                report(
                    diagnostics,
                    &self.parameters,
                    "obs",
                    format!("year {year} is outside the model years {}-{}", context.years.start(), context.years.end()),
                );
            }
        }
        self.observed = observed;
    }
}

impl Component for AbundanceObservation {
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
        if self.q.get() <= 0.0 {
            report(diagnostics, &self.parameters, "q", "q must be greater than 0");
        }
        if self.sigma.get() <= 0.0 {
            report(diagnostics, &self.parameters, "sigma", "sigma must be greater than 0");
        }
    }

    fn register(&self, registry: &mut Addressables) -> AddrResult<()> {
        registry.register_scalar(&addressable_label(KIND, &self.label, "q"), &self.q)?;
        registry.register_scalar(&addressable_label(KIND, &self.label, "sigma"), &self.sigma)
    }
}

impl ScoreSource for AbundanceObservation {
    fn contributions(&self, sink: &mut Vec<Contribution>) -> ObjResult<()> {
        let q = self.q.get();
        let sigma = zero_fun(self.sigma.get());
        for &(year, observed) in &self.observed {
            let Some(expected) = self.expected(year) else {
                continue;
            };
            let residual = (observed.ln() - zero_fun(q * expected).ln()) / sigma;
            sink.push(Contribution::new(
                ContributionKind::Likelihood,
                format!("{}[{}]:{year}", KIND, self.label),
                sigma.ln() + 0.5 * residual * residual,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::Penalties;

    fn observation(rows: &[&[&str]]) -> AbundanceObservation {
        let mut obs = AbundanceObservation::new("survey").unwrap();
        let params = obs.parameters_mut();
        params.add("q", &["0.5"], "obs.csl", 1).unwrap();
        params.add("sigma", &["0.2"], "obs.csl", 2).unwrap();
        params.add("categories", &["stock"], "obs.csl", 3).unwrap();
        params.add("selectivities", &["all"], "obs.csl", 4).unwrap();
        let columns = vec!["year".to_string(), "value".to_string()];
        let rows = rows.iter().map(|r| r.iter().map(|v| v.to_string()).collect()).collect();
        params.add_table("obs", columns, rows, "obs.csl", 5).unwrap();
        obs
    }

    fn fixtures() -> (Partition, Vec<Selectivity>) {
        let mut partition = Partition::new(vec!["stock".to_string()], 1, 2, true);
        partition.numbers_mut(0).copy_from_slice(&[60.0, 40.0]);
        let mut sel = Selectivity::new("all", "constant").unwrap().unwrap();
        sel.parameters_mut().add("c", &["1"], "sel.csl", 1).unwrap();
        (partition, vec![sel])
    }

    #[test]
    // Purpose
    // -------
    // A perfectly fitted year contributes only ln(sigma); a mis-fitted year
    // adds the squared log residual.
    //
    // Given
    // -----
    // - Expected numbers 100, q = 0.5, sigma = 0.2.
    // - Observations 50 in 2000 (exact) and 50e in 2001.
    //
    // Expect
    // ------
    // - 2000: ln 0.2; 2001: ln 0.2 + 0.5 * (1 / 0.2)^2.
    fn likelihood_matches_lognormal_form() {
        // Arrange
        let e = std::f64::consts::E;
        let later = format!("{}", 50.0 * e);
        let mut obs = observation(&[&["2000", "50"], &["2001", later.as_str()]]);
        let (partition, selectivities) = fixtures();
        let penalties = Penalties::new();
        let context = BuildContext { partition: &partition, selectivities: &selectivities, penalties: &penalties, years: 2000..=2001 };
        let mut diagnostics = Diagnostics::new();
        obs.build(&context, &mut diagnostics);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.errors());

        // Act
        obs.observe(2000, &partition, &selectivities);
        obs.observe(2001, &partition, &selectivities);
        let mut sink = Vec::new();
        obs.contributions(&mut sink).unwrap();

        // Assert
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].label, "observation[survey]:2000");
        assert!((sink[0].value - 0.2_f64.ln()).abs() < 1e-12);
        assert!((sink[1].value - (0.2_f64.ln() + 0.5 * 25.0)).abs() < 1e-9);
    }

    #[test]
    fn unobserved_years_are_not_recorded() {
        let mut obs = observation(&[&["2000", "50"]]);
        let (partition, selectivities) = fixtures();
        let penalties = Penalties::new();
        let context = BuildContext { partition: &partition, selectivities: &selectivities, penalties: &penalties, years: 2000..=2001 };
        obs.build(&context, &mut Diagnostics::new());

        obs.observe(2001, &partition, &selectivities);

        assert_eq!(obs.expected(2001), None);
        let mut sink = Vec::new();
        obs.contributions(&mut sink).unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn bad_table_rows_are_reported() {
        let mut obs = observation(&[&["2000", "abc"], &["1990", "5"]]);
        let (partition, selectivities) = fixtures();
        let penalties = Penalties::new();
        let context = BuildContext { partition: &partition, selectivities: &selectivities, penalties: &penalties, years: 2000..=2001 };
        let mut diagnostics = Diagnostics::new();

        obs.build(&context, &mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.errors()[0].message.contains("row 1"));
        assert_eq!(diagnostics.errors()[0].location.as_ref().map(|l| l.line), Some(5));
    }
}
