//! Table parameters: named columns over rows of raw tokens.
//!
//! A [`Table`] stores tokens exactly as the loader supplied them. Typed
//! interpretation belongs to the consuming domain object; the helpers here
//! only look tokens up or convert them on explicit request.
use crate::parameters::tokens::FromToken;

/// Rectangular block of raw configuration tokens.
///
/// Invariant: every row has exactly `columns().len()` tokens. Rows are only
/// appended through [`Table::add_row`], which enforces it.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    label: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(label: impl Into<String>, columns: Vec<String>) -> Table {
        Table { label: label.into(), columns, rows: Vec::new() }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Append a row, returning it back when its width does not match.
    pub fn add_row(&mut self, row: Vec<String>) -> Result<(), Vec<String>> {
        if row.len() != self.columns.len() {
            return Err(row);
        }
        self.rows.push(row);
        Ok(())
    }

    /// Position of a column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Raw tokens of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }

    /// Convert one column to `T`; `Err((row, token))` names the first
    /// token that does not convert.
    pub fn column_as<T: FromToken>(&self, name: &str) -> Option<Result<Vec<T>, (usize, String)>> {
        let index = self.column_index(name)?;
        let parsed = self
            .rows
            .iter()
            .enumerate()
            .map(|(row, tokens)| {
                T::from_token(&tokens[index]).ok_or_else(|| (row, tokens[index].clone()))
            })
            .collect();
        Some(parsed)
    }

    /// First row whose first column equals `key`.
    pub fn row_by_key(&self, key: &str) -> Option<&[String]> {
        self.rows.iter().find(|row| row.first().is_some_and(|k| k == key)).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catches() -> Table {
        let mut table = Table::new("catches", vec!["year".to_string(), "FishingA".to_string()]);
        table.add_row(vec!["1990".to_string(), "1200".to_string()]).unwrap();
        table.add_row(vec!["1991".to_string(), "n/a".to_string()]).unwrap();
        table
    }

    #[test]
    fn add_row_rejects_ragged_rows() {
        let mut table = catches();
        let rejected = table.add_row(vec!["1992".to_string()]);
        assert_eq!(rejected, Err(vec!["1992".to_string()]));
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn column_lookup_is_case_insensitive_and_raw() {
        let table = catches();
        assert_eq!(table.column("fishinga"), Some(vec!["1200", "n/a"]));
        assert_eq!(table.column("FishingB"), None);
    }

    #[test]
    fn column_as_reports_first_bad_token() {
        let table = catches();
        let years: Vec<u32> = table.column_as("year").unwrap().unwrap();
        assert_eq!(years, vec![1990, 1991]);
        let bad = table.column_as::<f64>("FishingA").unwrap();
        assert_eq!(bad, Err((1, "n/a".to_string())));
    }

    #[test]
    fn row_by_key_matches_first_column() {
        let table = catches();
        assert_eq!(table.row_by_key("1991").map(|r| r[1].as_str()), Some("n/a"));
        assert!(table.row_by_key("2000").is_none());
    }
}
