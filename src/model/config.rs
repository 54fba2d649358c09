//! Configuration input handed to the model builder.
//!
//! The crate does not read files. An external loader turns its input into
//! [`ConfigBlock`]s (one per `@kind label` section) holding raw lines and
//! tables, each tagged with its file and line. The builder feeds them to
//! the owning component's [`ParameterList`].
use crate::parameters::{BindResult, Diagnostics, Location, ParameterList};

/// Reserved line label naming a block's concrete type.
pub const TYPE_LABEL: &str = "type";

/// One `label value value ...` line.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLine {
    pub label: String,
    pub values: Vec<String>,
    pub file: String,
    pub line: u32,
}

impl ConfigLine {
    pub fn location(&self) -> Location {
        Location::new(self.file.clone(), self.line)
    }
}

/// One table: a header of column names and rows of raw tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTable {
    pub label: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub file: String,
    pub line: u32,
}

/// One configuration section.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigBlock {
    pub kind: String,
    pub label: String,
    pub file: String,
    pub line: u32,
    pub lines: Vec<ConfigLine>,
    pub tables: Vec<ConfigTable>,
}

impl ConfigBlock {
    pub fn new(kind: &str, label: &str, file: &str, line: u32) -> ConfigBlock {
        ConfigBlock {
            kind: kind.to_string(),
            label: label.to_string(),
            file: file.to_string(),
            line,
            lines: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Append a line; its line number follows the previous entry.
    pub fn with_line(mut self, label: &str, values: &[&str]) -> ConfigBlock {
        let line = self.next_line();
        self.lines.push(ConfigLine {
            label: label.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
            file: self.file.clone(),
            line,
        });
        self
    }

    /// Append a table with the header `columns`.
    pub fn with_table(mut self, label: &str, columns: &[&str], rows: &[&[&str]]) -> ConfigBlock {
        let line = self.next_line();
        self.tables.push(ConfigTable {
            label: label.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows.iter().map(|row| row.iter().map(|v| v.to_string()).collect()).collect(),
            file: self.file.clone(),
            line,
        });
        self
    }

    pub fn location(&self) -> Location {
        Location::new(self.file.clone(), self.line)
    }

    /// Last line carrying `label`.
    pub fn line(&self, label: &str) -> Option<&ConfigLine> {
        self.lines.iter().rev().find(|l| l.label == label)
    }

    /// Lower-cased value of the `type` line.
    pub fn type_name(&self) -> Option<String> {
        self.line(TYPE_LABEL).and_then(|l| l.values.first()).map(|v| v.to_ascii_lowercase())
    }

    /// Feed every line and table except `type` into `parameters`, then
    /// report whatever required parameter is still missing.
    ///
    /// Missing-parameter errors are tagged with the block's location since
    /// no line exists to point at.
    ///
    /// # Errors
    /// - Binder failures that are programming errors (an expired target, a
    ///   lookup without location) are returned instead of collected.
    pub fn load_into(&self, parameters: &mut ParameterList, diagnostics: &mut Diagnostics) -> BindResult<()> {
        for line in self.lines.iter().filter(|l| l.label != TYPE_LABEL) {
            collect_input(parameters.add(&line.label, &line.values, &line.file, line.line), diagnostics)?;
        }
        for table in &self.tables {
            let added =
                parameters.add_table(&table.label, table.columns.clone(), table.rows.clone(), &table.file, table.line);
            collect_input(added, diagnostics)?;
        }
        let mut missing = Diagnostics::new();
        parameters.check_required(&mut missing);
        for mut err in missing.errors().iter().cloned() {
            if err.location.is_none() {
                err.location = Some(self.location());
            }
            err.label = format!("{}[{}].{}", self.kind, self.label, err.label);
            diagnostics.push(err);
        }
        Ok(())
    }

    fn next_line(&self) -> u32 {
        let last = self.lines.iter().map(|l| l.line).chain(self.tables.iter().map(|t| t.line)).max();
        last.unwrap_or(self.line) + 1
    }
}

/// Collect configuration failures; hand programming errors back.
fn collect_input(result: BindResult<()>, diagnostics: &mut Diagnostics) -> BindResult<()> {
    match result {
        Err(err) if err.is_programming_error() => Err(err),
        other => {
            diagnostics.collect(other);
            Ok(())
        }
    }
}
