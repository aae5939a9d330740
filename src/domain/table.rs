//! Column-major numeric table.
//!
//! This is the in-memory shape of every measurement file we ingest (motor
//! curves, locked-rotor captures, breaker datasheet curves):
//!
//! - named `f64` columns, kept in source insertion order
//! - every column has the same number of rows
//! - a human-readable label, used to make schema errors point at the right file

use serde::{Deserialize, Serialize};

use crate::error::CurveError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    label: String,
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Empty table with the given column names.
    pub fn new(label: impl Into<String>, names: &[&str]) -> Self {
        Self {
            label: label.into(),
            columns: names
                .iter()
                .map(|name| Column {
                    name: (*name).to_string(),
                    values: Vec::new(),
                })
                .collect(),
            rows: 0,
        }
    }

    /// Build a table from whole columns.
    ///
    /// Fails if two columns share a name or if column lengths differ.
    pub fn from_columns<S: Into<String>>(
        label: impl Into<String>,
        columns: Vec<(S, Vec<f64>)>,
    ) -> Result<Self, CurveError> {
        let label = label.into();
        let mut table = Self {
            label,
            columns: Vec::with_capacity(columns.len()),
            rows: 0,
        };
        for (idx, (name, values)) in columns.into_iter().enumerate() {
            let name = name.into();
            if idx == 0 {
                table.rows = values.len();
            }
            if table.has_column(&name) {
                return Err(CurveError::invalid(format!(
                    "duplicate column `{name}` in {}",
                    table.label
                )));
            }
            if values.len() != table.rows {
                return Err(CurveError::invalid(format!(
                    "column `{name}` in {} has {} rows, expected {}",
                    table.label,
                    values.len(),
                    table.rows
                )));
            }
            table.columns.push(Column { name, values });
        }
        Ok(table)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Append one row; `values` must follow column order.
    pub fn push_row(&mut self, values: &[f64]) -> Result<(), CurveError> {
        if values.len() != self.columns.len() {
            return Err(CurveError::invalid(format!(
                "row has {} values but {} has {} columns",
                values.len(),
                self.label,
                self.columns.len()
            )));
        }
        for (column, &v) in self.columns.iter_mut().zip(values) {
            column.values.push(v);
        }
        self.rows += 1;
        Ok(())
    }

    pub fn column(&self, name: &str) -> Result<&[f64], CurveError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| CurveError::schema(name, &self.label))
    }

    pub fn value(&self, row: usize, name: &str) -> Result<f64, CurveError> {
        let column = self.column(name)?;
        column.get(row).copied().ok_or_else(|| {
            CurveError::invalid(format!(
                "row {row} out of range for {} ({} rows)",
                self.label, self.rows
            ))
        })
    }

    /// One row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.rows {
            return None;
        }
        Some(self.columns.iter().map(|c| c.values[index]).collect())
    }

    /// Paired `(x, y)` columns, cloned for handing to a fitter.
    pub fn xy(&self, x: &str, y: &str) -> Result<(Vec<f64>, Vec<f64>), CurveError> {
        Ok((self.column(x)?.to_vec(), self.column(y)?.to_vec()))
    }

    /// Rename a column in place. Returns `false` if `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.columns.iter_mut().find(|c| c.name == from) {
            Some(column) => {
                column.name = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Apply `f` to every value of one column.
    pub fn map_column(&mut self, name: &str, f: impl Fn(f64) -> f64) -> Result<(), CurveError> {
        let label = self.label.clone();
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| CurveError::schema(name, label))?;
        for v in column.values.iter_mut() {
            *v = f(*v);
        }
        Ok(())
    }

    /// Add a column, or replace it if the name already exists.
    pub fn with_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), CurveError> {
        if values.len() != self.rows && !self.columns.is_empty() {
            return Err(CurveError::invalid(format!(
                "column `{name}` has {} rows but {} has {}",
                values.len(),
                self.label,
                self.rows
            )));
        }
        if self.columns.is_empty() {
            self.rows = values.len();
        }
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
        Ok(())
    }

    /// Rows `start..end`, truncated to the table length (never panics).
    pub fn slice_rows(&self, start: usize, end: usize) -> Table {
        let end = end.min(self.rows);
        let start = start.min(end);
        Table {
            label: self.label.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: c.values[start..end].to_vec(),
                })
                .collect(),
            rows: end - start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(
            "sample",
            vec![("speed", vec![0.0, 60.0, 120.0]), ("current", vec![3.0, 2.0, 1.0])],
        )
        .unwrap()
    }

    #[test]
    fn columns_keep_insertion_order() {
        let t = sample();
        let names: Vec<&str> = t.column_names().collect();
        assert_eq!(names, vec!["speed", "current"]);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn missing_column_is_schema_error() {
        let t = sample();
        let err = t.column("torque").unwrap_err();
        assert_eq!(err, CurveError::schema("torque", "sample"));
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let err = Table::from_columns("bad", vec![("a", vec![1.0, 2.0]), ("b", vec![1.0])]).unwrap_err();
        assert!(matches!(err, CurveError::InvalidInput(_)));
    }

    #[test]
    fn push_row_checks_width() {
        let mut t = Table::new("t", &["a", "b"]);
        t.push_row(&[1.0, 2.0]).unwrap();
        assert!(t.push_row(&[1.0]).is_err());
        assert_eq!(t.len(), 1);
        assert_eq!(t.value(0, "b").unwrap(), 2.0);
    }

    #[test]
    fn row_reads_across_columns() {
        let t = sample();
        assert_eq!(t.row(1), Some(vec![60.0, 2.0]));
        assert_eq!(t.row(3), None);
    }

    #[test]
    fn slice_rows_truncates_like_positional_indexing() {
        let t = sample();
        let head = t.slice_rows(1, 10);
        assert_eq!(head.len(), 2);
        assert_eq!(head.column("speed").unwrap(), &[60.0, 120.0]);
        assert!(t.slice_rows(5, 10).is_empty());
    }

    #[test]
    fn with_column_appends_or_replaces() {
        let mut t = sample();
        t.with_column("torque", vec![0.1, 0.2, 0.3]).unwrap();
        t.with_column("current", vec![9.0, 9.0, 9.0]).unwrap();
        assert_eq!(t.column("current").unwrap(), &[9.0, 9.0, 9.0]);
        assert!(t.with_column("x", vec![1.0]).is_err());
    }
}
