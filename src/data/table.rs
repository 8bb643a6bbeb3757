//! In-memory numeric data table.
//!
//! Columns are named `f64` vectors of equal length. Missing cells are `NaN`;
//! each fit selects the complete cases for the variables it uses.

use std::collections::HashMap;

use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    index: HashMap<String, usize>,
    n_rows: usize,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Append a column. The first column fixes the row count.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), AppError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(AppError::new(3, format!("Duplicate column name: `{name}`")));
        }
        if !self.columns.is_empty() && values.len() != self.n_rows {
            return Err(AppError::new(
                3,
                format!(
                    "Column `{name}` has {} rows, expected {}.",
                    values.len(),
                    self.n_rows
                ),
            ));
        }

        self.n_rows = values.len();
        self.index.insert(name.clone(), self.columns.len());
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.index.get(name).map(|&i| self.columns[i].as_slice())
    }

    /// Indices of rows where every named column holds a finite value.
    ///
    /// Unknown names are ignored here; callers check columns first.
    pub fn complete_rows(&self, names: &[&str]) -> Vec<usize> {
        let cols: Vec<&[f64]> = names.iter().filter_map(|n| self.column(n)).collect();
        (0..self.n_rows)
            .filter(|&i| cols.iter().all(|c| c[i].is_finite()))
            .collect()
    }
}
