//! Design matrix construction.
//!
//! The engines rely on one primitive operation: turn a [`Formula`] and a
//! [`DataTable`] into `(X, y)` over the complete cases of the variables the
//! formula reads. The first column of `X` is the intercept.

use nalgebra::{DMatrix, DVector};

use crate::data::DataTable;
use crate::error::FitError;
use crate::formula::Formula;

#[derive(Debug, Clone)]
pub struct Design {
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
    /// Coefficient names, intercept first.
    pub terms: Vec<String>,
    /// Data-table rows used (complete cases), in table order.
    pub rows: Vec<usize>,
}

impl Design {
    pub fn n_obs(&self) -> usize {
        self.rows.len()
    }
}

/// Build the design for `formula` from `data`.
pub fn build_design(formula: &Formula, data: &DataTable) -> Result<Design, FitError> {
    let vars = formula.variables();
    for v in &vars {
        if !data.has_column(v) {
            return Err(FitError::MissingColumn(v.to_string()));
        }
    }

    let rows = data.complete_rows(&vars);
    let n = rows.len();
    let p = formula.predictors.len() + 1;

    let response = data
        .column(&formula.response)
        .ok_or_else(|| FitError::MissingColumn(formula.response.clone()))?;
    let predictors: Vec<&[f64]> = formula
        .predictors
        .iter()
        .map(|name| data.column(name).ok_or_else(|| FitError::MissingColumn(name.clone())))
        .collect::<Result<_, _>>()?;

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut y = DVector::<f64>::zeros(n);
    for (i, &r) in rows.iter().enumerate() {
        x[(i, 0)] = 1.0;
        for (j, col) in predictors.iter().enumerate() {
            x[(i, j + 1)] = col[r];
        }
        y[i] = response[r];
    }

    Ok(Design {
        x,
        y,
        terms: formula.terms(),
        rows,
    })
}
