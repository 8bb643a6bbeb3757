//! Export the tidy result table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or R/pandas:
//! one row per model term, with the grid position in `outcome` / `covar`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::data::DataTable;
use crate::domain::ResultTable;
use crate::error::AppError;

const HEADER: &str = "outcome,covar,term,estimate,std_error,statistic,p_value,conf_low,conf_high,n_obs";

/// Write the result table to a CSV file.
pub fn write_results_csv(path: &Path, table: &ResultTable) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(&mut file, table)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display())))
}

/// Write the result table as CSV to any writer.
pub fn write_results<W: Write>(out: &mut W, table: &ResultTable) -> std::io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for r in table.rows() {
        writeln!(
            out,
            "{},{},{},{:.10},{:.10},{:.6},{:.6e},{:.10},{:.10},{}",
            csv_field(&r.outcome),
            r.covar,
            csv_field(&r.term),
            r.estimate,
            r.std_error,
            r.statistic,
            r.p_value,
            r.conf_low,
            r.conf_high,
            r.n_obs,
        )?;
    }
    Ok(())
}

/// Write a data table to a CSV file; missing values are written as `NA`.
pub fn write_data_table_csv(path: &Path, table: &DataTable) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create data CSV '{}': {e}", path.display())))?;
    write_data_table(&mut file, table)
        .map_err(|e| AppError::new(2, format!("Failed to write data CSV '{}': {e}", path.display())))
}

pub fn write_data_table<W: Write>(out: &mut W, table: &DataTable) -> std::io::Result<()> {
    let header: Vec<String> = table.names().iter().map(|n| csv_field(n)).collect();
    writeln!(out, "{}", header.join(","))?;

    let columns: Vec<&[f64]> = table
        .names()
        .iter()
        .filter_map(|name| table.column(name))
        .collect();
    for i in 0..table.n_rows() {
        let cells: Vec<String> = columns
            .iter()
            .map(|col| if col[i].is_nan() { "NA".to_string() } else { col[i].to_string() })
            .collect();
        writeln!(out, "{}", cells.join(","))?;
    }
    Ok(())
}

/// Quote a field if it contains a delimiter, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
