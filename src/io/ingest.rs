//! CSV ingest into a numeric [`DataTable`].
//!
//! Design goals:
//! - **Lenient cells**: empty / `NA` / `NaN` / `.` cells become missing values,
//!   so each fit can apply complete-case selection on its own variables.
//! - **Row-level reporting**: unparseable numeric cells are kept as missing
//!   and reported with their line number.
//! - **Text columns are dropped**: a column with no numeric cell at all
//!   (ids, free-text notes) is left out of the table and listed separately.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::{debug, warn};

use crate::data::DataTable;
use crate::error::AppError;

/// Cell values treated as missing (case-insensitive).
const MISSING_TOKENS: [&str; 5] = ["", "na", "nan", ".", "null"];

/// A cell that could not be parsed as a number.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub column: String,
    pub message: String,
}

/// Ingest output: the numeric table plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: DataTable,
    /// Columns without any numeric value.
    pub dropped_columns: Vec<String>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a CSV file with a header row.
pub fn load_data_table(path: &Path) -> Result<IngestedTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = read_data_table(file)?;
    debug!(
        "loaded {} rows x {} numeric columns from {}",
        ingested.rows_read,
        ingested.table.n_cols(),
        path.display()
    );
    Ok(ingested)
}

/// Parse CSV content from any reader.
pub fn read_data_table<R: Read>(reader: R) -> Result<IngestedTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let names = normalize_headers(&headers)?;

    let mut cells: Vec<Vec<Option<f64>>> = vec![Vec::new(); names.len()];
    let mut raw_errors: Vec<(usize, usize, String)> = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and records are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(3, format!("CSV parse error on line {line}: {e}")))?;
        rows_read += 1;

        for (col, values) in cells.iter_mut().enumerate() {
            let raw = record.get(col).unwrap_or("");
            match parse_cell(raw) {
                Ok(v) => values.push(v),
                Err(()) => {
                    values.push(None);
                    raw_errors.push((line, col, raw.to_string()));
                }
            }
        }
    }

    if rows_read == 0 {
        return Err(AppError::new(3, "CSV contains no data rows."));
    }

    // A column is numeric if at least one cell parsed as a number.
    let numeric: Vec<bool> = cells
        .iter()
        .map(|values| values.iter().any(Option::is_some))
        .collect();

    let mut table = DataTable::new();
    let mut dropped_columns = Vec::new();
    for ((name, values), is_numeric) in names.iter().zip(cells).zip(&numeric) {
        if *is_numeric {
            let values = values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
            table.push_column(name.clone(), values)?;
        } else {
            dropped_columns.push(name.clone());
        }
    }
    if !dropped_columns.is_empty() {
        warn!("ignoring non-numeric column(s): {}", dropped_columns.join(", "));
    }

    let row_errors = raw_errors
        .into_iter()
        .filter(|(_, col, _)| numeric[*col])
        .map(|(line, col, raw)| RowError {
            line,
            column: names[col].clone(),
            message: format!("not a number: '{raw}' (treated as missing)"),
        })
        .collect();

    Ok(IngestedTable {
        table,
        dropped_columns,
        row_errors,
        rows_read,
    })
}

fn normalize_headers(headers: &StringRecord) -> Result<Vec<String>, AppError> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(headers.len());
    for (idx, raw) in headers.iter().enumerate() {
        // Spreadsheet exports sometimes prefix the first header with a BOM.
        let name = raw.trim().trim_start_matches('\u{feff}').to_string();
        if name.is_empty() {
            return Err(AppError::new(2, format!("CSV header {} is empty.", idx + 1)));
        }
        if !seen.insert(name.clone()) {
            return Err(AppError::new(2, format!("Duplicate CSV header: `{name}`")));
        }
        names.push(name);
    }
    Ok(names)
}

fn parse_cell(raw: &str) -> Result<Option<f64>, ()> {
    let s = raw.trim();
    if MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t)) {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_numeric_columns_and_missing_tokens() {
        let csv = "\u{feff}id,HF,bmi,group\nA1,5.2,24.1,ctrl\nA2,NA,27.3,case\nA3,4.9,,case\n";
        let ingested = read_data_table(csv.as_bytes()).unwrap();
        let t = &ingested.table;

        assert_eq!(ingested.rows_read, 3);
        assert_eq!(t.names(), &["HF".to_string(), "bmi".to_string()]);
        assert_eq!(ingested.dropped_columns, vec!["id".to_string(), "group".to_string()]);
        assert!(t.column("HF").unwrap()[1].is_nan());
        assert!(t.column("bmi").unwrap()[2].is_nan());
        assert!(ingested.row_errors.is_empty());
    }

    #[test]
    fn bad_numeric_cells_become_missing_with_row_errors() {
        let csv = "y,x\n1.0,2.0\noops,3.0\n2.0,4.0\n";
        let ingested = read_data_table(csv.as_bytes()).unwrap();
        assert!(ingested.table.column("y").unwrap()[1].is_nan());
        assert_eq!(ingested.row_errors.len(), 1);
        assert_eq!(ingested.row_errors[0].line, 3);
        assert_eq!(ingested.row_errors[0].column, "y");
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let err = read_data_table("a,a\n1,2\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let err = read_data_table("a,b\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
