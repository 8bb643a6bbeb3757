//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - output changes are localized

use crate::diagnostics::DiagnosticTable;
use crate::domain::{ResultRow, ResultTable, RunConfig};
use crate::fit::ModelPlan;
use crate::io::IngestedTable;

/// Dataset + configuration header for a run.
pub fn format_run_summary(ingest: &IngestedTable, plan: &ModelPlan, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str("=== seqmod - sequential regression models ===\n");
    out.push_str(&format!("Data: {}\n", config.data_path.display()));
    out.push_str(&format!(
        "Rows: {} | numeric columns: {}\n",
        ingest.rows_read,
        ingest.table.n_cols()
    ));
    if !ingest.dropped_columns.is_empty() {
        out.push_str(&format!("Ignored columns: {}\n", ingest.dropped_columns.join(", ")));
    }
    if !ingest.row_errors.is_empty() {
        out.push_str(&format!(
            "Unparseable cells treated as missing: {}\n",
            ingest.row_errors.len()
        ));
    }
    out.push_str(&format!("Formula: {}\n", config.formula));
    out.push_str(&format!(
        "Engine: {} | confidence: {:.1}%\n",
        config.engine.name(),
        config.confidence.value() * 100.0
    ));
    out.push_str(&format_chain(plan));
    out.push('\n');
    out
}

/// Predictor chain and the formulas it expands to.
pub fn format_chain(plan: &ModelPlan) -> String {
    let mut out = String::new();
    out.push_str(&format!("Predictor chain: {}\n", plan.chain.join(" -> ")));
    for cell in &plan.cells {
        out.push_str(&format!("  [{} | {}] {}\n", cell.outcome, cell.chain_length, cell.formula));
    }
    out
}

/// The tidy table, one line per term, with a blank line between models.
pub fn format_result_table(table: &ResultTable) -> String {
    let term_w = table
        .rows()
        .iter()
        .map(|r| r.term.len())
        .chain(std::iter::once(4))
        .max()
        .unwrap_or(4);
    let outcome_w = table
        .rows()
        .iter()
        .map(|r| r.outcome.len())
        .chain(std::iter::once(7))
        .max()
        .unwrap_or(7);

    let mut out = String::new();
    out.push_str(&format!(
        "{:<outcome_w$} {:>5} {:<term_w$} {:>12} {:>10} {:>9} {:>10} {:>12} {:>12} {:>6}\n",
        "outcome", "covar", "term", "estimate", "std.error", "stat", "p.value", "conf.low", "conf.high", "n",
    ));

    let mut prev: Option<(&str, usize)> = None;
    for r in table.rows() {
        let key = (r.outcome.as_str(), r.covar);
        if prev.is_some_and(|p| p != key) {
            out.push('\n');
        }
        prev = Some(key);
        out.push_str(&format!(
            "{:<outcome_w$} {:>5} {:<term_w$} {:>12.5} {:>10.5} {:>9.3} {:>10} {:>12.5} {:>12.5} {:>6}\n",
            r.outcome,
            r.covar,
            r.term,
            r.estimate,
            r.std_error,
            r.statistic,
            fmt_pvalue(r.p_value),
            r.conf_low,
            r.conf_high,
            r.n_obs,
        ));
    }
    out
}

/// How one term's estimate moves as covariates are added, per outcome.
pub fn format_trajectory(table: &ResultTable, term: &str) -> String {
    let rows = table.term_trajectory(term);
    let mut out = String::new();
    if rows.is_empty() {
        out.push_str(&format!("No estimates for `{term}`.\n"));
        return out;
    }

    out.push_str(&format!("Estimate of `{term}` by number of predictors:\n"));
    let mut current: Option<&str> = None;
    let mut first: Option<&ResultRow> = None;
    for r in rows {
        if current != Some(r.outcome.as_str()) {
            current = Some(r.outcome.as_str());
            first = Some(r);
            out.push_str(&format!("  {}\n", r.outcome));
        }
        let change = match first {
            Some(f) if f.estimate != 0.0 && f.covar != r.covar => {
                format!(" ({:+.1}% vs crude)", (r.estimate - f.estimate) / f.estimate.abs() * 100.0)
            }
            _ => String::new(),
        };
        out.push_str(&format!(
            "    covar={:<2} {:>10.5} [{:.5}, {:.5}] p={}{}\n",
            r.covar,
            r.estimate,
            r.conf_low,
            r.conf_high,
            fmt_pvalue(r.p_value),
            change
        ));
    }
    out
}

/// Diagnostic table summary (first rows only; exports carry the rest).
pub fn format_diagnostics(title: &str, table: &DiagnosticTable, max_rows: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("Diagnostics for {title}:\n"));
    match table {
        DiagnosticTable::Gaussian(points) => {
            out.push_str(&format!("{:>12} {:>12} {:>12}\n", "fitted", "std.resid", "theoretical"));
            for p in points.iter().take(max_rows) {
                out.push_str(&format!(
                    "{:>12.5} {:>12.5} {:>12.5}\n",
                    p.fitted, p.std_residual, p.theoretical
                ));
            }
            if points.len() > max_rows {
                out.push_str(&format!("... {} more\n", points.len() - max_rows));
            }
        }
        DiagnosticTable::Binomial(bins) => {
            out.push_str(&format!("{:>5} {:>12} {:>12} {:>10}\n", "n", "mean.fitted", "mean.resid", "±2se"));
            for b in bins {
                let flag = if b.mean_residual.abs() > b.bound { " *" } else { "" };
                out.push_str(&format!(
                    "{:>5} {:>12.5} {:>12.5} {:>10.5}{flag}\n",
                    b.n, b.mean_fitted, b.mean_residual, b.bound
                ));
            }
        }
    }
    out
}

fn fmt_pvalue(p: f64) -> String {
    if !p.is_finite() {
        "-".to_string()
    } else if p < 1e-4 {
        "<1e-04".to_string()
    } else {
        format!("{p:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CohortConfig, generate_cohort};
    use crate::fit::build_sequential_models;
    use crate::formula::ModelSpec;

    #[test]
    fn table_separates_models_with_blank_lines() {
        let data = generate_cohort(&CohortConfig::default()).unwrap();
        let table = build_sequential_models("HF ~ bmi + age", &data, None, "lm").unwrap();
        let text = format_result_table(&table);
        // header + 2 + blank + 3
        assert_eq!(text.lines().count(), 1 + 2 + 1 + 3);
        assert!(text.lines().next().unwrap().contains("conf.high"));
    }

    #[test]
    fn trajectory_lists_each_covar_level() {
        let data = generate_cohort(&CohortConfig::default()).unwrap();
        let table = build_sequential_models("HF + LF ~ age + bmi + hba1c", &data, Some("bmi"), "lm").unwrap();
        let text = format_trajectory(&table, "bmi");
        assert_eq!(text.matches("covar=").count(), 6);
        assert!(text.contains("  HF\n"));
        assert!(text.contains("vs crude"));
        assert!(format_trajectory(&table, "nope").starts_with("No estimates"));
    }

    #[test]
    fn chain_lists_every_formula() {
        let spec = ModelSpec::parse("HF ~ age + bmi").unwrap();
        let plan = ModelPlan::new(&spec, Some("bmi")).unwrap();
        let text = format_chain(&plan);
        assert!(text.contains("bmi -> age"));
        assert!(text.contains("[HF | 2] HF ~ bmi + age"));
    }

    #[test]
    fn pvalue_formatting() {
        assert_eq!(fmt_pvalue(0.5), "0.5000");
        assert_eq!(fmt_pvalue(1e-9), "<1e-04");
        assert_eq!(fmt_pvalue(f64::NAN), "-");
    }
}
