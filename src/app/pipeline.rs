//! Shared "fit pipeline" logic used by the `fit` and `demo` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> plan -> sequential build -> optional diagnostics
//!
//! The commands can then focus on where the data comes from and what is printed.

use log::info;

use crate::diagnostics::{DiagnosticTable, diagnostic_table};
use crate::domain::{ResultTable, RunConfig};
use crate::error::{AppError, ModelError};
use crate::fit::{ModelPlan, SequentialBuilder};
use crate::formula::ModelSpec;
use crate::io::{IngestedTable, load_data_table};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedTable,
    pub plan: ModelPlan,
    pub table: ResultTable,
    /// Present when `RunConfig::diagnostics` names a grid cell.
    pub diagnostics: Option<DiagnosticTable>,
}

/// Load the CSV named by `config` and run the pipeline on it.
pub fn run_fit(config: &RunConfig) -> Result<RunOutput, AppError> {
    let ingest = load_data_table(&config.data_path)?;
    info!(
        "loaded {} rows x {} numeric columns from {}",
        ingest.rows_read,
        ingest.table.n_cols(),
        config.data_path.display()
    );
    run_with_table(config, ingest)
}

/// Run the pipeline on an already-loaded table.
pub fn run_with_table(config: &RunConfig, ingest: IngestedTable) -> Result<RunOutput, AppError> {
    let spec = ModelSpec::parse(&config.formula)?;
    let exposure = config.exposure.as_deref();
    let plan = ModelPlan::new(&spec, exposure)?;

    let builder = SequentialBuilder::new(config.engine)
        .confidence_level(config.confidence)
        .parallel(config.parallel);
    let table = builder.build(&spec, &ingest.table, exposure)?;

    let diagnostics = match &config.diagnostics {
        Some((outcome, chain_length)) => {
            let cell = plan
                .cells
                .iter()
                .find(|c| &c.outcome == outcome && c.chain_length == *chain_length)
                .ok_or_else(|| {
                    AppError::new(
                        2,
                        format!(
                            "No model `{outcome}` with {chain_length} predictor(s); chain has {} predictor(s).",
                            plan.chain.len()
                        ),
                    )
                })?;
            let model = builder.fit_cell(cell, &ingest.table)?;
            Some(diagnostic_table(&model)?)
        }
        None => None,
    };

    Ok(RunOutput {
        ingest,
        plan,
        table,
        diagnostics,
    })
}

/// Plan only; nothing is fitted.
pub fn plan_only(formula: &str, exposure: Option<&str>) -> Result<ModelPlan, ModelError> {
    let spec = ModelSpec::parse(formula)?;
    ModelPlan::new(&spec, exposure)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::data::{CohortConfig, generate_cohort};
    use crate::domain::{ConfidenceLevel, EngineKind};

    fn config(formula: &str, exposure: Option<&str>) -> RunConfig {
        RunConfig {
            data_path: PathBuf::from("cohort.csv"),
            formula: formula.to_string(),
            exposure: exposure.map(str::to_string),
            engine: EngineKind::Lm,
            confidence: ConfidenceLevel::default(),
            parallel: true,
            trajectory: true,
            diagnostics: None,
            export_results: None,
            export_json: None,
        }
    }

    fn ingest() -> IngestedTable {
        let table = generate_cohort(&CohortConfig::default()).unwrap();
        IngestedTable {
            rows_read: table.n_rows(),
            table,
            dropped_columns: Vec::new(),
            row_errors: Vec::new(),
        }
    }

    #[test]
    fn pipeline_builds_table_and_diagnostics() {
        let _ = pretty_env_logger::try_init();
        let mut cfg = config("HF + LF ~ age + bmi + hba1c", Some("bmi"));
        cfg.diagnostics = Some(("LF".to_string(), 3));

        let out = run_with_table(&cfg, ingest()).unwrap();
        assert_eq!(out.plan.cells.len(), 6);
        assert_eq!(out.table.model_keys().len(), 6);
        match out.diagnostics {
            Some(DiagnosticTable::Gaussian(points)) => assert_eq!(points.len(), 200),
            other => panic!("unexpected diagnostics: {other:?}"),
        }
    }

    #[test]
    fn diagnostics_for_unknown_cell_is_usage_error() {
        let mut cfg = config("HF ~ age + bmi", None);
        cfg.diagnostics = Some(("HF".to_string(), 3));
        let err = run_with_table(&cfg, ingest()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn spec_errors_surface_before_fitting() {
        let err = run_with_table(&config("HF ~ age", Some("bmi")), ingest()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = run_with_table(&config("HF ~ waist", None), ingest()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn plan_only_does_not_need_data() {
        let plan = plan_only("y ~ a + b + c", Some("c")).unwrap();
        assert_eq!(plan.chain, vec!["c", "a", "b"]);
        assert_eq!(plan.cells.len(), 3);
    }
}
