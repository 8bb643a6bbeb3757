//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - loads or generates data
//! - runs the sequential build
//! - prints reports and writes optional exports

use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;

use crate::cli::{ChainArgs, Command, DemoArgs, FitArgs, ModelArgs};
use crate::data::{CohortConfig, generate_cohort};
use crate::domain::{ConfidenceLevel, RunConfig};
use crate::error::AppError;
use crate::io::{IngestedTable, RunMetadata};

pub mod pipeline;

/// Entry point for the `seqmod` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` first so RUST_LOG and SEQMOD_* can come from it.
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Demo(args) => handle_demo(args),
        Command::Chain(args) => handle_chain(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args)?;
    let run = pipeline::run_fit(&config)?;
    report_run(&config, &run)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let cohort = generate_cohort(&CohortConfig {
        n: args.n,
        seed: args.seed,
        missing_rate: args.missing_rate,
    })?;
    info!("generated synthetic cohort: n={}, seed={}", args.n, args.seed);

    if let Some(path) = &args.out {
        crate::io::write_data_table_csv(path, &cohort)?;
        println!("Wrote cohort to {}", path.display());
    }

    let data_path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("<synthetic cohort, seed {}>", args.seed)));
    let config = run_config(data_path, &args.formula, Some(args.exposure.clone()), &args.model)?;

    let ingest = IngestedTable {
        rows_read: cohort.n_rows(),
        table: cohort,
        dropped_columns: Vec::new(),
        row_errors: Vec::new(),
    };
    let run = pipeline::run_with_table(&config, ingest)?;
    report_run(&config, &run)
}

fn handle_chain(args: ChainArgs) -> Result<(), AppError> {
    let plan = pipeline::plan_only(&args.formula, args.exposure.as_deref())?;
    print!("{}", crate::report::format_chain(&plan));
    Ok(())
}

fn report_run(config: &RunConfig, run: &pipeline::RunOutput) -> Result<(), AppError> {
    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest, &run.plan, config)
    );
    println!("{}", crate::report::format_result_table(&run.table));

    if config.trajectory {
        if let Some(first) = run.plan.chain.first() {
            println!("{}", crate::report::format_trajectory(&run.table, first));
        }
    }

    if let (Some((outcome, len)), Some(diag)) = (&config.diagnostics, &run.diagnostics) {
        let title = format!("{outcome} with {len} predictor(s)");
        println!("{}", crate::report::format_diagnostics(&title, diag, 20));
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::write_results_csv(path, &run.table)?;
        println!("Wrote results to {}", path.display());
    }
    if let Some(path) = &config.export_json {
        let meta = RunMetadata::new(
            &config.formula,
            config.exposure.as_deref(),
            &run.plan.chain,
            config.engine,
            config.confidence.value(),
        );
        crate::io::write_results_json(path, meta, &run.table)?;
        println!("Wrote results JSON to {}", path.display());
    }

    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<RunConfig, AppError> {
    run_config(args.data.clone(), &args.formula, args.exposure.clone(), &args.model)
}

fn run_config(
    data_path: impl AsRef<Path>,
    formula: &str,
    exposure: Option<String>,
    model: &ModelArgs,
) -> Result<RunConfig, AppError> {
    Ok(RunConfig {
        data_path: data_path.as_ref().to_path_buf(),
        formula: formula.to_string(),
        exposure,
        engine: model.engine,
        confidence: ConfidenceLevel::new(model.level)?,
        parallel: !model.sequential,
        trajectory: !model.no_trajectory,
        diagnostics: model.diagnostics.clone(),
        export_results: model.export.clone(),
        export_json: model.export_json.clone(),
    })
}
