//! Command-line parsing for the sequential model builder.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! modeling code. Conversion into a [`RunConfig`](crate::domain::RunConfig)
//! happens in `app`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::EngineKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "seqmod",
    version,
    about = "Sequential regression models: one outcome, an increasing chain of covariates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit every (outcome, chain length) model on a CSV file and print the tidy table.
    Fit(FitArgs),
    /// Generate a synthetic HRV cohort and run the demo build on it.
    Demo(DemoArgs),
    /// Print the predictor chain and every formula without fitting anything.
    Chain(ChainArgs),
}

/// Options shared by every command that fits models.
#[derive(Debug, Parser, Clone)]
pub struct ModelArgs {
    /// Regression engine.
    #[arg(long, value_enum, env = "SEQMOD_ENGINE", default_value_t = EngineKind::Lm)]
    pub engine: EngineKind,

    /// Confidence level for coefficient intervals.
    #[arg(long, env = "SEQMOD_LEVEL", default_value_t = 0.95)]
    pub level: f64,

    /// Fit models one after another instead of on the thread pool.
    #[arg(long)]
    pub sequential: bool,

    /// Skip the exposure trajectory printed after the table.
    #[arg(long)]
    pub no_trajectory: bool,

    /// Diagnostics for one model, as `OUTCOME:CHAIN_LEN` (e.g. `HF:3`).
    #[arg(long, value_name = "OUTCOME:LEN", value_parser = parse_grid_cell)]
    pub diagnostics: Option<(String, usize)>,

    /// Export the tidy table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the tidy table plus run metadata to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Input CSV with one numeric column per variable.
    #[arg(short = 'd', long, value_name = "CSV")]
    pub data: PathBuf,

    /// Model formula, e.g. `HF + LF ~ age + bmi + hba1c`.
    #[arg(short = 'f', long)]
    pub formula: String,

    /// Predictor to force into first position of every chain.
    #[arg(short = 'x', long)]
    pub exposure: Option<String>,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Cohort size.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub n: usize,

    /// Random seed for cohort generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of `hba1c` values to blank out.
    #[arg(long, default_value_t = 0.0)]
    pub missing_rate: f64,

    /// Write the generated cohort to CSV.
    #[arg(long, value_name = "CSV")]
    pub out: Option<PathBuf>,

    /// Formula for the demo build.
    #[arg(short = 'f', long, default_value = "HF + LF ~ age + bmi + hba1c")]
    pub formula: String,

    /// Exposure for the demo build.
    #[arg(short = 'x', long, default_value = "bmi")]
    pub exposure: String,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct ChainArgs {
    /// Model formula.
    #[arg(short = 'f', long)]
    pub formula: String,

    /// Predictor to force into first position.
    #[arg(short = 'x', long)]
    pub exposure: Option<String>,
}

/// Parse `OUTCOME:CHAIN_LEN`. The outcome may itself contain `:`.
pub fn parse_grid_cell(s: &str) -> Result<(String, usize), String> {
    let (outcome, len) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected OUTCOME:CHAIN_LEN, got `{s}`"))?;
    let outcome = outcome.trim();
    if outcome.is_empty() {
        return Err("outcome name is empty".to_string());
    }
    let len: usize = len
        .trim()
        .parse()
        .map_err(|_| format!("chain length `{len}` is not a positive integer"))?;
    if len == 0 {
        return Err("chain length must be >= 1".to_string());
    }
    Ok((outcome.to_string(), len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_command_parses() {
        let cli = Cli::try_parse_from([
            "seqmod",
            "fit",
            "--data",
            "cohort.csv",
            "--formula",
            "HF ~ age + bmi",
            "--exposure",
            "bmi",
            "--engine",
            "logit",
            "--diagnostics",
            "HF:2",
        ])
        .unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.exposure.as_deref(), Some("bmi"));
        assert_eq!(args.model.engine, EngineKind::Logit);
        assert_eq!(args.model.diagnostics, Some(("HF".to_string(), 2)));
        assert!(!args.model.sequential);
    }

    #[test]
    fn demo_defaults() {
        let cli = Cli::try_parse_from(["seqmod", "demo"]).unwrap();
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(args.n, 200);
        assert_eq!(args.seed, 42);
        assert_eq!(args.exposure, "bmi");
        assert!(args.out.is_none());
    }

    #[test]
    fn grid_cell_parsing() {
        assert_eq!(parse_grid_cell("LF:3"), Ok(("LF".to_string(), 3)));
        assert_eq!(parse_grid_cell("a:b:1"), Ok(("a:b".to_string(), 1)));
        assert!(parse_grid_cell("LF").is_err());
        assert!(parse_grid_cell("LF:0").is_err());
        assert!(parse_grid_cell(":2").is_err());
    }
}
