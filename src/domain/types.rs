//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the builder, the engines and the report layer
//! - exported to CSV/JSON
//! - compared in tests (a build is a pure function of its inputs)

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Which regression primitive fits each model of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Ordinary least squares (Gaussian family, identity link).
    Lm,
    /// Logistic regression (binomial family, logit link) fitted by IRLS.
    Logit,
}

impl EngineKind {
    /// Resolve an engine by name.
    ///
    /// Accepts `lm`/`ols` and `logit`/`glm-binomial` (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, ModelError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lm" | "ols" => Ok(EngineKind::Lm),
            "logit" | "glm-binomial" => Ok(EngineKind::Logit),
            _ => Err(ModelError::UnsupportedEngine(name.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EngineKind::Lm => "lm",
            EngineKind::Logit => "logit",
        }
    }

    pub fn family(self) -> Family {
        match self {
            EngineKind::Lm => Family::Gaussian,
            EngineKind::Logit => Family::Binomial,
        }
    }
}

/// Distribution family of a fitted model.
///
/// Fixed when the model is fitted; downstream consumers (summaries,
/// diagnostics) dispatch on it instead of inspecting the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Gaussian,
    Binomial,
    /// Produced by engines outside this crate.
    Other(String),
}

impl Family {
    pub fn display_name(&self) -> &str {
        match self {
            Family::Gaussian => "gaussian",
            Family::Binomial => "binomial",
            Family::Other(name) => name,
        }
    }
}

/// A confidence level strictly inside `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
    pub fn new(level: f64) -> Result<Self, ModelError> {
        if level.is_finite() && level > 0.0 && level < 1.0 {
            Ok(Self(level))
        } else {
            Err(ModelError::InvalidConfidence(level))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self(0.95)
    }
}

/// Coefficient statistics for one term of one fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermEstimate {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    /// t statistic (Gaussian) or z statistic (binomial).
    pub statistic: f64,
    pub p_value: f64,
    pub conf_low: f64,
    pub conf_high: f64,
}

/// One row of the tidy result table: a term of the model fitted for
/// `outcome` with `covar` predictors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub outcome: String,
    /// Number of predictors in the model (the chain length).
    pub covar: usize,
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    pub statistic: f64,
    pub p_value: f64,
    pub conf_low: f64,
    pub conf_high: f64,
    /// Complete observations used by this model.
    pub n_obs: usize,
}

impl ResultRow {
    pub fn from_estimate(outcome: &str, covar: usize, n_obs: usize, est: TermEstimate) -> Self {
        Self {
            outcome: outcome.to_string(),
            covar,
            term: est.term,
            estimate: est.estimate,
            std_error: est.std_error,
            statistic: est.statistic,
            p_value: est.p_value,
            conf_low: est.conf_low,
            conf_high: est.conf_high,
            n_obs,
        }
    }
}

/// All models of a sequential build, in canonical order:
/// outcomes in formula order, then increasing predictor count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn from_rows(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct `(outcome, covar)` pairs in table order.
    pub fn model_keys(&self) -> Vec<(String, usize)> {
        let mut keys: Vec<(String, usize)> = Vec::new();
        for row in &self.rows {
            let is_new = keys
                .last()
                .is_none_or(|(o, c)| o != &row.outcome || *c != row.covar);
            if is_new {
                keys.push((row.outcome.clone(), row.covar));
            }
        }
        keys
    }

    /// Rows of the model for `outcome` with `covar` predictors.
    pub fn model(&self, outcome: &str, covar: usize) -> Vec<&ResultRow> {
        self.rows
            .iter()
            .filter(|r| r.outcome == outcome && r.covar == covar)
            .collect()
    }

    /// Rows for a single term across every model, in table order.
    ///
    /// For the exposure this is how its estimate moves as covariates are added.
    pub fn term_trajectory(&self, term: &str) -> Vec<&ResultRow> {
        self.rows.iter().filter(|r| r.term == term).collect()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_path: PathBuf,
    pub formula: String,
    pub exposure: Option<String>,
    pub engine: EngineKind,
    pub confidence: ConfidenceLevel,
    pub parallel: bool,

    /// Print the exposure trajectory after the table.
    pub trajectory: bool,
    /// Grid cell (`outcome`, chain length) to produce diagnostics for.
    pub diagnostics: Option<(String, usize)>,

    pub export_results: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
