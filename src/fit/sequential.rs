//! Sequential model building.
//!
//! For every outcome, fit the chain of nested models
//!
//! ```text
//! o ~ p1
//! o ~ p1 + p2
//! ...
//! o ~ p1 + ... + pk
//! ```
//!
//! where `p1` is the exposure (when one is given), and stack every model's
//! coefficient summary into one tidy table.
//!
//! The grid is planned up front as a list of [`GridCell`]s in canonical order
//! (outcomes in formula order, then increasing chain length). Each cell is fitted
//! independently, optionally in parallel, and the per-cell rows are concatenated
//! in plan order, so the output never depends on scheduling.

use log::{debug, info};
use rayon::prelude::*;

use crate::data::DataTable;
use crate::domain::{ConfidenceLevel, EngineKind, ResultRow, ResultTable};
use crate::error::ModelError;
use crate::fit::engine::{FittedModel, RegressionEngine, engine_for};
use crate::fit::summary::summarize;
use crate::formula::{Formula, ModelSpec, formula_for};

/// One model of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub outcome: String,
    /// Number of predictors (`1..=chain.len()`).
    pub chain_length: usize,
    pub formula: Formula,
}

/// Predictor chain plus every model to fit, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPlan {
    pub chain: Vec<String>,
    pub cells: Vec<GridCell>,
}

impl ModelPlan {
    pub fn new(spec: &ModelSpec, exposure: Option<&str>) -> Result<Self, ModelError> {
        let chain = spec.predictor_chain(exposure)?;
        let cells = spec
            .outcomes()
            .iter()
            .flat_map(|outcome| {
                (1..=chain.len()).map(|j| GridCell {
                    outcome: outcome.clone(),
                    chain_length: j,
                    formula: formula_for(outcome, &chain[..j]),
                })
            })
            .collect();
        Ok(Self { chain, cells })
    }
}

/// Configurable sequential builder.
pub struct SequentialBuilder {
    engine: Box<dyn RegressionEngine>,
    level: ConfidenceLevel,
    parallel: bool,
}

impl SequentialBuilder {
    pub fn new(kind: EngineKind) -> Self {
        Self::with_engine(engine_for(kind))
    }

    /// Use a custom regression primitive.
    pub fn with_engine(engine: Box<dyn RegressionEngine>) -> Self {
        Self {
            engine,
            level: ConfidenceLevel::default(),
            parallel: false,
        }
    }

    pub fn confidence_level(mut self, level: ConfidenceLevel) -> Self {
        self.level = level;
        self
    }

    /// Fit grid cells on the rayon pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fit every model of `spec` against `data` and return the tidy table.
    ///
    /// Fails on the first cell (in plan order) that cannot be fitted; no
    /// partial table is returned.
    pub fn build(
        &self,
        spec: &ModelSpec,
        data: &DataTable,
        exposure: Option<&str>,
    ) -> Result<ResultTable, ModelError> {
        let plan = ModelPlan::new(spec, exposure)?;
        check_columns(spec, data)?;

        info!(
            "building {} models ({} outcome(s) x {} predictor(s)) with engine `{}`",
            plan.cells.len(),
            spec.outcomes().len(),
            plan.chain.len(),
            self.engine.name()
        );
        debug!("predictor chain: {}", plan.chain.join(" -> "));

        let per_cell: Vec<Result<Vec<ResultRow>, ModelError>> = if self.parallel {
            plan.cells.par_iter().map(|cell| self.summarize_cell(cell, data)).collect()
        } else {
            plan.cells.iter().map(|cell| self.summarize_cell(cell, data)).collect()
        };

        let mut rows = Vec::new();
        for cell_rows in per_cell {
            rows.extend(cell_rows?);
        }
        Ok(ResultTable::from_rows(rows))
    }

    /// Fit a single cell, attaching the grid position to any failure.
    pub fn fit_cell(&self, cell: &GridCell, data: &DataTable) -> Result<FittedModel, ModelError> {
        self.engine
            .fit(&cell.formula, data)
            .map_err(|reason| ModelError::FitFailure {
                outcome: cell.outcome.clone(),
                chain_length: cell.chain_length,
                reason,
            })
    }

    fn summarize_cell(&self, cell: &GridCell, data: &DataTable) -> Result<Vec<ResultRow>, ModelError> {
        let model = self.fit_cell(cell, data)?;
        debug!("fitted {} (n={})", cell.formula, model.n_obs());
        let n_obs = model.n_obs();
        Ok(summarize(&model, self.level)
            .into_iter()
            .map(|est| ResultRow::from_estimate(&cell.outcome, cell.chain_length, n_obs, est))
            .collect())
    }
}

/// Build sequential models from a formula expression.
///
/// `engine` names the regression primitive (`"lm"` or `"logit"`); results use
/// 95% confidence intervals.
pub fn build_sequential_models(
    formula_expr: &str,
    data: &DataTable,
    exposure: Option<&str>,
    engine: &str,
) -> Result<ResultTable, ModelError> {
    let kind = EngineKind::from_name(engine)?;
    let spec = ModelSpec::parse(formula_expr)?;
    SequentialBuilder::new(kind).build(&spec, data, exposure)
}

fn check_columns(spec: &ModelSpec, data: &DataTable) -> Result<(), ModelError> {
    match spec.variables().find(|v| !data.has_column(v)) {
        Some(missing) => Err(ModelError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}
