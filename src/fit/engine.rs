//! The regression primitive behind the sequential builder.
//!
//! An engine turns one [`Formula`] plus a [`DataTable`] into a [`FittedModel`].
//! The builder treats engines as black boxes, so anything implementing
//! [`RegressionEngine`] can be plugged in.

use nalgebra::DMatrix;

use crate::data::DataTable;
use crate::domain::{EngineKind, Family};
use crate::error::FitError;
use crate::fit::linear::LinearEngine;
use crate::fit::logistic::LogisticEngine;
use crate::formula::Formula;

/// Fits a single formula.
///
/// Engines must be pure: the same formula and data always give the same model.
/// They are shared across worker threads when the grid is fitted in parallel.
pub trait RegressionEngine: Send + Sync {
    fn name(&self) -> &str;
    fn fit(&self, formula: &Formula, data: &DataTable) -> Result<FittedModel, FitError>;
}

/// Result of one fit, holding what summaries and diagnostics need.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub formula: Formula,
    pub family: Family,
    /// Coefficient names, intercept first.
    pub terms: Vec<String>,
    pub coefficients: Vec<f64>,
    /// Scaled covariance of the coefficients (`dispersion * (X'WX)^-1`).
    pub covariance: DMatrix<f64>,
    /// Residual variance (Gaussian) or 1.0 (binomial).
    pub dispersion: f64,
    pub df_resid: usize,
    /// Observed response on the complete cases.
    pub observed: Vec<f64>,
    /// Fitted mean on the complete cases.
    pub fitted: Vec<f64>,
    /// Residual sum of squares (Gaussian) or deviance (binomial).
    pub deviance: f64,
    /// Solver iterations (1 for closed-form fits).
    pub iterations: usize,
}

impl FittedModel {
    pub fn n_obs(&self) -> usize {
        self.observed.len()
    }

    /// Standard error of each coefficient.
    pub fn std_errors(&self) -> Vec<f64> {
        (0..self.coefficients.len())
            .map(|i| self.covariance[(i, i)].max(0.0).sqrt())
            .collect()
    }

    /// Response residuals `y - μ`.
    pub fn residuals(&self) -> Vec<f64> {
        self.observed
            .iter()
            .zip(&self.fitted)
            .map(|(y, mu)| y - mu)
            .collect()
    }
}

/// Engine implementation for a built-in engine kind.
pub fn engine_for(kind: EngineKind) -> Box<dyn RegressionEngine> {
    match kind {
        EngineKind::Lm => Box::new(LinearEngine),
        EngineKind::Logit => Box::new(LogisticEngine::default()),
    }
}
