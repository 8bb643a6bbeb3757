//! Logistic regression engine (`logit`), fitted by IRLS.
//!
//! Each iteration linearizes the logit link around the current means:
//!
//! ```text
//! w_i = μ_i (1 - μ_i)
//! z_i = η_i + (y_i - μ_i) / w_i
//! β   = argmin Σ w_i (z_i - x_i^T β)^2
//! ```
//!
//! and stops once the relative change in deviance drops below `tolerance`.
//! The dispersion is fixed at 1, so `(X'WX)^-1` at the final weights is the
//! coefficient covariance.

use log::{debug, trace};
use nalgebra::DVector;

use crate::data::DataTable;
use crate::domain::Family;
use crate::error::FitError;
use crate::fit::engine::{FittedModel, RegressionEngine};
use crate::formula::Formula;
use crate::math::weighted_least_squares;
use crate::models::build_design;

/// Means are kept inside `(MU_EPS, 1 - MU_EPS)`.
const MU_EPS: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct LogisticEngine {
    pub max_iterations: usize,
    /// Convergence threshold on `|dev - dev_old| / (|dev| + 0.1)`.
    pub tolerance: f64,
}

impl Default for LogisticEngine {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1e-8,
        }
    }
}

impl RegressionEngine for LogisticEngine {
    fn name(&self) -> &str {
        "logit"
    }

    fn fit(&self, formula: &Formula, data: &DataTable) -> Result<FittedModel, FitError> {
        let design = build_design(formula, data)?;
        let (n, p) = design.x.shape();
        if n <= p {
            return Err(FitError::TooFewObservations { n, p });
        }
        if let Some(&bad) = design.y.iter().find(|&&v| v != 0.0 && v != 1.0) {
            return Err(FitError::NonBinaryResponse { value: bad });
        }

        let y = &design.y;
        let mut mu = y.map(|yi| (yi + 0.5) / 2.0);
        let mut eta = mu.map(logit);
        let mut dev_old = deviance(y, &mu);

        for iter in 1..=self.max_iterations {
            let w = mu.map(|m| (m * (1.0 - m)).max(MU_EPS));
            let z = DVector::from_iterator(n, (0..n).map(|i| eta[i] + (y[i] - mu[i]) / w[i]));

            let ls = weighted_least_squares(&design.x, &z, Some(&w))?;
            eta = &design.x * &ls.beta;
            mu = eta.map(|e| logistic(e).clamp(MU_EPS, 1.0 - MU_EPS));
            let dev = deviance(y, &mu);
            if !dev.is_finite() {
                return Err(FitError::NonFinite);
            }
            trace!("logit {formula}: iter={iter} deviance={dev:.8}");

            if (dev - dev_old).abs() / (dev.abs() + 0.1) < self.tolerance {
                debug!("logit {formula}: converged after {iter} iterations");
                // Covariance at the converged weights.
                let w_final = mu.map(|m| (m * (1.0 - m)).max(MU_EPS));
                let final_ls = weighted_least_squares(&design.x, &z, Some(&w_final))?;
                return Ok(FittedModel {
                    formula: formula.clone(),
                    family: Family::Binomial,
                    terms: design.terms,
                    coefficients: ls.beta.iter().copied().collect(),
                    covariance: final_ls.xtwx_inv,
                    dispersion: 1.0,
                    df_resid: n - p,
                    observed: y.iter().copied().collect(),
                    fitted: mu.iter().copied().collect(),
                    deviance: dev,
                    iterations: iter,
                });
            }
            dev_old = dev;
        }

        Err(FitError::NotConverged {
            iterations: self.max_iterations,
        })
    }
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

fn logistic(eta: f64) -> f64 {
    1.0 / (1.0 + (-eta).exp())
}

fn deviance(y: &DVector<f64>, mu: &DVector<f64>) -> f64 {
    -2.0 * y
        .iter()
        .zip(mu.iter())
        .map(|(&yi, &m)| if yi == 1.0 { m.ln() } else { (1.0 - m).ln() })
        .sum::<f64>()
}
