//! Ordinary least squares engine (`lm`).

use log::trace;

use crate::data::DataTable;
use crate::domain::Family;
use crate::error::FitError;
use crate::fit::engine::{FittedModel, RegressionEngine};
use crate::formula::Formula;
use crate::math::weighted_least_squares;
use crate::models::build_design;

#[derive(Debug, Clone, Copy, Default)]
pub struct LinearEngine;

impl RegressionEngine for LinearEngine {
    fn name(&self) -> &str {
        "lm"
    }

    fn fit(&self, formula: &Formula, data: &DataTable) -> Result<FittedModel, FitError> {
        let design = build_design(formula, data)?;
        let (n, p) = design.x.shape();
        let ls = weighted_least_squares(&design.x, &design.y, None)?;

        let fitted = &design.x * &ls.beta;
        let sse: f64 = design
            .y
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| (y - f) * (y - f))
            .sum();
        let df_resid = n - p;
        let sigma2 = sse / df_resid as f64;
        if !sigma2.is_finite() {
            return Err(FitError::NonFinite);
        }
        trace!("lm {formula}: n={n} sse={sse:.6} sigma2={sigma2:.6}");

        Ok(FittedModel {
            formula: formula.clone(),
            family: Family::Gaussian,
            terms: design.terms,
            coefficients: ls.beta.iter().copied().collect(),
            covariance: ls.xtwx_inv * sigma2,
            dispersion: sigma2,
            df_resid,
            observed: design.y.iter().copied().collect(),
            fitted: fitted.iter().copied().collect(),
            deviance: sse,
            iterations: 1,
        })
    }
}
