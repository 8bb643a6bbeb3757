//! Plot-ready residual diagnostics for a fitted model.
//!
//! Rendering is left to the caller; this module produces the tables a
//! residual plot is drawn from. Layout depends on the model family, which is
//! resolved once into a [`DiagnosticKind`]:
//!
//! - Gaussian: residuals vs fitted, with normal QQ coordinates
//! - Binomial: binned residuals (mean fitted probability vs mean residual)
//!
//! Families without a layout fail up front with `UnsupportedFamily`.

use serde::Serialize;

use crate::domain::Family;
use crate::error::ModelError;
use crate::fit::FittedModel;
use crate::math::normal_quantile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Gaussian,
    Binomial,
    Unsupported,
}

impl DiagnosticKind {
    pub fn resolve(family: &Family) -> Self {
        match family {
            Family::Gaussian => DiagnosticKind::Gaussian,
            Family::Binomial => DiagnosticKind::Binomial,
            Family::Other(_) => DiagnosticKind::Unsupported,
        }
    }
}

/// Per-observation fit output (the "augmented" data).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AugmentedRow {
    pub observed: f64,
    pub fitted: f64,
    pub residual: f64,
    /// `residual / sigma` (Gaussian) or the Pearson residual (binomial).
    pub std_residual: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QqPoint {
    pub fitted: f64,
    pub std_residual: f64,
    /// Normal quantile matching this residual's rank.
    pub theoretical: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualBin {
    pub n: usize,
    pub mean_fitted: f64,
    pub mean_residual: f64,
    /// ±2 standard-error band for the mean residual at `mean_fitted`.
    pub bound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "points", rename_all = "lowercase")]
pub enum DiagnosticTable {
    Gaussian(Vec<QqPoint>),
    Binomial(Vec<ResidualBin>),
}

/// Observed, fitted and residual values for every observation used in the fit.
pub fn augment(model: &FittedModel) -> Vec<AugmentedRow> {
    let sigma = model.dispersion.sqrt();
    model
        .observed
        .iter()
        .zip(&model.fitted)
        .map(|(&observed, &fitted)| {
            let residual = observed - fitted;
            let std_residual = match model.family {
                Family::Binomial => residual / (fitted * (1.0 - fitted)).sqrt(),
                _ => residual / sigma,
            };
            AugmentedRow {
                observed,
                fitted,
                residual,
                std_residual,
            }
        })
        .collect()
}

/// Family-specific diagnostic table for `model`.
pub fn diagnostic_table(model: &FittedModel) -> Result<DiagnosticTable, ModelError> {
    match DiagnosticKind::resolve(&model.family) {
        DiagnosticKind::Gaussian => Ok(DiagnosticTable::Gaussian(qq_points(&augment(model)))),
        DiagnosticKind::Binomial => Ok(DiagnosticTable::Binomial(binned_residuals(&augment(model)))),
        DiagnosticKind::Unsupported => Err(ModelError::UnsupportedFamily(
            model.family.display_name().to_string(),
        )),
    }
}

fn qq_points(rows: &[AugmentedRow]) -> Vec<QqPoint> {
    let n = rows.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| rows[a].std_residual.total_cmp(&rows[b].std_residual));

    let mut rank = vec![0usize; n];
    for (r, &i) in order.iter().enumerate() {
        rank[i] = r;
    }

    rows.iter()
        .zip(rank)
        .map(|(row, r)| QqPoint {
            fitted: row.fitted,
            std_residual: row.std_residual,
            theoretical: normal_quantile(plotting_position(r + 1, n)),
        })
        .collect()
}

/// Blom-type plotting positions: `(i - a) / (n + 1 - 2a)` with `a = 3/8` for
/// `n <= 10`, else `a = 1/2`.
fn plotting_position(i: usize, n: usize) -> f64 {
    let a = if n <= 10 { 0.375 } else { 0.5 };
    (i as f64 - a) / (n as f64 + 1.0 - 2.0 * a)
}

/// Number of bins for a binned-residual table of `n` observations.
fn bin_count(n: usize) -> usize {
    if n >= 100 {
        (n as f64).sqrt().floor() as usize
    } else if n > 10 {
        10
    } else {
        (n / 2).max(1)
    }
}

fn binned_residuals(rows: &[AugmentedRow]) -> Vec<ResidualBin> {
    if rows.is_empty() {
        return Vec::new();
    }
    let mut sorted: Vec<&AugmentedRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.fitted.total_cmp(&b.fitted));

    let n = sorted.len();
    let bins = bin_count(n);
    (0..bins)
        .filter_map(|b| {
            let start = b * n / bins;
            let end = (b + 1) * n / bins;
            let chunk = &sorted[start..end];
            if chunk.is_empty() {
                return None;
            }
            let k = chunk.len() as f64;
            let mean_fitted = chunk.iter().map(|r| r.fitted).sum::<f64>() / k;
            let mean_residual = chunk.iter().map(|r| r.residual).sum::<f64>() / k;
            Some(ResidualBin {
                n: chunk.len(),
                mean_fitted,
                mean_residual,
                bound: 2.0 * (mean_fitted * (1.0 - mean_fitted) / k).sqrt(),
            })
        })
        .collect()
}
