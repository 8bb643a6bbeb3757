//! Weighted least squares solver.
//!
//! Every model in the sequential grid ends up as one (or, for IRLS, a few)
//! problems of the form:
//!
//! ```text
//! minimize Σ w_i (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - We scale rows by `sqrt(w_i)` and solve an ordinary least squares problem.
//! - We use SVD so that tall design matrices are handled directly and the
//!   numerical rank is available to reject collinear designs instead of
//!   returning arbitrary minimum-norm coefficients.
//! - `(X'WX)^-1 = V Σ^-2 V'` falls out of the same decomposition and is what
//!   the engines scale into coefficient covariances.

use nalgebra::{DMatrix, DVector};

use crate::error::FitError;

/// Singular values below `RANK_TOL * s_max` count as zero.
const RANK_TOL: f64 = 1e-10;

/// Solution of a (weighted) least squares problem.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub beta: DVector<f64>,
    /// `(X'WX)^-1`, unscaled by any dispersion.
    pub xtwx_inv: DMatrix<f64>,
}

/// Solve an (optionally weighted) least squares problem.
///
/// Requires `n > p` so that a residual variance can be estimated, and a design
/// with full column rank.
pub fn weighted_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    weights: Option<&DVector<f64>>,
) -> Result<LeastSquares, FitError> {
    let (n, p) = x.shape();
    if n <= p {
        return Err(FitError::TooFewObservations { n, p });
    }

    let mut xw = x.clone();
    let mut yw = y.clone();
    if let Some(w) = weights {
        for i in 0..n {
            let sw = w[i].sqrt();
            xw.row_mut(i).scale_mut(sw);
            yw[i] *= sw;
        }
    }

    let svd = xw.svd(true, true);
    let s_max = svd.singular_values.max();
    if !(s_max.is_finite() && s_max > 0.0) {
        return Err(FitError::RankDeficient { rank: 0, columns: p });
    }

    let eps = RANK_TOL * s_max;
    let rank = svd.singular_values.iter().filter(|&&s| s > eps).count();
    if rank < p {
        return Err(FitError::RankDeficient { rank, columns: p });
    }

    let beta = svd
        .solve(&yw, eps)
        .map_err(|_| FitError::RankDeficient { rank, columns: p })?;
    if beta.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }

    let Some(v_t) = svd.v_t.as_ref() else {
        return Err(FitError::NonFinite);
    };
    let inv_sq = DVector::from_iterator(p, svd.singular_values.iter().map(|s| 1.0 / (s * s)));
    let xtwx_inv = v_t.transpose() * DMatrix::from_diagonal(&inv_sq) * v_t;

    Ok(LeastSquares { beta, xtwx_inv })
}
