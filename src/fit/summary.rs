//! Coefficient summaries (term, estimate, standard error, interval).

use crate::domain::{ConfidenceLevel, Family, TermEstimate};
use crate::fit::engine::FittedModel;
use crate::math::{Reference, confidence_interval, two_sided_pvalue};

/// Reference distribution for Wald inference on a model's coefficients.
///
/// Models with an estimated dispersion use t on the residual degrees of
/// freedom; models with a fixed dispersion use the normal.
pub fn reference_for(model: &FittedModel) -> Reference {
    match model.family {
        Family::Binomial => Reference::Normal,
        Family::Gaussian | Family::Other(_) => Reference::StudentT {
            df: model.df_resid as f64,
        },
    }
}

/// One [`TermEstimate`] per coefficient, in fit order (intercept first).
pub fn summarize(model: &FittedModel, level: ConfidenceLevel) -> Vec<TermEstimate> {
    let reference = reference_for(model);
    model
        .terms
        .iter()
        .zip(&model.coefficients)
        .zip(model.std_errors())
        .map(|((term, &estimate), std_error)| {
            let statistic = estimate / std_error;
            let (conf_low, conf_high) = confidence_interval(estimate, std_error, reference, level.value());
            TermEstimate {
                term: term.clone(),
                estimate,
                std_error,
                statistic,
                p_value: two_sided_pvalue(statistic, reference),
                conf_low,
                conf_high,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataTable;
    use crate::fit::engine::RegressionEngine;
    use crate::fit::linear::LinearEngine;
    use crate::formula::{INTERCEPT, formula_for};
    use crate::math::critical_value;
    use approx::assert_abs_diff_eq;

    fn small_fit() -> FittedModel {
        let data = DataTable::from_columns([
            ("y", vec![1.1, 2.3, 2.9, 4.2, 4.8, 6.1, 7.2]),
            ("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]),
            ("z", vec![0.5, 0.1, 0.9, 0.3, 0.7, 0.2, 0.4]),
        ])
        .unwrap();
        LinearEngine
            .fit(&formula_for("y", &["x".to_string(), "z".to_string()]), &data)
            .unwrap()
    }

    #[test]
    fn rows_follow_fit_order() {
        let fit = small_fit();
        let rows = summarize(&fit, ConfidenceLevel::default());
        let terms: Vec<&str> = rows.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec![INTERCEPT, "x", "z"]);
    }

    #[test]
    fn interval_uses_t_on_residual_df() {
        let fit = small_fit();
        let level = ConfidenceLevel::new(0.9).unwrap();
        let rows = summarize(&fit, level);
        let c = critical_value(Reference::StudentT { df: 4.0 }, 0.9);
        for r in &rows {
            assert_abs_diff_eq!(r.conf_high - r.estimate, c * r.std_error, epsilon = 1e-10);
            assert_abs_diff_eq!(r.estimate - r.conf_low, c * r.std_error, epsilon = 1e-10);
            assert_abs_diff_eq!(r.statistic, r.estimate / r.std_error, epsilon = 1e-12);
            assert!(r.p_value >= 0.0 && r.p_value <= 1.0);
        }
    }

    #[test]
    fn wider_level_gives_wider_interval() {
        let fit = small_fit();
        let narrow = summarize(&fit, ConfidenceLevel::new(0.8).unwrap());
        let wide = summarize(&fit, ConfidenceLevel::new(0.99).unwrap());
        for (n, w) in narrow.iter().zip(&wide) {
            assert!(w.conf_high - w.conf_low > n.conf_high - n.conf_low);
        }
    }
}
