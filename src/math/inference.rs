//! Reference distributions for Wald-type inference on coefficients.
//!
//! Gaussian models use Student's t with the residual degrees of freedom;
//! binomial models (dispersion fixed at 1) use the standard normal.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Beyond this many degrees of freedom the t and normal quantiles agree to
/// well below reporting precision.
const NORMAL_APPROX_DF: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reference {
    StudentT { df: f64 },
    Normal,
}

/// Two-sided critical value for the given confidence level.
///
/// Returns NaN when the distribution cannot be constructed (e.g. `df <= 0`).
pub fn critical_value(reference: Reference, level: f64) -> f64 {
    let q = 1.0 - (1.0 - level) / 2.0;
    match resolve(reference) {
        Resolved::T(t) => t.inverse_cdf(q),
        Resolved::Z(z) => z.inverse_cdf(q),
        Resolved::Invalid => f64::NAN,
    }
}

/// Two-sided p-value for a test statistic.
pub fn two_sided_pvalue(statistic: f64, reference: Reference) -> f64 {
    if !statistic.is_finite() {
        return f64::NAN;
    }
    let a = statistic.abs();
    match resolve(reference) {
        Resolved::T(t) => 2.0 * (1.0 - t.cdf(a)),
        Resolved::Z(z) => 2.0 * (1.0 - z.cdf(a)),
        Resolved::Invalid => f64::NAN,
    }
}

/// `(estimate - c*se, estimate + c*se)` for the two-sided critical value `c`.
pub fn confidence_interval(estimate: f64, std_error: f64, reference: Reference, level: f64) -> (f64, f64) {
    if !estimate.is_finite() || !std_error.is_finite() || std_error < 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let margin = critical_value(reference, level) * std_error;
    (estimate - margin, estimate + margin)
}

/// Standard normal quantile (used for QQ coordinates).
pub fn normal_quantile(p: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(z) if p > 0.0 && p < 1.0 => z.inverse_cdf(p),
        _ => f64::NAN,
    }
}

enum Resolved {
    T(StudentsT),
    Z(Normal),
    Invalid,
}

fn resolve(reference: Reference) -> Resolved {
    let reference = match reference {
        Reference::StudentT { df } if df > NORMAL_APPROX_DF => Reference::Normal,
        other => other,
    };
    match reference {
        Reference::StudentT { df } if df > 0.0 => match StudentsT::new(0.0, 1.0, df) {
            Ok(t) => Resolved::T(t),
            Err(_) => Resolved::Invalid,
        },
        Reference::StudentT { .. } => Resolved::Invalid,
        Reference::Normal => match Normal::new(0.0, 1.0) {
            Ok(z) => Resolved::Z(z),
            Err(_) => Resolved::Invalid,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn normal_critical_value_95() {
        assert_abs_diff_eq!(critical_value(Reference::Normal, 0.95), 1.959964, epsilon = 1e-5);
    }

    #[test]
    fn t_critical_value_small_df() {
        // qt(0.975, 10) = 2.228139
        let c = critical_value(Reference::StudentT { df: 10.0 }, 0.95);
        assert_abs_diff_eq!(c, 2.228139, epsilon = 1e-4);
    }

    #[test]
    fn pvalue_symmetric_and_bounded() {
        let r = Reference::StudentT { df: 20.0 };
        assert_abs_diff_eq!(two_sided_pvalue(2.0, r), two_sided_pvalue(-2.0, r), epsilon = 1e-12);
        assert_abs_diff_eq!(two_sided_pvalue(0.0, r), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(two_sided_pvalue(1.96, Reference::Normal), 0.05, epsilon = 1e-3);
    }

    #[test]
    fn interval_is_centered_on_estimate() {
        let (lo, hi) = confidence_interval(1.0, 0.5, Reference::Normal, 0.95);
        assert_abs_diff_eq!(lo, 1.0 - 1.959964 * 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(hi, 1.0 + 1.959964 * 0.5, epsilon = 1e-4);
    }

    #[test]
    fn invalid_df_gives_nan() {
        assert!(critical_value(Reference::StudentT { df: 0.0 }, 0.95).is_nan());
    }

    #[test]
    fn quantile_median_is_zero() {
        assert_abs_diff_eq!(normal_quantile(0.5), 0.0, epsilon = 1e-9);
        assert!(normal_quantile(0.0).is_nan());
    }
}
