//! Model specifications and typed regression formulas.
//!
//! A specification like `"HF + LF ~ age + bmi + hba1c"` is parsed once into a
//! [`ModelSpec`] (ordered outcomes, ordered predictors). The formulas that are
//! actually fitted are then produced by [`formula_for`] as [`Formula`] values;
//! they are never re-parsed from strings.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Name of the intercept term in model summaries.
pub const INTERCEPT: &str = "(Intercept)";

/// Ordered outcome and predictor names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    outcomes: Vec<String>,
    predictors: Vec<String>,
}

impl ModelSpec {
    /// Build a specification, validating the role invariants.
    pub fn new(outcomes: Vec<String>, predictors: Vec<String>) -> Result<Self, ModelError> {
        if outcomes.is_empty() {
            return Err(ModelError::EmptySpec("no outcome variables".to_string()));
        }
        if predictors.is_empty() {
            return Err(ModelError::EmptySpec("no predictor variables".to_string()));
        }

        let mut seen = HashSet::new();
        for o in &outcomes {
            if !seen.insert(o.as_str()) {
                return Err(ModelError::DuplicateOutcome(o.clone()));
            }
        }

        let mut seen_pred = HashSet::new();
        for p in &predictors {
            if !seen_pred.insert(p.as_str()) {
                return Err(ModelError::DuplicatePredictor(p.clone()));
            }
            if seen.contains(p.as_str()) {
                return Err(ModelError::OverlappingRoles(p.clone()));
            }
        }

        Ok(Self {
            outcomes,
            predictors,
        })
    }

    /// Parse `"o1 + o2 ~ p1 + p2 + ..."`.
    ///
    /// Names may be wrapped in backticks to carry spaces (`` `rmssd ms` ``).
    pub fn parse(expr: &str) -> Result<Self, ModelError> {
        let mut sides = expr.split('~');
        let (Some(lhs), Some(rhs), None) = (sides.next(), sides.next(), sides.next()) else {
            return Err(ModelError::MalformedFormula(expr.to_string()));
        };

        let outcomes = split_terms(lhs);
        let predictors = split_terms(rhs);
        Self::new(outcomes, predictors)
    }

    pub fn outcomes(&self) -> &[String] {
        &self.outcomes
    }

    pub fn predictors(&self) -> &[String] {
        &self.predictors
    }

    /// Every variable the specification references (outcomes first).
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .chain(self.predictors.iter())
            .map(String::as_str)
    }

    /// Predictor order used for the sequential build.
    ///
    /// With an exposure, it is moved to the front and the remaining predictors
    /// keep their relative order.
    pub fn predictor_chain(&self, exposure: Option<&str>) -> Result<Vec<String>, ModelError> {
        let mut chain = self.predictors.clone();
        let Some(exposure) = exposure else {
            return Ok(chain);
        };

        let exposure = exposure.trim();
        let Some(pos) = chain.iter().position(|p| p == exposure) else {
            return Err(ModelError::InvalidExposure {
                exposure: exposure.to_string(),
                predictors: self.predictors.clone(),
            });
        };
        let x = chain.remove(pos);
        chain.insert(0, x);
        Ok(chain)
    }
}

/// A single-response regression formula: `response ~ p1 + p2 + ...`.
///
/// The intercept is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    pub response: String,
    pub predictors: Vec<String>,
}

impl Formula {
    /// Term names in coefficient order (intercept first).
    pub fn terms(&self) -> Vec<String> {
        std::iter::once(INTERCEPT.to_string())
            .chain(self.predictors.iter().cloned())
            .collect()
    }

    /// Every variable the formula reads (response first).
    pub fn variables(&self) -> Vec<&str> {
        std::iter::once(self.response.as_str())
            .chain(self.predictors.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ ", quote_name(&self.response))?;
        if self.predictors.is_empty() {
            return write!(f, "1");
        }
        for (i, p) in self.predictors.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{}", quote_name(p))?;
        }
        Ok(())
    }
}

/// Formula for `outcome` on the given predictor subset.
pub fn formula_for(outcome: &str, predictors: &[String]) -> Formula {
    Formula {
        response: outcome.to_string(),
        predictors: predictors.to_vec(),
    }
}

/// Split one side of a formula on `+`, skipping empty terms.
fn split_terms(side: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut in_backticks = false;

    for c in side.chars() {
        match c {
            '`' => in_backticks = !in_backticks,
            '+' if !in_backticks => {
                push_term(&mut terms, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_term(&mut terms, &current);
    terms
}

fn push_term(terms: &mut Vec<String>, raw: &str) {
    let term = raw.trim();
    if !term.is_empty() {
        terms.push(term.to_string());
    }
}

fn quote_name(name: &str) -> String {
    if name.chars().any(|c| c.is_whitespace() || c == '+' || c == '~') {
        format!("`{name}`")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_multi_outcome_formula() {
        let spec = ModelSpec::parse("HF + LF ~ age + bmi + hba1c").unwrap();
        assert_eq!(spec.outcomes(), &names(&["HF", "LF"])[..]);
        assert_eq!(spec.predictors(), &names(&["age", "bmi", "hba1c"])[..]);
    }

    #[test]
    fn backticked_names_keep_spaces() {
        let spec = ModelSpec::parse("`rmssd ms` ~ `body mass` + age").unwrap();
        assert_eq!(spec.outcomes(), &names(&["rmssd ms"])[..]);
        assert_eq!(spec.predictors(), &names(&["body mass", "age"])[..]);
    }

    #[test]
    fn missing_outcome_is_empty_spec() {
        let err = ModelSpec::parse("~ A + B").unwrap_err();
        assert!(matches!(err, ModelError::EmptySpec(_)), "{err:?}");
    }

    #[test]
    fn missing_predictors_is_empty_spec() {
        let err = ModelSpec::parse("Y ~ ").unwrap_err();
        assert!(matches!(err, ModelError::EmptySpec(_)), "{err:?}");
    }

    #[test]
    fn formula_without_tilde_is_malformed() {
        assert!(matches!(
            ModelSpec::parse("Y + A"),
            Err(ModelError::MalformedFormula(_))
        ));
        assert!(matches!(
            ModelSpec::parse("Y ~ A ~ B"),
            Err(ModelError::MalformedFormula(_))
        ));
    }

    #[test]
    fn duplicate_predictor_fails_fast() {
        assert_eq!(
            ModelSpec::parse("Y ~ A + B + A").unwrap_err(),
            ModelError::DuplicatePredictor("A".to_string())
        );
    }

    #[test]
    fn outcome_used_as_predictor_is_rejected() {
        assert_eq!(
            ModelSpec::parse("Y + Z ~ A + Z").unwrap_err(),
            ModelError::OverlappingRoles("Z".to_string())
        );
    }

    #[test]
    fn exposure_moves_to_front_and_keeps_order() {
        let spec = ModelSpec::parse("Y ~ a + b + x + c").unwrap();
        let chain = spec.predictor_chain(Some("x")).unwrap();
        assert_eq!(chain, names(&["x", "a", "b", "c"]));
        assert_eq!(spec.predictor_chain(None).unwrap(), names(&["a", "b", "x", "c"]));
    }

    #[test]
    fn unknown_exposure_is_invalid() {
        let spec = ModelSpec::parse("Y ~ A").unwrap();
        let err = spec.predictor_chain(Some("B")).unwrap_err();
        assert!(matches!(err, ModelError::InvalidExposure { ref exposure, .. } if exposure == "B"));
    }

    #[test]
    fn formula_display_and_terms() {
        let f = formula_for("HF", &names(&["bmi", "age"]));
        assert_eq!(f.to_string(), "HF ~ bmi + age");
        assert_eq!(f.terms(), names(&[INTERCEPT, "bmi", "age"]));
        assert_eq!(f.variables(), vec!["HF", "bmi", "age"]);

        let quoted = formula_for("rmssd ms", &names(&["age"]));
        assert_eq!(quoted.to_string(), "`rmssd ms` ~ age");
    }
}
