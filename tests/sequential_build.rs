use approx::assert_abs_diff_eq;

use hrv_seqmodels::data::{CohortConfig, generate_cohort};
use hrv_seqmodels::{
    ConfidenceLevel, DataTable, EngineKind, FitError, ModelError, ModelSpec, SequentialBuilder,
    build_sequential_models,
};

fn cohort() -> DataTable {
    generate_cohort(&CohortConfig::default()).unwrap()
}

#[test]
fn fits_every_outcome_and_chain_length() {
    let _ = pretty_env_logger::try_init();
    let data = cohort();
    let table = build_sequential_models("HF + LF ~ age + bmi + hba1c", &data, Some("bmi"), "lm").unwrap();

    let keys = table.model_keys();
    assert_eq!(keys.len(), 2 * 3);
    assert_eq!(
        keys,
        vec![
            ("HF".to_string(), 1),
            ("HF".to_string(), 2),
            ("HF".to_string(), 3),
            ("LF".to_string(), 1),
            ("LF".to_string(), 2),
            ("LF".to_string(), 3),
        ]
    );

    // covar is the predictor count; the model has covar + 1 terms.
    for (outcome, covar) in &keys {
        let rows = table.model(outcome, *covar);
        assert_eq!(rows.len(), covar + 1);
        assert_eq!(rows[0].term, "(Intercept)");
        assert_eq!(rows[1].term, "bmi");
    }
    let terms: Vec<&str> = table.model("HF", 3).iter().map(|r| r.term.as_str()).collect();
    assert_eq!(terms, vec!["(Intercept)", "bmi", "age", "hba1c"]);
}

#[test]
fn builds_are_idempotent_and_schedule_independent() {
    let data = cohort();
    let spec = ModelSpec::parse("HF + LF ~ age + bmi + hba1c + sex").unwrap();

    let serial = SequentialBuilder::new(EngineKind::Lm)
        .build(&spec, &data, Some("hba1c"))
        .unwrap();
    let parallel = SequentialBuilder::new(EngineKind::Lm)
        .parallel(true)
        .build(&spec, &data, Some("hba1c"))
        .unwrap();
    let again = SequentialBuilder::new(EngineKind::Lm)
        .parallel(true)
        .build(&spec, &data, Some("hba1c"))
        .unwrap();

    assert_eq!(serial, parallel);
    assert_eq!(parallel, again);
}

#[test]
fn without_exposure_chain_follows_formula_order() {
    let data = cohort();
    let table = build_sequential_models("LF ~ hba1c + age", &data, None, "lm").unwrap();
    let first: Vec<&str> = table.model("LF", 1).iter().map(|r| r.term.as_str()).collect();
    assert_eq!(first, vec!["(Intercept)", "hba1c"]);
}

#[test]
fn crude_bmi_effect_on_hf_is_negative() {
    let data = cohort();
    let table = build_sequential_models("HF ~ age + bmi", &data, Some("bmi"), "lm").unwrap();
    let crude = table.model("HF", 1)[1].clone();
    assert!(crude.estimate < 0.0, "{crude:?}");
    assert!(crude.conf_low < crude.estimate && crude.estimate < crude.conf_high);
    assert_eq!(crude.n_obs, 200);
    // Symmetric Wald-type interval.
    assert_abs_diff_eq!(
        crude.estimate - crude.conf_low,
        crude.conf_high - crude.estimate,
        epsilon = 1e-10
    );
}

#[test]
fn wider_level_gives_wider_intervals() {
    let data = cohort();
    let spec = ModelSpec::parse("HF ~ bmi").unwrap();
    let at = |level: f64| {
        SequentialBuilder::new(EngineKind::Lm)
            .confidence_level(ConfidenceLevel::new(level).unwrap())
            .build(&spec, &data, None)
            .unwrap()
            .rows()[1]
            .clone()
    };
    let (narrow, wide) = (at(0.8), at(0.99));
    assert_abs_diff_eq!(narrow.estimate, wide.estimate, epsilon = 1e-12);
    assert!(wide.conf_high - wide.conf_low > narrow.conf_high - narrow.conf_low);
}

#[test]
fn logit_engine_on_binary_outcome() {
    let data = cohort();
    let table = build_sequential_models("low_hrv ~ bmi + age", &data, Some("bmi"), "logit").unwrap();
    assert_eq!(table.model_keys().len(), 2);
    let bmi = table.model("low_hrv", 2)[1].clone();
    // Higher BMI lowers HF, so it raises the odds of low HRV.
    assert!(bmi.estimate > 0.0, "{bmi:?}");
    assert!(bmi.p_value >= 0.0 && bmi.p_value <= 1.0);
}

#[test]
fn missing_values_use_complete_cases_per_model() {
    let data = generate_cohort(&CohortConfig {
        missing_rate: 0.25,
        ..CohortConfig::default()
    })
    .unwrap();
    let table = build_sequential_models("HF ~ bmi + hba1c", &data, None, "lm").unwrap();
    let n1 = table.model("HF", 1)[0].n_obs;
    let n2 = table.model("HF", 2)[0].n_obs;
    assert_eq!(n1, 200);
    assert!(n2 < n1);
}

#[test]
fn specification_errors() {
    let data = cohort();

    let err = build_sequential_models("HF ~ age", &data, Some("bmi"), "lm").unwrap_err();
    assert!(matches!(err, ModelError::InvalidExposure { .. }), "{err}");

    let err = build_sequential_models(" ~ age", &data, None, "lm").unwrap_err();
    assert!(matches!(err, ModelError::EmptySpec(_)), "{err}");

    let err = build_sequential_models("HF ~ ", &data, None, "lm").unwrap_err();
    assert!(matches!(err, ModelError::EmptySpec(_)), "{err}");

    let err = build_sequential_models("HF ~ age + age", &data, None, "lm").unwrap_err();
    assert_eq!(err, ModelError::DuplicatePredictor("age".to_string()));

    let err = build_sequential_models("HF ~ age", &data, None, "quantreg").unwrap_err();
    assert_eq!(err, ModelError::UnsupportedEngine("quantreg".to_string()));
}

#[test]
fn fit_failure_names_outcome_and_chain_length() {
    let data = cohort();
    // `HF` is continuous, so the logit engine rejects the first HF model.
    let err = build_sequential_models("low_hrv + HF ~ bmi", &data, None, "logit").unwrap_err();
    match err {
        ModelError::FitFailure {
            outcome,
            chain_length,
            reason: FitError::NonBinaryResponse { .. },
        } => {
            assert_eq!(outcome, "HF");
            assert_eq!(chain_length, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}
