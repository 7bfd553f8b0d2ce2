use credence::{
    CombinationStrategy, ConsultationMode, ControllerConfig, RuleKind, StoppingConstraints,
};

#[test]
fn test_constraint_defaults() {
    let constraints = StoppingConstraints::default();

    assert_eq!(constraints.combination_strategy, CombinationStrategy::Any);
    assert_eq!(constraints.active_rules.len(), 6);
    assert!((constraints.confidence_threshold - 0.95).abs() < f64::EPSILON);
    assert_eq!(constraints.time_limit_secs, 300);
    assert!((constraints.cost_benefit_ratio - 1.0).abs() < f64::EPSILON);
    assert!((constraints.convergence_threshold - 0.01).abs() < f64::EPSILON);
    assert!((constraints.diminishing_threshold - 0.1).abs() < f64::EPSILON);
    assert_eq!(constraints.window_size, 5);
    assert!(constraints.validate().is_ok());
}

#[test]
fn test_controller_defaults() {
    let config = ControllerConfig::default();

    assert_eq!(config.mode, ConsultationMode::Streaming);
    assert_eq!(config.max_concurrent_assessments, 4);
    assert_eq!(config.assessor_timeout_secs, 60);
    assert_eq!(config.max_retries, 2);
    assert_eq!(config.retry_base_delay_ms, 500);
    assert!((config.fatal_degraded_fraction - 0.5).abs() < f64::EPSILON);
    assert!((config.max_log_bayes_factor - 5.0).abs() < f64::EPSILON);
    assert!(config.validate().is_ok());
}

#[test]
fn test_constraints_from_toml() {
    let toml_str = r#"
        combination_strategy = "majority"
        active_rules = ["confidence_threshold", "convergence", "time_constraint"]
        confidence_threshold = 0.85
        time_limit_secs = 120
    "#;

    let constraints: StoppingConstraints = toml::from_str(toml_str).unwrap();
    assert_eq!(
        constraints.combination_strategy,
        CombinationStrategy::Majority
    );
    assert_eq!(constraints.active_rules.len(), 3);
    assert!(constraints.active_rules.contains(&RuleKind::Convergence));
    assert!((constraints.confidence_threshold - 0.85).abs() < f64::EPSILON);
    assert_eq!(constraints.time_limit_secs, 120);
    // Unspecified fields keep their defaults.
    assert_eq!(constraints.window_size, 5);
    assert!(constraints.validate().is_ok());
}

#[test]
fn test_unknown_strategy_name_rejected() {
    let toml_str = r#"combination_strategy = "most""#;
    let result: Result<StoppingConstraints, _> = toml::from_str(toml_str);
    assert!(result.is_err());
}

#[test]
fn test_unknown_rule_name_rejected() {
    let toml_str = r#"active_rules = ["confidence_threshold", "vibes"]"#;
    let result: Result<StoppingConstraints, _> = toml::from_str(toml_str);
    assert!(result.is_err());
}

#[test]
fn test_out_of_range_thresholds_rejected() {
    for (field, value) in [
        ("confidence_threshold", 1.5),
        ("convergence_threshold", -0.1),
        ("discrimination_gap", 2.0),
        ("diminishing_threshold", -1.0),
    ] {
        let toml_str = format!("{} = {}", field, value);
        let constraints: StoppingConstraints = toml::from_str(&toml_str).unwrap();
        let err = constraints.validate().unwrap_err();
        assert!(
            err.to_string().contains(field),
            "expected {} in: {}",
            field,
            err
        );
    }
}

#[test]
fn test_controller_config_from_toml() {
    let toml_str = r#"
        mode = "batch"
        max_concurrent_assessments = 8
        fatal_degraded_fraction = 0.25
    "#;

    let config: ControllerConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.mode, ConsultationMode::Batch);
    assert_eq!(config.max_concurrent_assessments, 8);
    assert!((config.fatal_degraded_fraction - 0.25).abs() < f64::EPSILON);
    assert!(config.validate().is_ok());
}

#[test]
fn test_constraints_round_trip_json() {
    let constraints = StoppingConstraints::default();
    let json = serde_json::to_string(&constraints).unwrap();
    assert!(json.contains("\"any\""));
    assert!(json.contains("diminishing_returns"));

    let back: StoppingConstraints = serde_json::from_str(&json).unwrap();
    assert_eq!(back.active_rules, constraints.active_rules);
}
