//! Tests for solver configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        environment_mode = "non_intrusive_full_assert"
        random_seed = 42

        [termination]
        seconds_spent_limit = 30
        score_calculation_count_limit = 1000

        [score_director]
        constraint_match_enabled = true
        lookup_enabled = false
    "#;

    let config = SolverConfig::from_toml_str(toml).unwrap();
    assert_eq!(
        config.environment_mode,
        EnvironmentMode::NonIntrusiveFullAssert
    );
    assert_eq!(config.random_seed, Some(42));
    let termination = config.termination.clone().unwrap();
    assert_eq!(termination.seconds_spent_limit, Some(30));
    assert_eq!(termination.score_calculation_count_limit, Some(1000));
    let score_director = config.score_director_config();
    assert!(score_director.constraint_match_enabled);
    assert!(!score_director.lookup_enabled);
    assert_eq!(score_director.assert_cloned_solution, None);
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        environment_mode: fast_assert
        random_seed: 42
        termination:
          minutes_spent_limit: 2
        score_director:
          assert_cloned_solution: true
    "#;

    let config = SolverConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::FastAssert);
    assert_eq!(config.time_limit(), Some(Duration::from_secs(120)));
    assert_eq!(
        config.score_director_config().assert_cloned_solution,
        Some(true)
    );
}

#[test]
fn test_defaults() {
    let config = SolverConfig::from_toml_str("").unwrap();

    assert_eq!(config.environment_mode, EnvironmentMode::Reproducible);
    assert_eq!(config.time_limit(), None);
    assert_eq!(config.score_director_config(), ScoreDirectorConfig::default());
    assert!(ScoreDirectorConfig::default().lookup_enabled);
}

#[test]
fn test_cloned_solution_assertion_requires_asserted_mode() {
    let toml = r#"
        environment_mode = "reproducible"

        [score_director]
        assert_cloned_solution = true
    "#;

    let err = SolverConfig::from_toml_str(toml).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_zero_calculation_limit_is_rejected() {
    let toml = r#"
        [termination]
        score_calculation_count_limit = 0
    "#;

    let err = SolverConfig::from_toml_str(toml).unwrap_err();
    assert!(err.to_string().contains("score_calculation_count_limit"));
}

#[test]
fn test_unknown_environment_mode_is_rejected() {
    let err = SolverConfig::from_toml_str(r#"environment_mode = "paranoid""#).unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn test_environment_mode_flags() {
    use EnvironmentMode::*;

    assert!(!NonReproducible.is_asserted());
    assert!(!Reproducible.is_asserted());
    assert!(FastAssert.is_asserted());
    assert!(NonIntrusiveFullAssert.is_asserted());
    assert!(FullAssert.is_asserted());

    assert!(!FastAssert.is_non_intrusive_full_asserted());
    assert!(NonIntrusiveFullAssert.is_non_intrusive_full_asserted());
    assert!(FullAssert.is_non_intrusive_full_asserted());

    assert!(FastAssert.is_intrusive_fast_asserted());
    assert!(!NonIntrusiveFullAssert.is_intrusive_fast_asserted());
    assert!(FullAssert.is_intrusive_fast_asserted());

    assert!(!NonReproducible.is_reproducible());
    assert!(FullAssert.is_reproducible());
}

#[test]
fn test_builder() {
    let config = SolverConfig::new()
        .with_random_seed(123)
        .with_termination_seconds(60)
        .with_environment_mode(EnvironmentMode::FullAssert)
        .with_score_director(ScoreDirectorConfig {
            constraint_match_enabled: true,
            ..ScoreDirectorConfig::default()
        });

    assert_eq!(config.random_seed, Some(123));
    assert_eq!(config.time_limit(), Some(Duration::from_secs(60)));
    assert!(config.validate().is_ok());
}

#[test]
fn test_override_replaces_termination() {
    let config = SolverConfig::new().with_termination_seconds(60);
    let overridden = SolverConfigOverride::with_termination(TerminationConfig {
        seconds_spent_limit: Some(5),
        ..TerminationConfig::default()
    })
    .apply(config);

    assert_eq!(overridden.time_limit(), Some(Duration::from_secs(5)));
}
