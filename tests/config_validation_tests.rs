//! Config Validation Tests
//!
//! Exercises typo detection, file loading and cross-field validation of the
//! config layer independently from the estimator.

use std::io::Write;

use watervalue::config::validation::{known_config_keys, suggest_correction, validate_unknown_keys};
use watervalue::config::{AppConfig, ConfigError, EstimationMethod, EstimatorConfig};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_estimator_section_warns_with_suggestion() {
    let toml_str = r#"
[estimator]
jump_minuts = 30
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("jump_minuts"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("estimator.jump_minutes")
    );
}

#[test]
fn short_option_names_are_known() {
    let toml_str = r#"
[estimator]
prodlimits = [0.0, 100.0]
negativeprod = false
maxinstalled = 250.0
estmethod = "minimum"
estinterval = true
jumpm = 60
nsegments = 4
discardend = 60
"#;
    assert!(validate_unknown_keys(toml_str).is_empty());
}

#[test]
fn garbage_key_has_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("totally.unrelated.setting", &known).is_none());
}

// ============================================================================
// File Loading
// ============================================================================

#[test]
fn load_full_config_from_file() {
    let file = write_config(
        r#"
[estimator]
strictness = 0.7
method = "jump"

[[plants]]
id = "aurland_total"
name = "AURLAND TOTAL (Combined)"
price_area = "NO5"
max_installed = 1273.0
prod_limits = [0.0, 200.0, 400.0, 650.0, 900.0, 1150.0]

[[plants]]
id = "kvilldal"
name = "Kvilldal (Suldal)"
max_installed = 1240.0
"#,
    );

    let config = AppConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.estimator.strictness, 0.7);
    assert_eq!(config.estimator.method, EstimationMethod::Jump);
    assert_eq!(config.plants.len(), 2);

    let kvilldal = config.plant("kvilldal").unwrap();
    assert_eq!(
        kvilldal.resolved_prod_limits(4),
        vec![0.0, 310.0, 620.0, 930.0, 1240.0]
    );
    let derived = kvilldal.estimator_config(&config.estimator);
    assert_eq!(derived.method, EstimationMethod::Jump);
    assert_eq!(derived.prod_limits.as_ref().map(Vec::len), Some(5));
}

#[test]
fn typo_does_not_break_loading() {
    let file = write_config(
        r#"
[estimator]
strictnes = 0.9
"#,
    );
    let config = AppConfig::load_from_file(file.path()).unwrap();
    // the misspelled key is ignored, the default survives
    assert_eq!(config.estimator.strictness, 0.5);
}

#[test]
fn invalid_strictness_fails_validation() {
    let file = write_config(
        r#"
[estimator]
strictness = 1.5
"#,
    );
    match AppConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("strictness")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn unknown_method_is_parse_error() {
    let file = write_config(
        r#"
[estimator]
method = "median"
"#,
    );
    assert!(matches!(
        AppConfig::load_from_file(file.path()),
        Err(ConfigError::Parse(_, _))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let result = AppConfig::load_from_file(std::path::Path::new("/nonexistent/watervalue.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_, _))));
}

#[test]
fn save_and_reload_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("watervalue.toml");
    let config = AppConfig {
        estimator: EstimatorConfig {
            jump_minutes: 45,
            ..EstimatorConfig::default()
        },
        plants: Vec::new(),
    };
    config.save_to_file(&path).unwrap();
    let reloaded = AppConfig::load_from_file(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn validation_error_lists_every_problem() {
    let err = ConfigError::Validation(vec!["first".to_string(), "second".to_string()]);
    let text = err.to_string();
    assert!(text.contains("- first"));
    assert!(text.contains("- second"));
}
