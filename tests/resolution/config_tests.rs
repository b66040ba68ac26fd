//! Integration tests for JSON experiment configuration

use crate::test_helpers::{feature_function, model_function, TestingModel1d};
use serde_json::json;
use std::fs;
use uqparam_rs::base::{Base, ParameterBase};
use uqparam_rs::config::ExperimentConfig;
use uqparam_rs::distribution::Distribution;
use uqparam_rs::error::UqError;
use uqparam_rs::features::{Features, GeneralFeatures};
use uqparam_rs::logging::VerboseLevel;
use uqparam_rs::model::{BaseModel, Model};
use uqparam_rs::registry::{Registry, RegistryItem};
use uqparam_rs::{feature_function, run_function};

fn testing_model() -> Box<dyn Model> {
    Box::new(TestingModel1d)
}

fn no_features() -> Box<dyn Features> {
    Box::new(GeneralFeatures::new())
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_run_function(run_function!(model_function))
        .register_feature_function(feature_function!(feature_function))
        .register_model("testing_model", testing_model)
        .register_features("no_features", no_features);
    registry
}

#[test]
fn test_registry_lookup() {
    let registry = registry();
    assert!(matches!(
        registry.lookup("model_function"),
        Some(RegistryItem::RunFunction(_))
    ));
    assert!(matches!(
        registry.lookup("feature_function"),
        Some(RegistryItem::FeatureFunction(_))
    ));
    assert!(matches!(
        registry.run_function("testing_model"),
        Err(UqError::InvalidArgument(_))
    ));
}

#[test]
fn test_load_and_build() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("experiment.json");
    let log_path = dir.path().join("experiment.log");

    let config = json!({
        "model": "model_function",
        "features": "feature_function",
        "parameters": [
            ["a", 1, null],
            ["b", 2.0, {"generator": "normal", "interval": 0.25}],
            {"name": "c", "value": 3, "distribution": {"type": "log_normal", "mu": 0.0, "sigma": 0.5}}
        ],
        "verbose_level": "warning",
        "verbose_filename": log_path,
    });
    fs::write(&config_path, config.to_string()).unwrap();

    let config = ExperimentConfig::load_json(&config_path).unwrap();
    assert_eq!(config.verbose_level, VerboseLevel::Warning);
    assert_eq!(config.verbose_filename.as_deref(), Some(log_path.as_path()));

    let experiment = config.build(&registry()).unwrap();
    assert!(experiment.model().is::<BaseModel>());
    assert_eq!(experiment.model().name(), "model_function");
    assert_eq!(experiment.features().features_to_run(), vec!["feature_function"]);
    assert_eq!(experiment.base().verbose_filename(), Some(log_path.as_path()));
    assert!(log_path.exists());

    let params = experiment.parameters().unwrap();
    assert_eq!(params.names(), vec!["a", "b", "c"]);
    assert_eq!(params.uncertain_names(), vec!["b", "c"]);
    assert_eq!(
        params.parameter("b").unwrap().distribution(),
        Some(&Distribution::Normal {
            mean: 2.0,
            std_dev: 0.5
        })
    );
}

#[test]
fn test_build_with_factories() {
    let config = ExperimentConfig::from_json(r#"{"model": "testing_model", "features": "no_features"}"#)
        .unwrap();
    let experiment = config.build(&registry()).unwrap();

    assert!(experiment.model().is::<TestingModel1d>());
    assert!(experiment.features().features_to_run().is_empty());
}

#[test]
fn test_build_errors() {
    let registry = registry();

    let cases = [
        (r#"{"model": ["not", "callable"]}"#, "type mismatch"),
        (r#"{"model": "feature_function"}"#, "type mismatch"),
        (r#"{"features": "model_function"}"#, "type mismatch"),
        (r#"{"features": {"name": "g"}}"#, "type mismatch"),
        (r#"{"parameters": {"a": 1}}"#, "type mismatch"),
        (r#"{"parameters": [["a", 1]]}"#, "type mismatch"),
        (r#"{"parameters": [["a", 1, {"generator": "triangular", "interval": 0.1}]]}"#, "type mismatch"),
        (r#"{"parameters": [["a", 1, {"type": "uniform", "low": 2.0, "high": 1.0}]]}"#, "invalid argument"),
        (r#"{"model": "missing"}"#, "key not found"),
    ];

    for (json, expected) in cases {
        let config = ExperimentConfig::from_json(json).unwrap();
        let err = config.build(&registry).unwrap_err();
        let kind = match err {
            UqError::TypeMismatch(_) => "type mismatch",
            UqError::InvalidArgument(_) => "invalid argument",
            UqError::KeyNotFound(_) => "key not found",
            _ => "other",
        };
        assert_eq!(kind, expected, "config {}", json);
    }
}

#[test]
fn test_config_setters_leave_state_on_error() {
    let registry = registry();
    let mut experiment = ParameterBase::new(
        Base::builder()
            .model(run_function!(model_function))
            .build()
            .unwrap(),
        None,
    )
    .unwrap();

    experiment
        .set_parameters_from_config(&json!([["a", 1, null]]))
        .unwrap();

    assert!(experiment
        .base_mut()
        .set_model_from_config(&json!(["not", "callable"]), &registry)
        .is_err());
    assert_eq!(experiment.model().name(), "model_function");

    assert!(experiment
        .set_parameters_from_config(&json!([["b", "two", null]]))
        .is_err());
    assert_eq!(experiment.parameters().unwrap().names(), vec!["a"]);

    experiment.set_parameters_from_config(&json!(null)).unwrap();
    assert_eq!(experiment.parameters().unwrap().names(), vec!["a"]);
}

#[test]
fn test_config_serialization() {
    let config = ExperimentConfig {
        model: json!("model_function"),
        parameters: json!([["a", 1, null]]),
        verbose_level: VerboseLevel::Critical,
        ..ExperimentConfig::default()
    };

    let json = config.to_json().unwrap();
    assert!(json.contains("\"critical\""));
    assert_eq!(ExperimentConfig::from_json(&json).unwrap(), config);
}
