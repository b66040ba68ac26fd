//! Integration tests for the Parameter struct
//!
//! These tests verify that the Parameter struct behaves correctly in various scenarios.

use approx::assert_relative_eq;
use serde_json::json;
use uqparam_rs::distribution::{self, Distribution, DistributionError, DistributionSpec, Generator};
use uqparam_rs::parameters::{Parameter, ParameterError, ParameterValue};

#[test]
fn test_parameter_lifecycle() {
    // A parameter starts without uncertainty
    let mut param = Parameter::new("gbar_Na", 120);
    assert_eq!(param.name(), "gbar_Na");
    assert_eq!(param.value(), ParameterValue::Int(120));
    assert!(param.distribution().is_none());
    assert!(!param.is_uncertain());

    // A distribution makes it uncertain
    let dist = Distribution::uniform(100.0, 140.0).unwrap();
    param.set_distribution(dist).unwrap();
    assert_eq!(param.distribution(), Some(&dist));
    assert!(param.is_uncertain());

    // Clearing the distribution makes it certain again
    param.set_distribution(DistributionSpec::None).unwrap();
    assert!(!param.is_uncertain());

    // Changing the value keeps the distribution
    param.set_distribution(dist).unwrap();
    param.set_value(110.0);
    assert_eq!(param.value(), ParameterValue::Float(110.0));
    assert_eq!(param.distribution(), Some(&dist));
}

#[test]
fn test_generator_uses_current_value() {
    let mut param = Parameter::new("gbar_K", 36);
    param.set_value(40.0);
    param.set_distribution(distribution::normal(0.25)).unwrap();

    match param.distribution() {
        Some(&Distribution::Normal { mean, std_dev }) => {
            assert_relative_eq!(mean, 40.0);
            assert_relative_eq!(std_dev, 10.0);
        }
        other => panic!("expected a normal distribution, got {:?}", other),
    }
}

#[test]
fn test_custom_generator() {
    let spread = Generator::new("spread", |value| Distribution::uniform(value - 1.0, value + 1.0).ok());
    let param = Parameter::with_distribution("tau", 2.5, spread).unwrap();

    assert_eq!(
        param.distribution(),
        Some(&Distribution::Uniform {
            low: 1.5,
            high: 3.5
        })
    );
}

#[test]
fn test_failed_generator_leaves_parameter_unchanged() {
    let dist = Distribution::normal(1.0, 0.5).unwrap();
    let mut param = Parameter::with_distribution("a", 1, dist).unwrap();

    let failing = Generator::new("failing", |_| None);
    let err = param.set_distribution(failing).unwrap_err();
    assert!(matches!(
        err,
        ParameterError::Distribution {
            source: DistributionError::GeneratorFailed { .. },
            ..
        }
    ));
    assert_eq!(param.distribution(), Some(&dist));

    // A zero value cannot give a relative spread
    let mut zero = Parameter::new("offset", 0.0);
    assert!(zero.set_distribution(distribution::uniform(0.1)).is_err());
    assert!(!zero.is_uncertain());
}

#[test]
fn test_distribution_from_config() {
    let mut param = Parameter::new("gbar_L", 0.5);

    param
        .set_distribution_from_config(&json!({"type": "normal", "mean": 0.5, "std_dev": 0.1}))
        .unwrap();
    assert_eq!(
        param.distribution(),
        Some(&Distribution::Normal {
            mean: 0.5,
            std_dev: 0.1
        })
    );

    param
        .set_distribution_from_config(&json!({"generator": "uniform", "interval": 0.5}))
        .unwrap();
    assert_eq!(
        param.distribution(),
        Some(&Distribution::Uniform {
            low: 0.375,
            high: 0.625
        })
    );

    let err = param.set_distribution_from_config(&json!(42)).unwrap_err();
    assert!(matches!(
        err,
        ParameterError::Distribution {
            source: DistributionError::Unrecognized { .. },
            ..
        }
    ));
    assert!(param.is_uncertain());

    param.set_distribution_from_config(&json!(null)).unwrap();
    assert!(!param.is_uncertain());
}

#[test]
fn test_parameter_serialization() {
    let param = Parameter::with_distribution("gbar_Na", 120, distribution::uniform(0.5)).unwrap();

    let json = serde_json::to_string(&param).unwrap();
    let back: Parameter = serde_json::from_str(&json).unwrap();
    assert_eq!(back, param);
    assert_eq!(back.value(), ParameterValue::Int(120));

    let plain: Parameter = serde_json::from_str(r#"{"name": "gbar_K", "value": 36.0}"#).unwrap();
    assert_eq!(plain.value(), ParameterValue::Float(36.0));
    assert!(!plain.is_uncertain());
}

#[test]
fn test_value_rendering() {
    assert_eq!(ParameterValue::Int(120).to_string(), "120");
    assert_eq!(ParameterValue::Float(120.0).to_string(), "120.0");
    assert_eq!(ParameterValue::Float(0.12).to_string(), "0.12");
    assert_eq!(ParameterValue::Float(-3.5).to_string(), "-3.5");
}
