//! Integration tests for the Parameters collection
//!
//! These tests verify that the Parameters collection behaves correctly in various scenarios.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uqparam_rs::distribution::{self, Distribution, DistributionSpec, Generator};
use uqparam_rs::error::UqError;
use uqparam_rs::parameters::{
    AttributeValue, Lookup, Parameter, ParameterAttribute, ParameterEntry, ParameterError,
    ParameterValue, Parameters,
};

fn two_parameters() -> Parameters {
    Parameters::new(vec![
        ("a", 1, DistributionSpec::None),
        ("b", 2, DistributionSpec::None),
    ])
    .unwrap()
}

#[test]
fn test_parameters_from_triples() {
    let params = two_parameters();

    assert_eq!(params.len(), 2);
    assert!(!params.is_empty());
    assert!(params.contains("a"));
    assert!(!params.contains("c"));
    assert_eq!(params.names(), vec!["a", "b"]);
    assert_eq!(params.parameter("b").unwrap().value(), ParameterValue::Int(2));
    assert!(params.uncertain().is_empty());
}

#[test]
fn test_parameters_from_mixed_entries() {
    let dist = Distribution::normal(3.0, 0.5).unwrap();
    let params = Parameters::new(vec![
        ParameterEntry::from(Parameter::new("a", 1)),
        ParameterEntry::from(("b", 2.0, DistributionSpec::from(dist))),
    ])
    .unwrap();

    assert_eq!(params.names(), vec!["a", "b"]);
    assert_eq!(params.uncertain_names(), vec!["b"]);
}

#[test]
fn test_insertion_order_and_replacement() {
    let mut params = Parameters::new(vec![
        ("c", 3, DistributionSpec::None),
        ("a", 1, DistributionSpec::None),
        ("b", 2, DistributionSpec::None),
    ])
    .unwrap();
    assert_eq!(params.names(), vec!["c", "a", "b"]);

    let replaced = params.insert(Parameter::new("a", 10)).unwrap();
    assert_eq!(replaced.value(), ParameterValue::Int(1));
    assert_eq!(params.names(), vec!["c", "a", "b"]);
    assert_eq!(params.parameter("a").unwrap().value(), ParameterValue::Int(10));

    assert!(params.insert(Parameter::new("d", 4)).is_none());
    assert_eq!(params.names(), vec!["c", "a", "b", "d"]);
}

#[test]
fn test_duplicate_names_keep_last() {
    let params = Parameters::new(vec![
        ("a", 1, DistributionSpec::None),
        ("a", 5, DistributionSpec::None),
    ])
    .unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params.parameter("a").unwrap().value(), ParameterValue::Int(5));
}

#[test]
fn test_get_parameter_or_attribute() {
    let params = two_parameters();

    match params.get("a").unwrap() {
        Lookup::Parameter(param) => assert_eq!(param.name(), "a"),
        other => panic!("expected a parameter, got {:?}", other),
    }

    assert_eq!(
        params.get("name").unwrap(),
        Lookup::Attributes(vec![
            AttributeValue::Name("a".to_string()),
            AttributeValue::Name("b".to_string()),
        ])
    );
    assert_eq!(
        params.get("distribution").unwrap(),
        Lookup::Attributes(vec![
            AttributeValue::Distribution(None),
            AttributeValue::Distribution(None),
        ])
    );
    assert_eq!(params.get("parameter_space"), params.get("distribution"));

    let err = params.get("gbar").unwrap_err();
    assert_eq!(
        err,
        ParameterError::UnknownAttribute {
            attribute: "gbar".to_string()
        }
    );
    assert!(matches!(UqError::from(err), UqError::KeyNotFound(_)));
}

#[test]
fn test_parameter_named_like_attribute() {
    let params = Parameters::new(vec![
        ("value", 7, DistributionSpec::None),
        ("b", 2, DistributionSpec::None),
    ])
    .unwrap();

    assert!(matches!(params.get("value").unwrap(), Lookup::Parameter(_)));
    assert_eq!(
        params.attribute_list(ParameterAttribute::Value),
        vec![
            AttributeValue::Value(ParameterValue::Int(7)),
            AttributeValue::Value(ParameterValue::Int(2)),
        ]
    );
}

#[test]
fn test_uncertain_subset() {
    let mut params = Parameters::new(vec![
        ("a", 1.0, DistributionSpec::None),
        ("b", 2.0, DistributionSpec::None),
        ("c", 4.0, DistributionSpec::None),
    ])
    .unwrap();

    params.set_distribution("c", distribution::uniform(0.5)).unwrap();
    params.set_distribution("a", distribution::uniform(0.5)).unwrap();

    assert_eq!(params.uncertain_names(), vec!["a", "c"]);
    assert_eq!(
        params.get_uncertain(ParameterAttribute::Distribution),
        vec![
            AttributeValue::Distribution(Some(Distribution::Uniform {
                low: 0.75,
                high: 1.25
            })),
            AttributeValue::Distribution(Some(Distribution::Uniform { low: 3.0, high: 5.0 })),
        ]
    );
    assert_eq!(
        params.get_uncertain(ParameterAttribute::Value),
        vec![
            AttributeValue::Value(ParameterValue::Float(1.0)),
            AttributeValue::Value(ParameterValue::Float(4.0)),
        ]
    );

    let err = params.set_distribution("missing", DistributionSpec::None).unwrap_err();
    assert_eq!(
        err,
        ParameterError::ParameterNotFound {
            name: "missing".to_string()
        }
    );
}

#[test]
fn test_set_all_distributions() {
    let mut params = Parameters::new(vec![
        ("a", 2.0, DistributionSpec::None),
        ("b", 8.0, DistributionSpec::None),
    ])
    .unwrap();

    params.set_all_distributions(distribution::normal(0.5)).unwrap();
    assert_eq!(params.uncertain_names(), vec!["a", "b"]);
    assert_eq!(
        params.parameter("b").unwrap().distribution(),
        Some(&Distribution::Normal {
            mean: 8.0,
            std_dev: 4.0
        })
    );

    params.set_all_distributions(DistributionSpec::None).unwrap();
    assert!(params.uncertain().is_empty());
}

#[test]
fn test_set_all_distributions_is_atomic() {
    let mut params = Parameters::new(vec![
        ("a", 2.0, DistributionSpec::None),
        ("zero", 0.0, DistributionSpec::None),
    ])
    .unwrap();

    // The relative spread of a zero value is empty, so the second parameter fails
    assert!(params.set_all_distributions(distribution::uniform(0.5)).is_err());
    assert!(params.uncertain().is_empty());

    let picky = Generator::new("picky", |value| {
        if value > 1.0 {
            Distribution::normal(value, 1.0).ok()
        } else {
            None
        }
    });
    assert!(params.set_all_distributions(picky).is_err());
    assert!(params.uncertain().is_empty());
}

#[test]
fn test_nominal_and_sampled_values() {
    let params = Parameters::new(vec![
        ParameterEntry::from(("a", 1, DistributionSpec::None)),
        ParameterEntry::from(("b", 10.0, distribution::uniform(0.5))),
    ])
    .unwrap();

    let nominal = params.nominal_values();
    assert_eq!(nominal["a"], 1.0);
    assert_eq!(nominal["b"], 10.0);

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..100 {
        let sample = params.sample_uncertain(&mut rng).unwrap();
        assert_eq!(sample.len(), 2);
        assert_eq!(sample["a"], 1.0);
        assert!((7.5..12.5).contains(&sample["b"]));
    }

    let mut first = ChaCha8Rng::seed_from_u64(7);
    let mut second = ChaCha8Rng::seed_from_u64(7);
    assert_eq!(
        params.sample_uncertain(&mut first).unwrap(),
        params.sample_uncertain(&mut second).unwrap()
    );
}

#[test]
fn test_json_round_trip_preserves_order() {
    let params = Parameters::new(vec![
        ParameterEntry::from(("z", 26, DistributionSpec::None)),
        ParameterEntry::from(("a", 1.5, distribution::normal(0.5))),
        ParameterEntry::from(("m", 13, DistributionSpec::None)),
    ])
    .unwrap();

    let json = params.to_json().unwrap();
    let loaded = Parameters::from_json(&json).unwrap();

    assert_eq!(loaded.names(), vec!["z", "a", "m"]);
    assert_eq!(loaded, params);
    assert!(matches!(Parameters::from_json("{\"a\": 1}"), Err(UqError::JsonError(_))));
}
