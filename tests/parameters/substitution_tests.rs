//! Integration tests for numeric literal substitution in simulator input files

use crate::test_helpers::simulator_file;
use std::fs;
use uqparam_rs::distribution::DistributionSpec;
use uqparam_rs::parameters::substitution::{assignment_pattern, substitute, substitute_file};
use uqparam_rs::parameters::{ParameterValues, Parameters};

const NEURON_CONFIG: &str = "\
create soma
soma {
    nseg = 1
    diam = 18.8
    L = 18.8
    Ra = 123.0
    insert hh
    gnabar_hh = 0.25
    gl_hh = .0001666
    el_hh = -60.0
}
";

#[test]
fn test_assignment_pattern_groups() {
    let pattern = assignment_pattern("gl_hh").unwrap();
    let caps = pattern.captures("    gl_hh = .0001666").unwrap();

    assert_eq!(&caps[2], "gl_hh");
    assert_eq!(&caps[3], " = ");
    assert_eq!(&caps[4], ".0001666");
}

#[test]
fn test_substitute_neuron_config() {
    let out = substitute(NEURON_CONFIG, "gnabar_hh", "0.12").unwrap();
    assert!(out.contains("    gnabar_hh = 0.12\n"));
    assert_eq!(out.lines().count(), NEURON_CONFIG.lines().count());

    // Only the gnabar_hh line differs
    let changed: Vec<_> = NEURON_CONFIG
        .lines()
        .zip(out.lines())
        .filter(|(before, after)| before != after)
        .collect();
    assert_eq!(changed, vec![("    gnabar_hh = 0.25", "    gnabar_hh = 0.12")]);
}

#[test]
fn test_shared_suffix_is_not_rewritten() {
    // Only the assignment to `L` itself is rewritten
    let out = substitute(NEURON_CONFIG, "L", "20").unwrap();
    assert!(out.contains("    L = 20\n"));
    assert!(out.contains("    el_hh = -60.0\n"));
    assert!(out.contains("    gl_hh = .0001666\n"));
}

#[test]
fn test_negative_literal() {
    let out = substitute(NEURON_CONFIG, "el_hh", "-54.3").unwrap();
    assert!(out.contains("    el_hh = -54.3\n"));
}

#[test]
fn test_substitute_file_counts_lines() {
    let (_dir, path) = simulator_file("x = 1\ny = 2\nx = 3 ; x = 4\n");

    assert_eq!(substitute_file(&path, "x", "0").unwrap(), 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), "x = 0\ny = 2\nx = 0 ; x = 0\n");

    assert_eq!(substitute_file(&path, "z", "0").unwrap(), 0);
}

#[test]
fn test_set_then_reset_round_trip() {
    let (_dir, path) = simulator_file(NEURON_CONFIG);
    let params = Parameters::new(vec![
        ("gnabar_hh", 0.25, DistributionSpec::None),
        ("gl_hh", 0.0001666, DistributionSpec::None),
        ("Ra", 123.0, DistributionSpec::None),
    ])
    .unwrap();

    let mut values = ParameterValues::new();
    values.insert("gnabar_hh".to_string(), 0.1);
    values.insert("Ra".to_string(), 150.0);
    params.set_parameter_values(&path, &values).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("gnabar_hh = 0.1\n"));
    assert!(text.contains("Ra = 150.0\n"));
    assert!(text.contains("gl_hh = .0001666\n"));

    params.reset_parameter_values(&path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("gnabar_hh = 0.25\n"));
    assert!(text.contains("Ra = 123.0\n"));
    // Reset writes the nominal value, not the original spelling
    assert!(text.contains("gl_hh = 0.0001666\n"));
}
