//! # Parameter System
//!
//! This module binds parameter names to nominal values and optional probability
//! distributions, and writes parameter values into the text-based input files
//! of an external simulator.
//!
//! ## Key Features
//!
//! - **Named Parameters**: Work with descriptive parameter names rather than array indices
//! - **Uncertain Parameters**: Attach a distribution, or a generator deriving one from the value
//! - **Ordered Collections**: Iteration and queries follow insertion order
//! - **File Substitution**: Rewrite `name = <number>` assignments in simulator input files
//! - **Serialization Support**: Save and load parameter collections with serde
//!
//! ## Core Components
//!
//! - [`Parameter`]: A named value with an optional distribution
//! - [`Parameters`]: An ordered collection of parameters keyed by name
//! - [`substitution`]: The numeric literal rewriting routine, usable without file I/O
//!
//! ## Example Usage
//!
//! ```rust
//! use uqparam_rs::distribution::{self, DistributionSpec};
//! use uqparam_rs::parameters::Parameters;
//!
//! let mut params = Parameters::new(vec![
//!     ("gbar_Na", 120.0, DistributionSpec::None),
//!     ("gbar_K", 36.0, DistributionSpec::None),
//!     ("gbar_L", 0.3, DistributionSpec::None),
//! ])
//! .unwrap();
//!
//! // Make two parameters uncertain with a 10% relative uniform spread
//! params.set_distribution("gbar_Na", distribution::uniform(0.1)).unwrap();
//! params.set_distribution("gbar_K", distribution::uniform(0.1)).unwrap();
//!
//! assert_eq!(params.uncertain_names(), vec!["gbar_Na", "gbar_K"]);
//! ```

pub mod parameter;
pub mod parameters;
pub mod substitution;

// Re-export key types
pub use parameter::{Parameter, ParameterError, ParameterValue};
pub use parameters::{
    AttributeValue, Lookup, ParameterAttribute, ParameterEntry, ParameterValues, Parameters,
};
