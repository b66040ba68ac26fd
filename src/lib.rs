//! # uqparam-rs
//!
//! `uqparam-rs` manages the parameters and configuration of simulation models
//! whose uncertainty is to be quantified.
//!
//! The library provides:
//! - Named parameters with nominal values and optional distributions
//! - Distribution generators deriving a distribution from a nominal value
//! - Rewriting of `name = <number>` assignments in simulator input files
//! - Resolution of models and features given as functions or as objects
//! - JSON experiment configuration with a registry of named functions
//!
//! ## Basic Usage
//!
//! ```
//! use ndarray::Array1;
//! use uqparam_rs::base::{Base, ParameterBase};
//! use uqparam_rs::distribution::{self, DistributionSpec};
//! use uqparam_rs::model::ModelOutput;
//! use uqparam_rs::parameters::ParameterValues;
//! use uqparam_rs::run_function;
//!
//! fn decay(parameters: &ParameterValues) -> uqparam_rs::Result<ModelOutput> {
//!     let rate = parameters["rate"];
//!     let time = Array1::linspace(0.0, 1.0, 11);
//!     let values = time.mapv(|t| (-rate * t).exp());
//!     Ok(ModelOutput::new(time, values))
//! }
//!
//! let base = Base::builder().model(run_function!(decay)).build().unwrap();
//! let experiment = ParameterBase::new(
//!     base,
//!     Some(vec![("rate", 2.0, DistributionSpec::from(distribution::uniform(0.5)))].into()),
//! )
//! .unwrap();
//!
//! let output = experiment.evaluate_nominal(None).unwrap();
//! assert_eq!(output.values[0], 1.0);
//! ```

pub mod error;

// Parameter system
pub mod distribution;
pub mod parameters;

// Models and features
pub mod features;
pub mod model;

// Configuration
pub mod base;
pub mod config;
pub mod logging;
pub mod registry;

// Re-exports for convenience
pub use base::{Base, BaseBuilder, FeatureSpec, ModelSpec, ParameterBase, ParametersSpec};
pub use config::ExperimentConfig;
pub use distribution::{Distribution, DistributionSpec, Generator};
pub use error::{Result, UqError};
pub use features::{FeatureFunction, Features, GeneralFeatures};
pub use logging::VerboseLevel;
pub use model::{BaseModel, Model, ModelOutput, RunFunction};
pub use parameters::{Parameter, ParameterValues, Parameters};
pub use registry::Registry;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
