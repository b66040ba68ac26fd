//! Named functions and factories that configuration files can refer to.
//!
//! Configuration values name models and features by string. A [`Registry`]
//! maps those names to run functions, feature functions, model factories and
//! features factories.

use crate::error::{Result, UqError};
use crate::features::{FeatureFunction, Features};
use crate::model::{Model, RunFunction};
use std::collections::HashMap;

/// Builds a model instance
pub type ModelFactory = fn() -> Box<dyn Model>;

/// Builds a features instance
pub type FeaturesFactory = fn() -> Box<dyn Features>;

/// What a registered name refers to
pub enum RegistryItem<'a> {
    RunFunction(&'a RunFunction),
    FeatureFunction(&'a FeatureFunction),
    Model(ModelFactory),
    Features(FeaturesFactory),
}

impl RegistryItem<'_> {
    fn kind(&self) -> &'static str {
        match self {
            RegistryItem::RunFunction(_) => "run function",
            RegistryItem::FeatureFunction(_) => "feature function",
            RegistryItem::Model(_) => "model",
            RegistryItem::Features(_) => "features",
        }
    }
}

/// Lookup table from configuration names to functions and factories
#[derive(Default)]
pub struct Registry {
    run_functions: HashMap<String, RunFunction>,
    feature_functions: HashMap<String, FeatureFunction>,
    models: HashMap<String, ModelFactory>,
    features: HashMap<String, FeaturesFactory>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a run function under its own name
    pub fn register_run_function(&mut self, run: RunFunction) -> &mut Self {
        self.run_functions.insert(run.name().to_string(), run);
        self
    }

    /// Register a feature function under its own name
    pub fn register_feature_function(&mut self, feature: FeatureFunction) -> &mut Self {
        self.feature_functions
            .insert(feature.name().to_string(), feature);
        self
    }

    /// Register a model factory
    pub fn register_model(&mut self, name: &str, factory: ModelFactory) -> &mut Self {
        self.models.insert(name.to_string(), factory);
        self
    }

    /// Register a features factory
    pub fn register_features(&mut self, name: &str, factory: FeaturesFactory) -> &mut Self {
        self.features.insert(name.to_string(), factory);
        self
    }

    /// Look up a name
    ///
    /// Factories take precedence over functions of the same name, model
    /// entries over features entries.
    pub fn lookup(&self, name: &str) -> Option<RegistryItem<'_>> {
        if let Some(&factory) = self.models.get(name) {
            return Some(RegistryItem::Model(factory));
        }
        if let Some(&factory) = self.features.get(name) {
            return Some(RegistryItem::Features(factory));
        }
        if let Some(run) = self.run_functions.get(name) {
            return Some(RegistryItem::RunFunction(run));
        }
        self.feature_functions
            .get(name)
            .map(RegistryItem::FeatureFunction)
    }

    /// Look up a name that must refer to a run function
    ///
    /// A name registered as something that cannot be run as a function is an
    /// invalid argument.
    pub fn run_function(&self, name: &str) -> Result<&RunFunction> {
        match self.run_functions.get(name) {
            Some(run) => Ok(run),
            None => match self.lookup(name) {
                Some(item) => Err(UqError::InvalidArgument(format!(
                    "run target must be callable: '{}' is a {}",
                    name,
                    item.kind()
                ))),
                None => Err(UqError::KeyNotFound(format!("no run function named '{}'", name))),
            },
        }
    }
}
