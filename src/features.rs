//! Features computed from model output.
//!
//! A features object lists the features an external extraction stage should
//! compute ("features to run"). [`GeneralFeatures`] is the default: a set of
//! named feature functions, all of which are selected.

use crate::error::{Result, UqError};
use crate::model::ModelOutput;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type FeatureFn = dyn Fn(&ModelOutput) -> Result<f64> + Send + Sync;

/// A named feature function
///
/// Clones share the underlying function; two feature functions are equal only
/// if they are clones of each other.
#[derive(Clone)]
pub struct FeatureFunction {
    name: String,
    func: Arc<FeatureFn>,
}

impl FeatureFunction {
    /// Wrap a function under the given name
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&ModelOutput) -> Result<f64> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            func: Arc::new(func),
        }
    }

    /// Name of the feature
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compute the feature
    pub fn call(&self, output: &ModelOutput) -> Result<f64> {
        (self.func)(output)
    }
}

impl PartialEq for FeatureFunction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for FeatureFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureFunction")
            .field("name", &self.name)
            .finish()
    }
}

/// Wrap a function item in a [`FeatureFunction`] named after its identifier
#[macro_export]
macro_rules! feature_function {
    ($func:ident) => {
        $crate::features::FeatureFunction::new(stringify!($func), $func)
    };
}

/// A trait for objects that list the features to compute from model output
pub trait Features {
    /// Names of the features to compute, in order
    fn features_to_run(&self) -> Vec<String>;

    /// Compute one feature
    fn calculate(&self, name: &str, _output: &ModelOutput) -> Result<f64> {
        Err(UqError::NotImplemented(format!("feature '{}' is not implemented", name)))
    }

    /// Compute every feature to run
    fn calculate_all(&self, output: &ModelOutput) -> Result<Vec<(String, f64)>> {
        self.features_to_run()
            .into_iter()
            .map(|name| {
                let value = self.calculate(&name, output)?;
                Ok((name, value))
            })
            .collect()
    }

    /// Access to the concrete type
    fn as_any(&self) -> &dyn Any;
}

impl<'a> dyn Features + 'a {
    /// Check whether the features object is of type `T`
    pub fn is<T: Features + 'static>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast to the concrete features type
    pub fn downcast_ref<T: Features + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Features defined by a list of feature functions
#[derive(Debug, Clone, Default)]
pub struct GeneralFeatures {
    functions: Vec<FeatureFunction>,
    features_to_run: Vec<String>,
}

impl GeneralFeatures {
    /// Features with nothing to run
    pub fn new() -> Self {
        Self::default()
    }

    /// Features running every one of `functions`
    pub fn from_functions(functions: Vec<FeatureFunction>) -> Self {
        let features_to_run = functions.iter().map(|f| f.name().to_string()).collect();
        Self {
            functions,
            features_to_run,
        }
    }

    /// Box features running every one of `functions`; the default features constructor
    pub fn boxed(functions: Vec<FeatureFunction>) -> Box<dyn Features> {
        Box::new(Self::from_functions(functions))
    }

    /// Add a feature function and select it
    pub fn add_feature(&mut self, function: FeatureFunction) {
        let name = function.name().to_string();
        self.functions.retain(|f| f.name() != name);
        self.features_to_run.retain(|f| *f != name);
        self.functions.push(function);
        self.features_to_run.push(name);
    }

    /// Restrict the features to run to `names`
    ///
    /// Every name must belong to a known feature function.
    pub fn select<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if let Some(unknown) = names.iter().find(|n| self.function(n).is_none()) {
            return Err(UqError::KeyNotFound(format!("unknown feature '{}'", unknown)));
        }
        self.features_to_run = names;
        Ok(())
    }

    /// Names of all known feature functions
    pub fn implemented_features(&self) -> Vec<String> {
        self.functions.iter().map(|f| f.name().to_string()).collect()
    }

    /// Look up a feature function by name
    pub fn function(&self, name: &str) -> Option<&FeatureFunction> {
        self.functions.iter().find(|f| f.name() == name)
    }
}

impl Features for GeneralFeatures {
    fn features_to_run(&self) -> Vec<String> {
        self.features_to_run.clone()
    }

    fn calculate(&self, name: &str, output: &ModelOutput) -> Result<f64> {
        match self.function(name) {
            Some(function) => function.call(output),
            None => Err(UqError::KeyNotFound(format!("unknown feature '{}'", name))),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
