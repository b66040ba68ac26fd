//! Resolution of model, features and parameter specifications.
//!
//! Callers describe a model as a bare run function or as a model instance, and
//! features as nothing, a single feature function, or a features instance.
//! [`Base`] normalises these specifications into concrete [`Model`] and
//! [`Features`] objects, wrapping bare functions with the configured default
//! constructors. [`ParameterBase`] additionally owns the [`Parameters`] of an
//! experiment.
//!
//! ```
//! use ndarray::Array1;
//! use uqparam_rs::base::Base;
//! use uqparam_rs::model::{BaseModel, ModelOutput};
//! use uqparam_rs::parameters::ParameterValues;
//! use uqparam_rs::run_function;
//!
//! fn model_function(_: &ParameterValues) -> uqparam_rs::Result<ModelOutput> {
//!     Ok(ModelOutput::new(Array1::zeros(2), Array1::zeros(2)))
//! }
//!
//! let base = Base::builder().model(run_function!(model_function)).build().unwrap();
//! assert!(base.model().is::<BaseModel>());
//! assert_eq!(base.model().name(), "model_function");
//! assert!(base.features().features_to_run().is_empty());
//! ```

use crate::distribution::{describe_value, DistributionSpec};
use crate::error::{Result, UqError};
use crate::features::{FeatureFunction, Features, GeneralFeatures};
use crate::logging::{self, VerboseLevel};
use crate::model::{BaseModel, Model, ModelOutput, RunFunction};
use crate::parameters::{
    ParameterEntry, ParameterError, ParameterValue, ParameterValues, Parameters,
};
use crate::registry::{Registry, RegistryItem};
use rand::Rng;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::dispatcher::{self, Dispatch};

/// Wraps a bare run function into a model
pub type ModelConstructor = fn(RunFunction) -> Box<dyn Model>;

/// Builds the features object running the given feature functions
pub type FeaturesConstructor = fn(Vec<FeatureFunction>) -> Box<dyn Features>;

/// How a model is specified
pub enum ModelSpec {
    /// A bare run function, wrapped with the model constructor
    Function(RunFunction),

    /// A model used as is
    Instance(Box<dyn Model>),
}

impl ModelSpec {
    /// Specify a model instance
    pub fn instance<M: Model + 'static>(model: M) -> Self {
        ModelSpec::Instance(Box::new(model))
    }

    /// Read a model specification from a configuration value
    ///
    /// `null` means "no change" and yields `None`. A string names a model
    /// factory or a run function in `registry`. Other values are a type mismatch.
    pub fn from_config(value: &Value, registry: &Registry) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(name) => match registry.lookup(name) {
                Some(RegistryItem::Model(factory)) => Ok(Some(ModelSpec::Instance(factory()))),
                Some(RegistryItem::RunFunction(run)) => Ok(Some(ModelSpec::Function(run.clone()))),
                Some(_) => Err(UqError::TypeMismatch(format!(
                    "'{}' is neither a model nor a run function",
                    name
                ))),
                None => Err(UqError::KeyNotFound(format!("no model named '{}'", name))),
            },
            other => Err(UqError::TypeMismatch(format!(
                "model must be a run function or a model, got {}",
                describe_value(other)
            ))),
        }
    }
}

impl From<RunFunction> for ModelSpec {
    fn from(run: RunFunction) -> Self {
        ModelSpec::Function(run)
    }
}

impl From<Box<dyn Model>> for ModelSpec {
    fn from(model: Box<dyn Model>) -> Self {
        ModelSpec::Instance(model)
    }
}

/// How the features of an experiment are specified
#[derive(Default)]
pub enum FeatureSpec {
    /// No features: the features constructor with nothing to run
    #[default]
    None,

    /// A single feature function, the only feature to run
    Function(FeatureFunction),

    /// A features object used as is
    Instance(Box<dyn Features>),
}

impl FeatureSpec {
    /// Specify a features instance
    pub fn instance<F: Features + 'static>(features: F) -> Self {
        FeatureSpec::Instance(Box::new(features))
    }

    /// Read a features specification from a configuration value
    ///
    /// `null` selects no features. A string names a features factory or a
    /// feature function in `registry`. Other values are a type mismatch.
    pub fn from_config(value: &Value, registry: &Registry) -> Result<Self> {
        match value {
            Value::Null => Ok(FeatureSpec::None),
            Value::String(name) => match registry.lookup(name) {
                Some(RegistryItem::Features(factory)) => Ok(FeatureSpec::Instance(factory())),
                Some(RegistryItem::FeatureFunction(feature)) => {
                    Ok(FeatureSpec::Function(feature.clone()))
                }
                Some(_) => Err(UqError::TypeMismatch(format!(
                    "'{}' is neither a features object nor a feature function",
                    name
                ))),
                None => Err(UqError::KeyNotFound(format!("no features named '{}'", name))),
            },
            other => Err(UqError::TypeMismatch(format!(
                "features must be null, a feature function or a features object, got {}",
                describe_value(other)
            ))),
        }
    }
}

impl From<FeatureFunction> for FeatureSpec {
    fn from(feature: FeatureFunction) -> Self {
        FeatureSpec::Function(feature)
    }
}

impl From<Box<dyn Features>> for FeatureSpec {
    fn from(features: Box<dyn Features>) -> Self {
        FeatureSpec::Instance(features)
    }
}

/// How the parameters of an experiment are specified
#[derive(Debug, Clone)]
pub enum ParametersSpec {
    /// Raw entries, wrapped into a new collection
    List(Vec<ParameterEntry>),

    /// A collection used as is
    Collection(Parameters),
}

impl ParametersSpec {
    /// Read a parameters specification from a configuration value
    ///
    /// `null` yields `None`. A list holds `[name, value, distribution]` triples
    /// or `{"name", "value", "distribution"}` records. Other values are a type
    /// mismatch.
    pub fn from_config(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => {
                let entries = items
                    .iter()
                    .map(entry_from_config)
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(Some(ParametersSpec::List(entries)))
            }
            other => Err(UqError::TypeMismatch(format!(
                "parameters must be a list of parameters, got {}",
                describe_value(other)
            ))),
        }
    }

    fn into_parameters(self) -> std::result::Result<Parameters, ParameterError> {
        match self {
            ParametersSpec::List(entries) => Parameters::new(entries),
            ParametersSpec::Collection(params) => Ok(params),
        }
    }
}

impl From<Parameters> for ParametersSpec {
    fn from(params: Parameters) -> Self {
        ParametersSpec::Collection(params)
    }
}

impl<E: Into<ParameterEntry>> From<Vec<E>> for ParametersSpec {
    fn from(entries: Vec<E>) -> Self {
        ParametersSpec::List(entries.into_iter().map(Into::into).collect())
    }
}

static NULL: Value = Value::Null;

fn entry_from_config(item: &Value) -> std::result::Result<ParameterEntry, ParameterError> {
    let invalid = |message: String| ParameterError::InvalidEntry { message };

    let (name, value, distribution) = match item {
        Value::Array(triple) if triple.len() == 3 => (&triple[0], &triple[1], &triple[2]),
        Value::Object(record) => (
            record.get("name").unwrap_or(&NULL),
            record.get("value").unwrap_or(&NULL),
            record.get("distribution").unwrap_or(&NULL),
        ),
        other => {
            return Err(invalid(format!(
                "expected a [name, value, distribution] triple, got {}",
                describe_value(other)
            )))
        }
    };

    let name = name.as_str().ok_or_else(|| {
        invalid(format!(
            "parameter name must be a string, got {}",
            describe_value(name)
        ))
    })?;
    let value: ParameterValue = serde_json::from_value(value.clone()).map_err(|_| {
        invalid(format!(
            "value of parameter '{}' must be a number, got {}",
            name,
            describe_value(value)
        ))
    })?;
    let distribution = DistributionSpec::from_config(distribution).map_err(|source| {
        ParameterError::Distribution {
            name: name.to_string(),
            source,
        }
    })?;

    Ok(ParameterEntry::Triple(name.to_string(), value, distribution))
}

/// Configuration container resolving a model and features
pub struct Base {
    model: Box<dyn Model>,
    features: Box<dyn Features>,
    base_model: ModelConstructor,
    base_features: FeaturesConstructor,
    verbose_level: VerboseLevel,
    verbose_filename: Option<PathBuf>,
    dispatch: Dispatch,
}

impl fmt::Debug for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Base")
            .field("model", &self.model.name())
            .field("features_to_run", &self.features.features_to_run())
            .field("verbose_level", &self.verbose_level)
            .field("verbose_filename", &self.verbose_filename)
            .finish()
    }
}

impl Base {
    /// Start configuring a [`Base`]
    pub fn builder() -> BaseBuilder {
        BaseBuilder::default()
    }

    /// A [`Base`] with the default model, no features and default verbosity
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// The resolved model
    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    /// Mutable access to the resolved model
    pub fn model_mut(&mut self) -> &mut dyn Model {
        self.model.as_mut()
    }

    /// Assign the model
    ///
    /// A run function is wrapped with the model constructor; a model instance
    /// is used as is.
    pub fn set_model(&mut self, spec: impl Into<ModelSpec>) {
        self.model = match spec.into() {
            ModelSpec::Function(run) => (self.base_model)(run),
            ModelSpec::Instance(model) => model,
        };
        self.in_scope(|| tracing::debug!(model = %self.model.name(), "resolved model"));
    }

    /// Assign the model from a configuration value
    ///
    /// `null` leaves the current model in place. On error the current model
    /// is kept.
    pub fn set_model_from_config(&mut self, value: &Value, registry: &Registry) -> Result<()> {
        if let Some(spec) = ModelSpec::from_config(value, registry)? {
            self.set_model(spec);
        }
        Ok(())
    }

    /// The resolved features
    pub fn features(&self) -> &dyn Features {
        self.features.as_ref()
    }

    /// Assign the features
    ///
    /// [`FeatureSpec::None`] selects no features, a feature function becomes
    /// the single feature to run, and a features instance is used as is.
    pub fn set_features(&mut self, spec: impl Into<FeatureSpec>) {
        self.features = match spec.into() {
            FeatureSpec::None => (self.base_features)(Vec::new()),
            FeatureSpec::Function(feature) => (self.base_features)(vec![feature]),
            FeatureSpec::Instance(features) => features,
        };
        self.in_scope(|| {
            tracing::debug!(
                features = ?self.features.features_to_run(),
                "resolved features"
            )
        });
    }

    /// Assign the features from a configuration value
    ///
    /// On error the current features are kept.
    pub fn set_features_from_config(&mut self, value: &Value, registry: &Registry) -> Result<()> {
        let spec = FeatureSpec::from_config(value, registry)?;
        self.set_features(spec);
        Ok(())
    }

    /// Constructor wrapping bare run functions into models
    pub fn base_model(&self) -> ModelConstructor {
        self.base_model
    }

    /// Constructor building features from feature functions
    pub fn base_features(&self) -> FeaturesConstructor {
        self.base_features
    }

    /// Configured verbosity
    pub fn verbose_level(&self) -> VerboseLevel {
        self.verbose_level
    }

    /// File diagnostics are written to, if not stderr
    pub fn verbose_filename(&self) -> Option<&Path> {
        self.verbose_filename.as_deref()
    }

    /// Run `f` with diagnostics routed to this configuration's verbosity
    /// and destination
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.dispatch, f)
    }
}

/// Builder for [`Base`]
pub struct BaseBuilder {
    model: Option<ModelSpec>,
    base_model: ModelConstructor,
    features: FeatureSpec,
    base_features: FeaturesConstructor,
    verbose_level: VerboseLevel,
    verbose_filename: Option<PathBuf>,
}

impl Default for BaseBuilder {
    fn default() -> Self {
        Self {
            model: None,
            base_model: BaseModel::boxed,
            features: FeatureSpec::None,
            base_features: GeneralFeatures::boxed,
            verbose_level: VerboseLevel::default(),
            verbose_filename: None,
        }
    }
}

impl BaseBuilder {
    /// Set the model specification
    pub fn model(mut self, spec: impl Into<ModelSpec>) -> Self {
        self.model = Some(spec.into());
        self
    }

    /// Set the constructor wrapping bare run functions
    pub fn base_model(mut self, constructor: ModelConstructor) -> Self {
        self.base_model = constructor;
        self
    }

    /// Set the features specification
    pub fn features(mut self, spec: impl Into<FeatureSpec>) -> Self {
        self.features = spec.into();
        self
    }

    /// Set the constructor building features objects
    pub fn base_features(mut self, constructor: FeaturesConstructor) -> Self {
        self.base_features = constructor;
        self
    }

    /// Set the verbosity
    pub fn verbose_level(mut self, level: VerboseLevel) -> Self {
        self.verbose_level = level;
        self
    }

    /// Write diagnostics to a file instead of stderr
    pub fn verbose_filename<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.verbose_filename = Some(path.into());
        self
    }

    /// Resolve the specifications and set up diagnostics output
    pub fn build(self) -> Result<Base> {
        let dispatch = logging::dispatch(self.verbose_level, self.verbose_filename.as_deref())?;

        let mut base = Base {
            model: Box::new(BaseModel::new()),
            features: (self.base_features)(Vec::new()),
            base_model: self.base_model,
            base_features: self.base_features,
            verbose_level: self.verbose_level,
            verbose_filename: self.verbose_filename,
            dispatch,
        };

        if let Some(spec) = self.model {
            base.set_model(spec);
        }
        base.set_features(self.features);

        Ok(base)
    }
}

/// A [`Base`] that also owns the parameters of the experiment
#[derive(Debug)]
pub struct ParameterBase {
    base: Base,
    parameters: Option<Parameters>,
}

impl ParameterBase {
    /// Combine a resolved [`Base`] with a parameters specification
    pub fn new(base: Base, parameters: Option<ParametersSpec>) -> Result<Self> {
        let mut parameter_base = Self {
            base,
            parameters: None,
        };
        if let Some(spec) = parameters {
            parameter_base.set_parameters(spec)?;
        }
        Ok(parameter_base)
    }

    /// The underlying model and features configuration
    pub fn base(&self) -> &Base {
        &self.base
    }

    /// Mutable access to the underlying configuration
    pub fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    /// The resolved model
    pub fn model(&self) -> &dyn Model {
        self.base.model()
    }

    /// The resolved features
    pub fn features(&self) -> &dyn Features {
        self.base.features()
    }

    /// The parameters, if set
    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    /// Mutable access to the parameters, if set
    pub fn parameters_mut(&mut self) -> Option<&mut Parameters> {
        self.parameters.as_mut()
    }

    /// Assign the parameters
    ///
    /// Raw entries are wrapped into a new collection; a collection is used as
    /// is. If building the collection fails, the current parameters are kept.
    pub fn set_parameters(&mut self, spec: impl Into<ParametersSpec>) -> Result<()> {
        let params = spec.into().into_parameters()?;
        self.base.in_scope(|| {
            tracing::debug!(
                parameters = ?params.names(),
                uncertain = ?params.uncertain_names(),
                "resolved parameters"
            )
        });
        self.parameters = Some(params);
        Ok(())
    }

    /// Assign the parameters from a configuration value
    ///
    /// `null` leaves the parameters as they are.
    pub fn set_parameters_from_config(&mut self, value: &Value) -> Result<()> {
        if let Some(spec) = ParametersSpec::from_config(value)? {
            self.set_parameters(spec)?;
        }
        Ok(())
    }

    fn require_parameters(&self) -> Result<&Parameters> {
        self.parameters
            .as_ref()
            .ok_or_else(|| UqError::InvalidState("no parameters have been set".to_string()))
    }

    /// Run the model once
    ///
    /// With `config_file` set, `values` are first written into that simulator
    /// input file; every name in `values` must then be a known parameter. The
    /// model output is passed through the model's post-processing.
    pub fn evaluate(&self, values: &ParameterValues, config_file: Option<&Path>) -> Result<ModelOutput> {
        self.base.in_scope(|| {
            if let Some(path) = config_file {
                self.require_parameters()?.set_parameter_values(path, values)?;
            }

            let model = self.base.model();
            tracing::debug!(model = %model.name(), "running model");
            let output = model.run(values)?;
            model.postprocess(output)
        })
    }

    /// Run the model at the nominal parameter values
    pub fn evaluate_nominal(&self, config_file: Option<&Path>) -> Result<ModelOutput> {
        let values = self.require_parameters()?.nominal_values();
        self.evaluate(&values, config_file)
    }

    /// Draw a parameter set from the uncertain parameters' distributions
    pub fn sample_uncertain<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ParameterValues> {
        self.require_parameters()?.sample_uncertain(rng)
    }

    /// Restore every parameter's nominal value in a simulator input file
    pub fn reset_config_file(&self, config_file: &Path) -> Result<()> {
        self.base
            .in_scope(|| self.require_parameters()?.reset_parameter_values(config_file))
    }
}
