//! Model trait and the function-wrapping base model.
//!
//! This module defines the Model trait, the common interface of everything that
//! maps parameter values to a time series, and [`BaseModel`], which turns a bare
//! run function into a Model.

use crate::distribution::describe_value;
use crate::error::{Result, UqError};
use crate::parameters::ParameterValues;
use crate::registry::Registry;
use ndarray::Array1;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Output of a model run: the time grid and the model response on it
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    /// Time points of the response
    pub time: Array1<f64>,
    /// Model response at each time point
    pub values: Array1<f64>,
}

impl ModelOutput {
    /// Create a new model output
    pub fn new(time: Array1<f64>, values: Array1<f64>) -> Self {
        Self { time, values }
    }
}

type RunFn = dyn Fn(&ParameterValues) -> Result<ModelOutput> + Send + Sync;

/// A named run function
///
/// Clones share the underlying function; two run functions are equal only if
/// they are clones of each other.
#[derive(Clone)]
pub struct RunFunction {
    name: String,
    func: Arc<RunFn>,
}

impl RunFunction {
    /// Wrap a function under the given name
    ///
    /// The [`run_function!`](crate::run_function) macro derives the name from
    /// the function's identifier.
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&ParameterValues) -> Result<ModelOutput> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            func: Arc::new(func),
        }
    }

    /// Name of the function
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the function
    pub fn call(&self, parameters: &ParameterValues) -> Result<ModelOutput> {
        (self.func)(parameters)
    }
}

impl PartialEq for RunFunction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for RunFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunFunction").field("name", &self.name).finish()
    }
}

/// Wrap a function item in a [`RunFunction`] named after its identifier
///
/// ```
/// use ndarray::Array1;
/// use uqparam_rs::model::ModelOutput;
/// use uqparam_rs::parameters::ParameterValues;
/// use uqparam_rs::run_function;
///
/// fn constant(_: &ParameterValues) -> uqparam_rs::Result<ModelOutput> {
///     Ok(ModelOutput::new(Array1::zeros(3), Array1::ones(3)))
/// }
///
/// let run = run_function!(constant);
/// assert_eq!(run.name(), "constant");
/// ```
#[macro_export]
macro_rules! run_function {
    ($func:ident) => {
        $crate::model::RunFunction::new(stringify!($func), $func)
    };
}

/// A trait representing a model whose uncertainty can be quantified.
///
/// A model maps parameter values to a time series. Implementors override
/// [`Model::run`]; every other method has a default.
pub trait Model {
    /// Name of the model, by default the name of the implementing type
    fn name(&self) -> String {
        short_type_name(std::any::type_name::<Self>()).to_string()
    }

    /// Run the model with the given parameter values
    fn run(&self, _parameters: &ParameterValues) -> Result<ModelOutput> {
        Err(UqError::NotImplemented("No run() method implemented".to_string()))
    }

    /// Post-process the output of a run
    fn postprocess(&self, output: ModelOutput) -> Result<ModelOutput> {
        Ok(output)
    }

    /// Whether the time grid of the output may change between runs
    fn adaptive(&self) -> bool {
        false
    }

    /// Label of the time axis
    fn xlabel(&self) -> &str {
        ""
    }

    /// Label of the response axis
    fn ylabel(&self) -> &str {
        ""
    }

    /// The function this model wraps, if it wraps one
    fn run_function(&self) -> Option<&RunFunction> {
        None
    }

    /// Assign values to the model's declared parameters
    ///
    /// The default model declares no parameters, so any name is rejected.
    fn set_parameters(&mut self, values: &ParameterValues) -> Result<()> {
        match values.keys().min() {
            Some(name) => Err(UqError::KeyNotFound(format!(
                "model '{}' declares no parameter '{}'",
                self.name(),
                name
            ))),
            None => Ok(()),
        }
    }

    /// Access to the concrete type
    fn as_any(&self) -> &dyn Any;
}

impl<'a> dyn Model + 'a {
    /// Check whether the model is of type `T`
    pub fn is<T: Model + 'static>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast to the concrete model type
    pub fn downcast_ref<T: Model + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Values of a model's declared parameters
///
/// Only names declared when the model is defined can be assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSettings {
    declared: Vec<String>,
    values: HashMap<String, f64>,
}

impl ModelSettings {
    /// Declare the parameter names a model accepts
    pub fn new<I, S>(declared: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            declared: declared.into_iter().map(Into::into).collect(),
            values: HashMap::new(),
        }
    }

    /// Declared parameter names
    pub fn declared(&self) -> &[String] {
        &self.declared
    }

    /// Check whether a name is declared
    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.iter().any(|d| d == name)
    }

    /// Assign one declared parameter
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        if !self.is_declared(name) {
            return Err(UqError::KeyNotFound(format!("undeclared model parameter '{}'", name)));
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Assign several parameters; if any name is undeclared nothing is assigned
    pub fn update(&mut self, values: &ParameterValues) -> Result<()> {
        let mut names: Vec<&String> = values.keys().collect();
        names.sort();

        if let Some(name) = names.into_iter().find(|name| !self.is_declared(name)) {
            return Err(UqError::KeyNotFound(format!("undeclared model parameter '{}'", name)));
        }

        for (name, &value) in values {
            self.values.insert(name.clone(), value);
        }
        Ok(())
    }

    /// Value of a declared parameter, if assigned
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Assigned values overlaid with `parameters`
    ///
    /// A name present in `parameters` takes its value from there.
    pub fn merged(&self, parameters: &ParameterValues) -> ParameterValues {
        let mut merged = self.values.clone();
        merged.extend(parameters.iter().map(|(name, &value)| (name.clone(), value)));
        merged
    }
}

/// A model built around a run function
///
/// This is the default class used to wrap bare functions into models. Its name
/// follows the wrapped function; assigning a new function renames the model.
/// Values assigned with [`Model::set_parameters`] are passed to the run
/// function unless the run's own parameters name them too.
#[derive(Debug, Clone)]
pub struct BaseModel {
    name: String,
    run: Option<RunFunction>,
    adaptive: bool,
    xlabel: String,
    ylabel: String,
    settings: ModelSettings,
}

impl Default for BaseModel {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseModel {
    /// Create a model without a run function
    ///
    /// Running it fails with [`UqError::NotImplemented`] until a run function is assigned.
    pub fn new() -> Self {
        Self {
            name: "BaseModel".to_string(),
            run: None,
            adaptive: false,
            xlabel: String::new(),
            ylabel: String::new(),
            settings: ModelSettings::default(),
        }
    }

    /// Create a model that runs `run`
    pub fn from_function(run: RunFunction) -> Self {
        let mut model = Self::new();
        model.set_run(run);
        model
    }

    /// Box a model wrapping `run`; the default model constructor
    pub fn boxed(run: RunFunction) -> Box<dyn Model> {
        Box::new(Self::from_function(run))
    }

    /// Mark the model as adaptive
    pub fn with_adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }

    /// Set the axis labels
    pub fn with_labels(mut self, xlabel: &str, ylabel: &str) -> Self {
        self.xlabel = xlabel.to_string();
        self.ylabel = ylabel.to_string();
        self
    }

    /// Declare the parameter names accepted by [`Model::set_parameters`]
    pub fn with_declared_parameters<I, S>(mut self, declared: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings = ModelSettings::new(declared);
        self
    }

    /// Assign the run function; the model takes the function's name
    pub fn set_run(&mut self, run: RunFunction) {
        self.name = run.name().to_string();
        self.run = Some(run);
    }

    /// Assign the run function named by a configuration value
    ///
    /// The value must be a string naming a run function in `registry`.
    /// Anything else cannot be run and is an invalid argument; the current
    /// run function is then kept.
    pub fn set_run_from_config(&mut self, value: &Value, registry: &Registry) -> Result<()> {
        let run = match value {
            Value::String(name) => registry.run_function(name)?.clone(),
            other => {
                return Err(UqError::InvalidArgument(format!(
                    "run target must be callable, got {}",
                    describe_value(other)
                )))
            }
        };
        self.set_run(run);
        Ok(())
    }

    /// The declared parameters and their assigned values
    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }
}

impl Model for BaseModel {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn run(&self, parameters: &ParameterValues) -> Result<ModelOutput> {
        match &self.run {
            Some(run) => run.call(&self.settings.merged(parameters)),
            None => Err(UqError::NotImplemented("No run() method implemented".to_string())),
        }
    }

    fn adaptive(&self) -> bool {
        self.adaptive
    }

    fn xlabel(&self) -> &str {
        &self.xlabel
    }

    fn ylabel(&self) -> &str {
        &self.ylabel
    }

    fn run_function(&self) -> Option<&RunFunction> {
        self.run.as_ref()
    }

    fn set_parameters(&mut self, values: &ParameterValues) -> Result<()> {
        self.settings.update(values)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
