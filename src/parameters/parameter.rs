//! Parameter definition and implementation
//!
//! This module provides the Parameter struct, the fundamental building block of
//! the parameter system. A parameter binds a name to a nominal value and,
//! optionally, to a probability distribution that makes it uncertain.

use crate::distribution::{Distribution, DistributionError, DistributionSpec};
use crate::error::{Result, UqError};
use crate::parameters::substitution;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when working with parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Cannot set distribution of parameter '{name}': {source}")]
    Distribution {
        name: String,
        #[source]
        source: DistributionError,
    },

    #[error("Parameter '{name}' not found")]
    ParameterNotFound { name: String },

    #[error("'{attribute}' is neither a parameter nor a parameter attribute")]
    UnknownAttribute { attribute: String },

    #[error("Invalid parameter entry: {message}")]
    InvalidEntry { message: String },
}

/// Nominal value of a parameter
///
/// Integers and floating point values are kept apart so that the value written
/// into a simulator input file looks the way it was given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
}

impl ParameterValue {
    /// The value as a floating point number
    pub fn as_f64(&self) -> f64 {
        match *self {
            ParameterValue::Int(v) => v as f64,
            ParameterValue::Float(v) => v,
        }
    }

    /// Whether the value can be written as a numeric literal
    pub fn is_finite(&self) -> bool {
        match *self {
            ParameterValue::Int(_) => true,
            ParameterValue::Float(v) => v.is_finite(),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ParameterValue::Int(v) => write!(f, "{}", v),
            // Integral floats keep a fractional part so they read back as floats
            ParameterValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{:.1}", v)
            }
            ParameterValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        ParameterValue::Int(v)
    }
}

impl From<i32> for ParameterValue {
    fn from(v: i32) -> Self {
        ParameterValue::Int(v as i64)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Float(v)
    }
}

/// A named model parameter, optionally uncertain
///
/// A parameter is uncertain exactly when it carries a distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Name of the parameter, also the token matched in simulator input files
    name: String,

    /// Nominal value of the parameter
    value: ParameterValue,

    /// Distribution of the parameter, `None` if it is not uncertain
    #[serde(default)]
    distribution: Option<Distribution>,
}

impl Parameter {
    /// Create a new parameter without uncertainty
    ///
    /// # Examples
    ///
    /// ```
    /// use uqparam_rs::parameters::{Parameter, ParameterValue};
    ///
    /// let param = Parameter::new("gbar_Na", 120);
    /// assert_eq!(param.name(), "gbar_Na");
    /// assert_eq!(param.value(), ParameterValue::Int(120));
    /// assert!(!param.is_uncertain());
    /// ```
    pub fn new(name: &str, value: impl Into<ParameterValue>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            distribution: None,
        }
    }

    /// Create a new parameter and attach a distribution specification
    ///
    /// A generator in `spec` is invoked with `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use uqparam_rs::distribution;
    /// use uqparam_rs::parameters::Parameter;
    ///
    /// let param = Parameter::with_distribution("gbar_K", 36.0, distribution::normal(0.1)).unwrap();
    /// assert!(param.is_uncertain());
    /// ```
    pub fn with_distribution(
        name: &str,
        value: impl Into<ParameterValue>,
        spec: impl Into<DistributionSpec>,
    ) -> std::result::Result<Self, ParameterError> {
        let mut param = Self::new(name, value);
        param.set_distribution(spec)?;
        Ok(param)
    }

    /// Get the name of the parameter
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the nominal value of the parameter
    pub fn value(&self) -> ParameterValue {
        self.value
    }

    /// Set the nominal value of the parameter
    ///
    /// An attached distribution is kept as it is, even if it was derived from
    /// the previous value by a generator.
    pub fn set_value(&mut self, value: impl Into<ParameterValue>) {
        self.value = value.into();
    }

    /// Get the distribution of the parameter, if it is uncertain
    pub fn distribution(&self) -> Option<&Distribution> {
        self.distribution.as_ref()
    }

    /// Check whether the parameter is uncertain
    pub fn is_uncertain(&self) -> bool {
        self.distribution.is_some()
    }

    /// Set the distribution of the parameter
    ///
    /// - [`DistributionSpec::None`] clears the uncertainty
    /// - [`DistributionSpec::Distribution`] is stored as given
    /// - [`DistributionSpec::Generator`] is invoked with the current value
    ///
    /// On failure the parameter is left unchanged.
    pub fn set_distribution(
        &mut self,
        spec: impl Into<DistributionSpec>,
    ) -> std::result::Result<(), ParameterError> {
        let spec = spec.into();
        self.distribution = self.resolve_distribution(&spec)?;
        Ok(())
    }

    /// Set the distribution of the parameter from a configuration value
    ///
    /// See [`DistributionSpec::from_config`] for the accepted shapes.
    pub fn set_distribution_from_config(
        &mut self,
        value: &Value,
    ) -> std::result::Result<(), ParameterError> {
        let spec = DistributionSpec::from_config(value).map_err(|source| {
            ParameterError::Distribution {
                name: self.name.clone(),
                source,
            }
        })?;
        self.set_distribution(spec)
    }

    pub(crate) fn resolve_distribution(
        &self,
        spec: &DistributionSpec,
    ) -> std::result::Result<Option<Distribution>, ParameterError> {
        spec.resolve(self.value.as_f64())
            .map_err(|source| ParameterError::Distribution {
                name: self.name.clone(),
                source,
            })
    }

    pub(crate) fn replace_distribution(&mut self, distribution: Option<Distribution>) {
        self.distribution = distribution;
    }

    /// Write `value` for this parameter into a simulator input file
    ///
    /// Every `name = <number>` assignment in the file is rewritten. A file in
    /// which the parameter does not occur is left untouched and is not an
    /// error.
    ///
    /// # Returns
    ///
    /// The number of lines that were rewritten
    pub fn set_parameter_value<P: AsRef<Path>>(
        &self,
        path: P,
        value: impl Into<ParameterValue>,
    ) -> Result<usize> {
        let value = value.into();
        if !value.is_finite() {
            return Err(UqError::InvalidArgument(format!(
                "cannot write non-finite value {} for parameter '{}'",
                value, self.name
            )));
        }

        substitution::substitute_file(path, &self.name, &value.to_string())
    }

    /// Restore the nominal value of this parameter in a simulator input file
    pub fn reset_parameter_value<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        self.set_parameter_value(path, self.value)
    }
}
