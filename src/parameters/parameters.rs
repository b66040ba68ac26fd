//! Parameters collection implementation
//!
//! This module provides the Parameters struct, an ordered collection of
//! Parameter objects keyed by name. It answers queries about the uncertain
//! subset and pushes parameter values into simulator input files.

use crate::distribution::{Distribution, DistributionSpec};
use crate::error::{Result, UqError};
use crate::parameters::parameter::{Parameter, ParameterError, ParameterValue};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Values handed to a model run, keyed by parameter name
pub type ParameterValues = HashMap<String, f64>;

/// One element of the list a [`Parameters`] collection is built from
#[derive(Debug, Clone)]
pub enum ParameterEntry {
    /// An existing parameter, used as is
    Parameter(Parameter),

    /// A `(name, value, distribution)` triple
    Triple(String, ParameterValue, DistributionSpec),
}

impl From<Parameter> for ParameterEntry {
    fn from(param: Parameter) -> Self {
        ParameterEntry::Parameter(param)
    }
}

impl<N, V, D> From<(N, V, D)> for ParameterEntry
where
    N: Into<String>,
    V: Into<ParameterValue>,
    D: Into<DistributionSpec>,
{
    fn from((name, value, distribution): (N, V, D)) -> Self {
        ParameterEntry::Triple(name.into(), value.into(), distribution.into())
    }
}

impl ParameterEntry {
    fn into_parameter(self) -> std::result::Result<Parameter, ParameterError> {
        match self {
            ParameterEntry::Parameter(param) => Ok(param),
            ParameterEntry::Triple(name, value, distribution) => {
                Parameter::with_distribution(&name, value, distribution)
            }
        }
    }
}

/// Attributes of a parameter that can be listed across a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterAttribute {
    Name,
    Value,
    Distribution,
}

impl ParameterAttribute {
    /// Parse an attribute name
    ///
    /// `parameter_space` is accepted as an alias of `distribution`.
    pub fn parse(attribute: &str) -> Option<Self> {
        match attribute {
            "name" => Some(ParameterAttribute::Name),
            "value" => Some(ParameterAttribute::Value),
            "distribution" | "parameter_space" => Some(ParameterAttribute::Distribution),
            _ => None,
        }
    }

    fn of(self, param: &Parameter) -> AttributeValue {
        match self {
            ParameterAttribute::Name => AttributeValue::Name(param.name().to_string()),
            ParameterAttribute::Value => AttributeValue::Value(param.value()),
            ParameterAttribute::Distribution => {
                AttributeValue::Distribution(param.distribution().copied())
            }
        }
    }
}

/// The value of one [`ParameterAttribute`] of one parameter
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Name(String),
    Value(ParameterValue),
    Distribution(Option<Distribution>),
}

/// Result of the overloaded [`Parameters::get`] lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// The key named a parameter
    Parameter(&'a Parameter),

    /// The key named an attribute; its values across all parameters, in order
    Attributes(Vec<AttributeValue>),
}

/// An ordered collection of parameters keyed by name
///
/// Iteration follows insertion order. Inserting a parameter under an existing
/// name replaces the old parameter in its original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Parameter>", into = "Vec<Parameter>")]
pub struct Parameters {
    /// Parameters in insertion order
    params: Vec<Parameter>,

    /// Position of each parameter in `params`
    index: HashMap<String, usize>,
}

impl From<Vec<Parameter>> for Parameters {
    fn from(params: Vec<Parameter>) -> Self {
        let mut collection = Parameters::default();
        for param in params {
            collection.insert(param);
        }
        collection
    }
}

impl From<Parameters> for Vec<Parameter> {
    fn from(params: Parameters) -> Self {
        params.params
    }
}

impl Parameters {
    /// Create a collection from parameters or `(name, value, distribution)` triples
    ///
    /// # Examples
    ///
    /// ```
    /// use uqparam_rs::distribution::DistributionSpec;
    /// use uqparam_rs::parameters::{Lookup, Parameters, ParameterValue};
    ///
    /// let params = Parameters::new(vec![
    ///     ("a", 1, DistributionSpec::None),
    ///     ("b", 2, DistributionSpec::None),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(params.parameter("a").unwrap().value(), ParameterValue::Int(1));
    /// assert_eq!(params.len(), 2);
    /// ```
    pub fn new<I, E>(entries: I) -> std::result::Result<Self, ParameterError>
    where
        I: IntoIterator<Item = E>,
        E: Into<ParameterEntry>,
    {
        let mut params = Self::default();
        for entry in entries {
            params.insert(entry.into().into_parameter()?);
        }
        Ok(params)
    }

    /// Add a parameter, replacing any parameter with the same name
    ///
    /// # Returns
    ///
    /// The replaced parameter, if any
    pub fn insert(&mut self, param: Parameter) -> Option<Parameter> {
        match self.index.get(param.name()) {
            Some(&i) => Some(std::mem::replace(&mut self.params[i], param)),
            None => {
                self.index.insert(param.name().to_string(), self.params.len());
                self.params.push(param);
                None
            }
        }
    }

    /// Get the number of parameters in the collection
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Check if the collection contains a parameter with the given name
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get the names of all parameters, in order
    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name().to_string()).collect()
    }

    /// Iterate over the parameters in order
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Get a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.index.get(name).map(|&i| &self.params[i])
    }

    /// Get a mutable reference to a parameter by name
    ///
    /// The value and distribution can be changed; the name, which is the
    /// parameter's key, cannot.
    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.params[i]),
            None => None,
        }
    }

    /// List one attribute across all parameters, in order
    pub fn attribute_list(&self, attribute: ParameterAttribute) -> Vec<AttributeValue> {
        self.params.iter().map(|p| attribute.of(p)).collect()
    }

    /// Look up a parameter or an attribute list
    ///
    /// If `key` names a parameter, that parameter is returned. Otherwise `key`
    /// is read as an attribute name (`name`, `value` or `distribution`) and the
    /// attribute of every parameter is returned. A parameter named like an
    /// attribute shadows the attribute. Prefer [`Parameters::parameter`] and
    /// [`Parameters::attribute_list`] in new code.
    ///
    /// # Examples
    ///
    /// ```
    /// use uqparam_rs::distribution::DistributionSpec;
    /// use uqparam_rs::parameters::{AttributeValue, Lookup, Parameters, ParameterValue};
    ///
    /// let params = Parameters::new(vec![
    ///     ("a", 1, DistributionSpec::None),
    ///     ("b", 2, DistributionSpec::None),
    /// ])
    /// .unwrap();
    ///
    /// match params.get("value").unwrap() {
    ///     Lookup::Attributes(values) => assert_eq!(
    ///         values,
    ///         vec![
    ///             AttributeValue::Value(ParameterValue::Int(1)),
    ///             AttributeValue::Value(ParameterValue::Int(2)),
    ///         ]
    ///     ),
    ///     Lookup::Parameter(_) => unreachable!(),
    /// }
    /// ```
    pub fn get(&self, key: &str) -> std::result::Result<Lookup<'_>, ParameterError> {
        if let Some(param) = self.parameter(key) {
            return Ok(Lookup::Parameter(param));
        }

        ParameterAttribute::parse(key)
            .map(|attribute| Lookup::Attributes(self.attribute_list(attribute)))
            .ok_or_else(|| ParameterError::UnknownAttribute {
                attribute: key.to_string(),
            })
    }

    /// Get the uncertain parameters, in order
    pub fn uncertain(&self) -> Vec<&Parameter> {
        self.params.iter().filter(|p| p.is_uncertain()).collect()
    }

    /// List one attribute of every uncertain parameter, in order
    pub fn get_uncertain(&self, attribute: ParameterAttribute) -> Vec<AttributeValue> {
        self.params
            .iter()
            .filter(|p| p.is_uncertain())
            .map(|p| attribute.of(p))
            .collect()
    }

    /// Names of the uncertain parameters, in order
    pub fn uncertain_names(&self) -> Vec<String> {
        self.uncertain()
            .into_iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Set the distribution of one parameter
    pub fn set_distribution(
        &mut self,
        name: &str,
        spec: impl Into<DistributionSpec>,
    ) -> std::result::Result<(), ParameterError> {
        self.parameter_mut(name)
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })?
            .set_distribution(spec)
    }

    /// Set the same distribution specification on every parameter
    ///
    /// A generator is invoked once per parameter with that parameter's own
    /// value. If any parameter fails, no parameter is changed.
    pub fn set_all_distributions(
        &mut self,
        spec: impl Into<DistributionSpec>,
    ) -> std::result::Result<(), ParameterError> {
        let spec = spec.into();

        let resolved = self
            .params
            .iter()
            .map(|p| p.resolve_distribution(&spec))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for (param, distribution) in self.params.iter_mut().zip(resolved) {
            param.replace_distribution(distribution);
        }

        Ok(())
    }

    /// Nominal values of all parameters
    pub fn nominal_values(&self) -> ParameterValues {
        self.params
            .iter()
            .map(|p| (p.name().to_string(), p.value().as_f64()))
            .collect()
    }

    /// Draw a parameter set
    ///
    /// Uncertain parameters are sampled from their distributions, the others
    /// keep their nominal value.
    pub fn sample_uncertain<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ParameterValues> {
        let mut values = ParameterValues::with_capacity(self.params.len());

        for param in &self.params {
            let value = match param.distribution() {
                Some(dist) => dist.sample(rng)?,
                None => param.value().as_f64(),
            };
            values.insert(param.name().to_string(), value);
        }

        Ok(values)
    }

    /// Write the given values into a simulator input file
    ///
    /// Every name in `values` must be a parameter of the collection; this is
    /// checked before the file is touched. Parameters are written in
    /// collection order.
    pub fn set_parameter_values<P: AsRef<Path>>(
        &self,
        path: P,
        values: &ParameterValues,
    ) -> Result<()> {
        if let Some(unknown) = values.keys().find(|name| !self.contains(name)) {
            return Err(ParameterError::ParameterNotFound {
                name: unknown.clone(),
            }
            .into());
        }

        for param in &self.params {
            if let Some(&value) = values.get(param.name()) {
                param.set_parameter_value(path.as_ref(), value)?;
            }
        }

        Ok(())
    }

    /// Restore the nominal value of every parameter in a simulator input file
    pub fn reset_parameter_values<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        for param in &self.params {
            param.reset_parameter_value(path.as_ref())?;
        }
        Ok(())
    }

    /// Save parameters to a JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Save parameters to a JSON string
    pub fn to_json(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }

    /// Load parameters from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load parameters from a JSON string
    ///
    /// Distributions read from JSON are validated.
    ///
    /// # Examples
    ///
    /// ```
    /// use uqparam_rs::parameters::Parameters;
    ///
    /// let json = r#"[
    ///   {"name": "gbar_Na", "value": 120, "distribution": {"type": "uniform", "low": 60.0, "high": 180.0}},
    ///   {"name": "gbar_K", "value": 36}
    /// ]"#;
    ///
    /// let params = Parameters::from_json(json).unwrap();
    /// assert_eq!(params.uncertain_names(), vec!["gbar_Na".to_string()]);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Parameters = serde_json::from_str(json)?;

        for param in &params.params {
            if let Some(dist) = param.distribution() {
                dist.validate().map_err(UqError::from)?;
            }
        }

        Ok(params)
    }
}
