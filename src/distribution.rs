//! # Probability Distributions
//!
//! Distributions attached to uncertain parameters, and the generator functions
//! that derive a distribution from a parameter's nominal value.
//!
//! A parameter's uncertainty is specified with a [`DistributionSpec`]:
//!
//! - [`DistributionSpec::None`]: the parameter is not uncertain
//! - [`DistributionSpec::Distribution`]: a ready-made distribution, stored verbatim
//! - [`DistributionSpec::Generator`]: a function invoked once with the nominal value
//!
//! ```
//! use uqparam_rs::distribution::{self, Distribution};
//!
//! let generator = distribution::uniform(0.5);
//! let dist = generator.generate(10.0).unwrap();
//! assert_eq!(dist, Distribution::uniform(7.5, 12.5).unwrap());
//! ```

use rand::Rng;
use rand_distr::{Distribution as _, LogNormal, Normal, Uniform};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur when building or resolving distributions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistributionError {
    #[error("Invalid {kind} distribution: {message}")]
    InvalidParameters { kind: &'static str, message: String },

    #[error("generator did not return a distribution (nominal value {value})")]
    GeneratorFailed { value: f64 },

    #[error("argument is neither a generator nor a distribution (found {found})")]
    Unrecognized { found: String },
}

/// A probability distribution for an uncertain parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Distribution {
    /// Gaussian distribution
    Normal { mean: f64, std_dev: f64 },

    /// Continuous uniform distribution on `[low, high)`
    Uniform { low: f64, high: f64 },

    /// Log-normal distribution, `ln(X) ~ Normal(mu, sigma)`
    LogNormal { mu: f64, sigma: f64 },
}

impl Distribution {
    /// Create a normal distribution
    ///
    /// # Examples
    ///
    /// ```
    /// use uqparam_rs::distribution::Distribution;
    ///
    /// assert!(Distribution::normal(1.0, 0.1).is_ok());
    /// assert!(Distribution::normal(1.0, -0.1).is_err());
    /// ```
    pub fn normal(mean: f64, std_dev: f64) -> Result<Self, DistributionError> {
        let dist = Distribution::Normal { mean, std_dev };
        dist.validate()?;
        Ok(dist)
    }

    /// Create a uniform distribution on `[low, high)`
    pub fn uniform(low: f64, high: f64) -> Result<Self, DistributionError> {
        let dist = Distribution::Uniform { low, high };
        dist.validate()?;
        Ok(dist)
    }

    /// Create a log-normal distribution
    pub fn log_normal(mu: f64, sigma: f64) -> Result<Self, DistributionError> {
        let dist = Distribution::LogNormal { mu, sigma };
        dist.validate()?;
        Ok(dist)
    }

    /// Name of the distribution family
    pub fn kind(&self) -> &'static str {
        match self {
            Distribution::Normal { .. } => "normal",
            Distribution::Uniform { .. } => "uniform",
            Distribution::LogNormal { .. } => "log_normal",
        }
    }

    /// Check that the distribution parameters describe a proper distribution
    pub fn validate(&self) -> Result<(), DistributionError> {
        let invalid = |message: String| DistributionError::InvalidParameters {
            kind: self.kind(),
            message,
        };

        match *self {
            Distribution::Normal { mean, std_dev } => {
                if !mean.is_finite() {
                    return Err(invalid(format!("mean must be finite, got {}", mean)));
                }
                if !(std_dev.is_finite() && std_dev > 0.0) {
                    return Err(invalid(format!(
                        "standard deviation must be positive, got {}",
                        std_dev
                    )));
                }
            }
            Distribution::Uniform { low, high } => {
                if !(low.is_finite() && high.is_finite()) {
                    return Err(invalid(format!("bounds must be finite, got [{}, {})", low, high)));
                }
                if low >= high {
                    return Err(invalid(format!("empty interval [{}, {})", low, high)));
                }
                if !(high - low).is_finite() {
                    return Err(invalid(format!(
                        "interval [{}, {}) is too wide to sample",
                        low, high
                    )));
                }
            }
            Distribution::LogNormal { mu, sigma } => {
                if !mu.is_finite() {
                    return Err(invalid(format!("mu must be finite, got {}", mu)));
                }
                if !(sigma.is_finite() && sigma > 0.0) {
                    return Err(invalid(format!("sigma must be positive, got {}", sigma)));
                }
            }
        }

        Ok(())
    }

    /// Draw one sample from the distribution
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, DistributionError> {
        self.validate()?;

        let value = match *self {
            Distribution::Normal { mean, std_dev } => Normal::new(mean, std_dev)
                .map_err(|e| DistributionError::InvalidParameters {
                    kind: self.kind(),
                    message: e.to_string(),
                })?
                .sample(rng),
            Distribution::Uniform { low, high } => Uniform::new(low, high).sample(rng),
            Distribution::LogNormal { mu, sigma } => LogNormal::new(mu, sigma)
                .map_err(|e| DistributionError::InvalidParameters {
                    kind: self.kind(),
                    message: e.to_string(),
                })?
                .sample(rng),
        };

        Ok(value)
    }

    /// Expected value of the distribution
    pub fn mean(&self) -> f64 {
        match *self {
            Distribution::Normal { mean, .. } => mean,
            Distribution::Uniform { low, high } => 0.5 * (low + high),
            Distribution::LogNormal { mu, sigma } => (mu + 0.5 * sigma * sigma).exp(),
        }
    }

    /// Variance of the distribution
    pub fn variance(&self) -> f64 {
        match *self {
            Distribution::Normal { std_dev, .. } => std_dev * std_dev,
            Distribution::Uniform { low, high } => (high - low).powi(2) / 12.0,
            Distribution::LogNormal { mu, sigma } => {
                let s2 = sigma * sigma;
                (s2.exp() - 1.0) * (2.0 * mu + s2).exp()
            }
        }
    }
}

type GeneratorFn = dyn Fn(f64) -> Option<Distribution> + Send + Sync;

/// A function that maps a nominal parameter value to a distribution
///
/// Generators are used for relative uncertainty specifications, where the width
/// of the distribution depends on the value of the parameter it is attached to.
#[derive(Clone)]
pub struct Generator {
    label: String,
    func: Arc<GeneratorFn>,
}

impl Generator {
    /// Create a generator from a closure
    pub fn new<F>(label: &str, func: F) -> Self
    where
        F: Fn(f64) -> Option<Distribution> + Send + Sync + 'static,
    {
        Self {
            label: label.to_string(),
            func: Arc::new(func),
        }
    }

    /// Descriptive label of the generator
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Invoke the generator with a nominal value
    ///
    /// Fails with [`DistributionError::GeneratorFailed`] if the generator yields
    /// nothing or an improper distribution.
    pub fn generate(&self, value: f64) -> Result<Distribution, DistributionError> {
        match (self.func)(value) {
            Some(dist) if dist.validate().is_ok() => Ok(dist),
            _ => Err(DistributionError::GeneratorFailed { value }),
        }
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator").field("label", &self.label).finish()
    }
}

/// Uniform distribution of relative width `interval` centred on the nominal value
///
/// The generated distribution is
/// `Uniform(v - |interval / 2 * v|, v + |interval / 2 * v|)`.
pub fn uniform(interval: f64) -> Generator {
    Generator::new(&format!("uniform({})", interval), move |value| {
        let half_width = (interval / 2.0 * value).abs();
        Distribution::uniform(value - half_width, value + half_width).ok()
    })
}

/// Normal distribution centred on the nominal value with standard deviation `|interval * v|`
pub fn normal(interval: f64) -> Generator {
    Generator::new(&format!("normal({})", interval), move |value| {
        Distribution::normal(value, (interval * value).abs()).ok()
    })
}

/// How the uncertainty of a parameter is specified
#[derive(Debug, Clone, Default)]
pub enum DistributionSpec {
    /// The parameter is not uncertain
    #[default]
    None,

    /// A distribution stored as given
    Distribution(Distribution),

    /// A generator invoked with the parameter's nominal value
    Generator(Generator),
}

/// Generator references accepted in configuration files
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "generator", rename_all = "snake_case")]
enum GeneratorConfig {
    Uniform { interval: f64 },
    Normal { interval: f64 },
}

impl DistributionSpec {
    /// Resolve a specification into a concrete distribution for `value`
    pub fn resolve(&self, value: f64) -> Result<Option<Distribution>, DistributionError> {
        match self {
            DistributionSpec::None => Ok(None),
            DistributionSpec::Distribution(dist) => Ok(Some(*dist)),
            DistributionSpec::Generator(generator) => generator.generate(value).map(Some),
        }
    }

    /// Build a specification from a configuration value
    ///
    /// Accepts `null`, a distribution object tagged by `"type"`, or a generator
    /// reference such as `{"generator": "uniform", "interval": 0.1}`. Anything
    /// else is [`DistributionError::Unrecognized`].
    pub fn from_config(value: &Value) -> Result<Self, DistributionError> {
        match value {
            Value::Null => Ok(DistributionSpec::None),
            Value::Object(map) if map.contains_key("type") => {
                let dist: Distribution = serde_json::from_value(value.clone()).map_err(|e| {
                    DistributionError::Unrecognized {
                        found: e.to_string(),
                    }
                })?;
                dist.validate()?;
                Ok(DistributionSpec::Distribution(dist))
            }
            Value::Object(map) if map.contains_key("generator") => {
                let config: GeneratorConfig =
                    serde_json::from_value(value.clone()).map_err(|e| {
                        DistributionError::Unrecognized {
                            found: e.to_string(),
                        }
                    })?;
                let generator = match config {
                    GeneratorConfig::Uniform { interval } => uniform(interval),
                    GeneratorConfig::Normal { interval } => normal(interval),
                };
                Ok(DistributionSpec::Generator(generator))
            }
            other => Err(DistributionError::Unrecognized {
                found: describe_value(other).to_string(),
            }),
        }
    }
}

impl From<Distribution> for DistributionSpec {
    fn from(dist: Distribution) -> Self {
        DistributionSpec::Distribution(dist)
    }
}

impl From<Option<Distribution>> for DistributionSpec {
    fn from(dist: Option<Distribution>) -> Self {
        match dist {
            Some(dist) => DistributionSpec::Distribution(dist),
            None => DistributionSpec::None,
        }
    }
}

impl From<Generator> for DistributionSpec {
    fn from(generator: Generator) -> Self {
        DistributionSpec::Generator(generator)
    }
}

pub(crate) fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
