//! Experiment configuration files.
//!
//! An experiment is described by a JSON document naming the model and the
//! features, listing the parameters, and setting the verbosity:
//!
//! ```json
//! {
//!   "model": "hodgkin_huxley",
//!   "features": "spike_count",
//!   "parameters": [
//!     ["gbar_Na", 120, {"generator": "uniform", "interval": 0.1}],
//!     {"name": "gbar_K", "value": 36, "distribution": null}
//!   ],
//!   "verbose_level": "warning",
//!   "verbose_filename": "experiment.log"
//! }
//! ```
//!
//! Model and features names are resolved through a [`Registry`].

use crate::base::{Base, ParameterBase};
use crate::error::Result;
use crate::logging::VerboseLevel;
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// An experiment configuration as read from JSON
///
/// `model`, `features` and `parameters` are kept as raw values until
/// [`ExperimentConfig::build`] resolves them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Name of a registered model or run function, or `null`
    pub model: Value,

    /// Name of a registered features object or feature function, or `null`
    pub features: Value,

    /// List of parameter entries, or `null`
    pub parameters: Value,

    /// Verbosity of diagnostics
    pub verbose_level: VerboseLevel,

    /// File diagnostics are appended to instead of stderr
    pub verbose_filename: Option<PathBuf>,
}

impl ExperimentConfig {
    /// Load a configuration from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Save the configuration to a JSON string
    pub fn to_json(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }

    /// Resolve the configuration into a [`ParameterBase`]
    ///
    /// # Arguments
    ///
    /// * `registry` - Run functions, feature functions and factories the
    ///   configuration may name
    ///
    /// # Returns
    ///
    /// The resolved experiment, or the first resolution error
    pub fn build(&self, registry: &Registry) -> Result<ParameterBase> {
        let mut builder = Base::builder().verbose_level(self.verbose_level);
        if let Some(path) = &self.verbose_filename {
            builder = builder.verbose_filename(path.clone());
        }

        let mut base = builder.build()?;
        base.set_model_from_config(&self.model, registry)?;
        base.set_features_from_config(&self.features, registry)?;

        let mut experiment = ParameterBase::new(base, None)?;
        experiment.set_parameters_from_config(&self.parameters)?;

        experiment.base().in_scope(|| {
            tracing::info!(
                model = %experiment.model().name(),
                features = ?experiment.features().features_to_run(),
                "experiment configured"
            )
        });

        Ok(experiment)
    }
}
