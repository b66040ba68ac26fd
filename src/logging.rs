//! Verbosity configuration and diagnostics output.
//!
//! Diagnostics go through `tracing`. [`dispatch`] builds a subscriber writing
//! either to stderr or, when a file name is given, appending to that file.
//! Each [`Base`](crate::base::Base) keeps its own; [`init_logging`] installs one
//! for the whole process. The `UQPARAM_LOG` environment variable overrides the level
//! with an `EnvFilter` directive.

use crate::error::{Result, UqError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::dispatcher::{self, Dispatch};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt as tracing_fmt, prelude::*, EnvFilter};

/// Environment variable overriding the configured verbosity
pub const LOG_ENV_VAR: &str = "UQPARAM_LOG";

/// Severity levels, from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerboseLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl VerboseLevel {
    /// Name of the level as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            VerboseLevel::Debug => "debug",
            VerboseLevel::Info => "info",
            VerboseLevel::Warning => "warning",
            VerboseLevel::Error => "error",
            VerboseLevel::Critical => "critical",
        }
    }

    /// The most verbose `tracing` level still shown at this verbosity
    ///
    /// `tracing` has no level above `ERROR`, so `Critical` shares it.
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            VerboseLevel::Debug => LevelFilter::DEBUG,
            VerboseLevel::Info => LevelFilter::INFO,
            VerboseLevel::Warning => LevelFilter::WARN,
            VerboseLevel::Error | VerboseLevel::Critical => LevelFilter::ERROR,
        }
    }
}

impl fmt::Display for VerboseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerboseLevel {
    type Err = UqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(VerboseLevel::Debug),
            "info" => Ok(VerboseLevel::Info),
            "warning" | "warn" => Ok(VerboseLevel::Warning),
            "error" => Ok(VerboseLevel::Error),
            "critical" => Ok(VerboseLevel::Critical),
            other => Err(UqError::InvalidArgument(format!(
                "unknown verbose level '{}'",
                other
            ))),
        }
    }
}

/// Build a diagnostics dispatcher for one verbosity and destination
///
/// With `filename` set, diagnostics are appended to that file instead of
/// stderr. The dispatcher is not installed; run code under it with
/// [`tracing::dispatcher::with_default`] or install it with [`init_logging`].
pub fn dispatch(level: VerboseLevel, filename: Option<&Path>) -> Result<Dispatch> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.level_filter().into()));

    let dispatch = match filename {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    UqError::Logging(format!("cannot open log file {}: {}", path.display(), e))
                })?;

            Dispatch::new(
                tracing_subscriber::registry().with(filter).with(
                    tracing_fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true),
                ),
            )
        }
        None => Dispatch::new(
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_fmt::layer().with_writer(std::io::stderr).with_target(true)),
        ),
    };

    Ok(dispatch)
}

/// Install the process-wide diagnostics subscriber
///
/// Only the first successful call in a process installs a subscriber;
/// later calls leave it in place and return `Ok(false)`. A [`Base`] does not
/// need this: it routes its own diagnostics through its own dispatcher.
///
/// [`Base`]: crate::base::Base
///
/// # Returns
///
/// `true` if this call installed the subscriber
pub fn init_logging(level: VerboseLevel, filename: Option<&Path>) -> Result<bool> {
    let installed = dispatcher::set_global_default(dispatch(level, filename)?).is_ok();

    if installed {
        tracing::debug!(level = %level, file = ?filename, "logging initialized");
    }

    Ok(installed)
}
