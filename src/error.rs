use crate::distribution::DistributionError;
use crate::parameters::parameter::ParameterError;
use thiserror::Error;

/// Error types for the uqparam-rs library.
#[derive(Error, Debug)]
pub enum UqError {
    /// An argument had the right shape but an unusable value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A specification matched none of the accepted shapes.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// A parameter, attribute or registry entry was not found.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Not implemented functionality.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Invalid state of a configuration object.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Error raised by a model run function.
    #[error("Model evaluation error: {0}")]
    ModelEvaluation(String),

    /// Error while setting up diagnostics output.
    #[error("Logging error: {0}")]
    Logging(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Substitution pattern could not be compiled.
    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),
}

impl From<DistributionError> for UqError {
    fn from(err: DistributionError) -> Self {
        match err {
            DistributionError::InvalidParameters { .. } => UqError::InvalidArgument(err.to_string()),
            DistributionError::GeneratorFailed { .. } | DistributionError::Unrecognized { .. } => {
                UqError::TypeMismatch(err.to_string())
            }
        }
    }
}

impl From<ParameterError> for UqError {
    fn from(err: ParameterError) -> Self {
        match err {
            ParameterError::Distribution { source, .. } => UqError::from(source),
            ParameterError::ParameterNotFound { .. } | ParameterError::UnknownAttribute { .. } => {
                UqError::KeyNotFound(err.to_string())
            }
            ParameterError::InvalidEntry { .. } => UqError::TypeMismatch(err.to_string()),
        }
    }
}

/// Result type alias for uqparam-rs operations.
pub type Result<T> = std::result::Result<T, UqError>;
