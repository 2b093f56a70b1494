//! Error handling for zerolab settings
//!
//! Configuration loading has exactly one failure kind: [`ConfigurationError`].
//! Every variant is fatal to process startup.

use std::path::PathBuf;
use thiserror::Error;

/// Error raised while reading, coercing or validating configuration
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Set the {name} environment variable")]
    MissingVariable { name: String },

    #[error("Invalid value for {name}: {value:?} is not a valid {expected}")]
    InvalidValue {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid URL in {name}: {source}")]
    InvalidUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported scheme {scheme:?} in {name}")]
    UnsupportedScheme { name: String, scheme: String },

    #[error("Failed to read environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigurationError>;

impl ConfigurationError {
    /// Name of the environment variable involved, if any
    pub fn variable(&self) -> Option<&str> {
        match self {
            ConfigurationError::MissingVariable { name }
            | ConfigurationError::InvalidValue { name, .. }
            | ConfigurationError::InvalidUrl { name, .. }
            | ConfigurationError::UnsupportedScheme { name, .. } => Some(name.as_str()),
            ConfigurationError::EnvFile { .. }
            | ConfigurationError::InvalidPattern { .. }
            | ConfigurationError::Invalid(_) => None,
        }
    }

    pub(crate) fn invalid_value(name: &str, value: &str, expected: &'static str) -> Self {
        ConfigurationError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
            expected,
        }
    }
}
