//! Error types for configuration loading

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required variables are unset or empty
    #[error("missing required configuration: {}", vars.join(", "))]
    MissingVars { vars: Vec<&'static str> },

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// Failed to read a file
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed dotenv file
    #[error("failed to parse {path}: {source}")]
    ParseEnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    /// Failed to parse a contract table
    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
