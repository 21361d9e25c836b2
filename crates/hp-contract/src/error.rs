//! Error types for the setup phase and report writing

use hp_client::ClientError;
use hp_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for the setup phase
pub type SetupResult<T> = Result<T, SetupError>;

/// Fatal errors while fetching the device directory
///
/// Any of these aborts the run before a single check executes.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Network failure or timeout on the directory request
    #[error("directory request {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: ClientError,
    },

    /// The hub answered with something other than 200
    #[error("directory request {endpoint} returned HTTP {status}: {body}")]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The body was not JSON
    #[error("directory request {endpoint} returned a non-JSON body: {body}")]
    NotJson { endpoint: String, body: String },

    /// The body was JSON but not a list of devices
    #[error("directory request {endpoint} returned an invalid directory: {source}")]
    InvalidDirectory {
        endpoint: String,
        #[source]
        source: CoreError,
    },
}

/// Errors while writing report artifacts
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to render HTML report: {0}")]
    Template(#[from] minijinja::Error),
}
