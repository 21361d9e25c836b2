//! Error types for hub requests

use thiserror::Error;

/// Result type for hub requests
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the hub
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying HTTP client could not be constructed
    #[error("failed to build HTTP client: {source}")]
    Build {
        #[source]
        source: reqwest::Error,
    },

    /// The request did not complete within the per-call timeout
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// Connection, TLS or body read failure
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ClientError::Timeout {
                url: url.to_string(),
            }
        } else {
            ClientError::Request {
                url: url.to_string(),
                source,
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }
}
