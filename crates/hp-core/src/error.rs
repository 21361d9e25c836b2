//! Error types for directory parsing

use thiserror::Error;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while turning hub JSON into core types
#[derive(Debug, Error)]
pub enum CoreError {
    /// The directory body was not a JSON array
    #[error("device directory must be a JSON array, got {found}")]
    DirectoryNotArray { found: &'static str },

    /// A directory entry could not be parsed as a device
    #[error("invalid device record at index {index}: {source}")]
    InvalidDevice {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}
