//! Dotenv file support
//!
//! Parsing follows the usual dotenv rules (comments, `export`, quoting,
//! escapes in double quotes) via `dotenvy`. The parsed values are kept
//! apart from the process environment so lookups can prefer the latter.

use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Variables parsed from a dotenv file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    vars: HashMap<String, String>,
}

impl EnvFile {
    /// Load a dotenv file; a missing file is an error
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let env_file = Self::parse(&content, path)?;
        debug!("Loaded {} variables from {:?}", env_file.vars.len(), path);
        Ok(env_file)
    }

    /// Load a dotenv file, or return an empty set if it does not exist
    pub fn load_if_exists(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No env file at {:?}", path);
            Ok(Self::default())
        }
    }

    /// Parse dotenv content; `path` is only used for error messages
    ///
    /// Nothing is written to the process environment.
    pub fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        let vars = dotenvy::from_read_iter(content.as_bytes())
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(|source| ConfigError::ParseEnvFile {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { vars })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
