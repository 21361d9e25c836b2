//! Hub connection and run settings

use crate::env_file::EnvFile;
use crate::error::{ConfigError, ConfigResult};
use hp_core::Credentials;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub const ENV_BASE_URL: &str = "HITEPRO_BASE_URL";
pub const ENV_USERNAME: &str = "HITEPRO_USER";
pub const ENV_PASSWORD: &str = "HITEPRO_PASS";
pub const ENV_REQUEST_TIMEOUT: &str = "HITEPRO_REQUEST_TIMEOUT_SECS";
pub const ENV_RUN_TIMEOUT: &str = "HITEPRO_RUN_TIMEOUT_SECS";
pub const ENV_CONCURRENCY: &str = "HITEPRO_CONCURRENCY";
pub const ENV_REPORT_DIR: &str = "HITEPRO_REPORT_DIR";
pub const ENV_CONTRACTS: &str = "HITEPRO_CONTRACTS";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_REPORT_DIR: &str = "target/hitepro-report";

/// Everything needed to run the contract suite against one hub
#[derive(Debug, Clone, PartialEq)]
pub struct HubConfig {
    /// Hub base URL without a trailing slash
    pub base_url: String,
    /// Basic-Auth credentials
    pub credentials: Credentials,
    /// Timeout for each HTTP call
    pub request_timeout: Duration,
    /// Deadline for the whole run of checks
    pub run_timeout: Duration,
    /// Maximum checks in flight
    pub concurrency: usize,
    /// Where report artifacts are written
    pub report_dir: PathBuf,
    /// Contract table file replacing the built-in table
    pub contracts_path: Option<PathBuf>,
}

impl HubConfig {
    /// Load from the process environment only
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_env_with(&EnvFile::default())
    }

    /// Load from the process environment, falling back to a dotenv file
    pub fn from_env_with(env_file: &EnvFile) -> ConfigResult<Self> {
        Self::from_lookup(|key| {
            env::var(key)
                .ok()
                .or_else(|| env_file.get(key).map(String::from))
        })
    }

    /// Load from an arbitrary key lookup
    ///
    /// Empty or whitespace-only values count as unset. All missing required
    /// keys are reported together.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key).filter(|v| !v.trim().is_empty())
        };

        let base_url = get(ENV_BASE_URL);
        let username = get(ENV_USERNAME);
        let password = get(ENV_PASSWORD);

        let missing: Vec<&'static str> = [
            (ENV_BASE_URL, base_url.is_none()),
            (ENV_USERNAME, username.is_none()),
            (ENV_PASSWORD, password.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        let (Some(base_url), Some(username), Some(password)) = (base_url, username, password)
        else {
            return Err(ConfigError::MissingVars { vars: missing });
        };

        let base_url = validate_base_url(&base_url)?;

        let request_timeout = match get(ENV_REQUEST_TIMEOUT) {
            Some(raw) => parse_seconds(ENV_REQUEST_TIMEOUT, &raw)?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };
        let run_timeout = match get(ENV_RUN_TIMEOUT) {
            Some(raw) => parse_seconds(ENV_RUN_TIMEOUT, &raw)?,
            None => DEFAULT_RUN_TIMEOUT,
        };
        let concurrency = match get(ENV_CONCURRENCY) {
            Some(raw) => parse_positive(ENV_CONCURRENCY, &raw)?,
            None => DEFAULT_CONCURRENCY,
        };

        let config = Self {
            base_url,
            credentials: Credentials::new(username, password),
            request_timeout,
            run_timeout,
            concurrency,
            report_dir: get(ENV_REPORT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR)),
            contracts_path: get(ENV_CONTRACTS).map(PathBuf::from),
        };

        debug!(
            "Loaded hub config for {} as {}",
            config.base_url,
            config.credentials.username()
        );
        Ok(config)
    }

    /// Replace the base URL, validating it the same way as the env value
    pub fn with_base_url(mut self, base_url: &str) -> ConfigResult<Self> {
        self.base_url = validate_base_url(base_url)?;
        Ok(self)
    }
}

fn validate_base_url(raw: &str) -> ConfigResult<String> {
    let url = raw.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            key: ENV_BASE_URL.to_string(),
            reason: format!("'{}' must start with http:// or https://", url),
        });
    }
    Ok(url.trim_end_matches('/').to_string())
}

/// Parse a positive whole number of seconds
fn parse_seconds(key: &str, raw: &str) -> ConfigResult<Duration> {
    parse_positive(key, raw).map(|secs| Duration::from_secs(secs as u64))
}

fn parse_positive(key: &str, raw: &str) -> ConfigResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(_) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("'{}' is not a positive integer", raw.trim()),
        }),
    }
}
