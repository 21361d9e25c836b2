//! Configuration for the HitePro contract suite
//!
//! Required:
//!
//! - `HITEPRO_BASE_URL` - hub base URL, e.g. `http://192.168.1.10/rest`
//! - `HITEPRO_USER` / `HITEPRO_PASS` - Basic-Auth credentials
//!
//! Optional:
//!
//! - `HITEPRO_REQUEST_TIMEOUT_SECS` - per-call timeout (default 30)
//! - `HITEPRO_RUN_TIMEOUT_SECS` - overall run timeout (default 60)
//! - `HITEPRO_CONCURRENCY` - checks in flight (default 4)
//! - `HITEPRO_REPORT_DIR` - report directory (default `target/hitepro-report`)
//! - `HITEPRO_CONTRACTS` - YAML contract table replacing the built-in one
//!
//! Values come from the process environment first, then from a dotenv file.
//!
//! # Example
//!
//! ```ignore
//! use hp_config::{EnvFile, HubConfig};
//!
//! let env_file = EnvFile::load_if_exists(".env")?;
//! let config = HubConfig::from_env_with(&env_file)?;
//! ```

mod contracts;
mod env_file;
mod error;
mod hub;

pub use contracts::{load_contract_table, parse_contract_table};
pub use env_file::EnvFile;
pub use error::{ConfigError, ConfigResult};
pub use hub::{
    HubConfig, DEFAULT_CONCURRENCY, DEFAULT_REPORT_DIR, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_RUN_TIMEOUT, ENV_BASE_URL, ENV_CONCURRENCY, ENV_CONTRACTS, ENV_PASSWORD,
    ENV_REPORT_DIR, ENV_REQUEST_TIMEOUT, ENV_RUN_TIMEOUT, ENV_USERNAME,
};
