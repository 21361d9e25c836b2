//! Core types for the HitePro device contract suite
//!
//! This crate holds everything that does not need the network:
//!
//! - [`Device`] and [`DeviceDirectory`] - the hub's device list and lookup
//! - [`Credentials`] - Basic-Auth credentials and header encoding
//! - [`StatusCheck`] - strict validators for device `status` values
//! - [`ContractRow`] / [`ContractTable`] - the declarative contract table
//!
//! # Example
//!
//! ```
//! use hp_core::{ContractTable, StatusCheck};
//! use serde_json::json;
//!
//! let table = ContractTable::hitepro();
//! assert!(!table.rows().is_empty());
//!
//! let dimmer = StatusCheck::IntegerRange { min: 0, max: 100 };
//! assert!(dimmer.validate(&json!(50)).is_ok());
//! assert!(dimmer.validate(&json!(50.5)).is_err());
//! ```

pub mod auth;
pub mod check;
pub mod contract;
pub mod device;
mod error;

pub use auth::{basic_auth_header, Credentials};
pub use check::{StatusCheck, Violation};
pub use contract::{
    CheckKind, CheckSpec, CommandSpec, ContractRow, ContractTable, DeviceTypeSelector,
    COMMAND_ACK,
};
pub use device::{Device, DeviceDirectory};
pub use error::{CoreError, CoreResult};
