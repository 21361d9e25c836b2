//! HTTP client for the HitePro hub device API
//!
//! The hub exposes three endpoints, all behind HTTP Basic auth:
//!
//! ```text
//! GET  {base}/devices/                      -> [{"id", "type", ...}, ...]
//! GET  {base}/devices/{id}                  -> {"status": ...}
//! PUT  {base}/devices/{id}/{value}[?query]  -> {"result": "Command send"}
//! ```
//!
//! [`HubApi`] is the seam the contract runner talks to; [`HubClient`] is the
//! reqwest implementation.

mod client;
mod error;
pub mod paths;

pub use client::{ApiResponse, HubApi, HubClient};
pub use error::{ClientError, ClientResult};
pub use reqwest::StatusCode;
