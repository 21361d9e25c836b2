//! Table-driven contract checks for the HitePro hub device API
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   GET /devices/ (once)   ┌─────────────┐
//! │  RunContext  │◄─────────────────────────│             │
//! └──────┬───────┘                          │  HitePro    │
//!        │ read-only                        │  hub        │
//! ┌──────▼───────┐   GET /devices/{id}      │  (HubApi)   │
//! │ContractRunner│─────────────────────────►│             │
//! │  (buffered)  │   PUT /devices/{id}/{v}  │             │
//! └──────┬───────┘                          └─────────────┘
//!        │
//! ┌──────▼───────┐
//! │  RunReport   │  console / report.json / report.html
//! └──────────────┘
//! ```
//!
//! A run is two phases. [`RunContext::fetch`] reads the device directory
//! exactly once; any failure there is a [`SetupError`] and no check runs.
//! [`ContractRunner::run`] then executes every check of a
//! [`ContractTable`](hp_core::ContractTable), each ending as passed,
//! failed, skipped (device type absent) or not run (run deadline).

pub mod error;
pub mod outcome;
pub mod report;
pub mod runner;
pub mod setup;

pub use error::{ReportError, SetupError, SetupResult};
pub use outcome::{CheckOutcome, CheckResult, FailureDetail, FailureKind};
pub use report::{RunReport, Summary};
pub use runner::{ContractRunner, RunOptions};
pub use setup::RunContext;

use hp_client::HubApi;
use hp_core::ContractTable;

/// Fetch the directory, then run every check of `table`
pub async fn run_suite(
    api: &dyn HubApi,
    table: &ContractTable,
    options: RunOptions,
) -> SetupResult<RunReport> {
    let ctx = RunContext::fetch(api).await?;
    Ok(ContractRunner::new(api, options).run(&ctx, table).await)
}
