//! Per-check results

use serde::Serialize;
use std::fmt;

/// How a check ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// The hub honored the contract
    Passed,
    /// The contract was violated or the call failed
    Failed(FailureDetail),
    /// No device of the requested type exists on this hub
    Skipped { reason: String },
    /// The run deadline passed before the check could finish
    NotRun { reason: String },
}

impl CheckOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, CheckOutcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CheckOutcome::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, CheckOutcome::Skipped { .. })
    }

    pub fn is_not_run(&self) -> bool {
        matches!(self, CheckOutcome::NotRun { .. })
    }

    pub fn failure(&self) -> Option<&FailureDetail> {
        match self {
            CheckOutcome::Failed(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Category of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The response did not satisfy the contract
    Assertion,
    /// Network failure or per-call timeout
    Transport,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Assertion => write!(f, "ASSERTION"),
            FailureKind::Transport => write!(f, "TRANSPORT"),
        }
    }
}

/// Everything needed to reproduce a failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureDetail {
    pub kind: FailureKind,
    pub device_id: String,
    pub device_type: String,
    /// Method and URL, e.g. "PUT http://hub/devices/2/50"
    pub endpoint: String,
    /// Command sent, for command checks
    pub payload: Option<String>,
    /// Response field under test ("status", "result", "http_status", ...)
    pub field: String,
    pub expected: String,
    pub actual: String,
    pub message: String,
}

/// Outcome of one check plus identification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub label: String,
    pub device_type: String,
    pub outcome: CheckOutcome,
    pub duration_ms: u64,
}
