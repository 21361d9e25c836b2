//! Contract check runner

use crate::outcome::{CheckOutcome, CheckResult, FailureDetail, FailureKind};
use crate::report::RunReport;
use crate::setup::{excerpt, RunContext};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use hp_client::{paths, ApiResponse, ClientError, HubApi};
use hp_core::{CheckKind, CheckSpec, CommandSpec, ContractTable, Device, StatusCheck};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Scheduling limits for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Maximum checks in flight
    pub concurrency: usize,
    /// Deadline for all checks, measured from the start of the run
    pub run_timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            run_timeout: Duration::from_secs(60),
        }
    }
}

/// Roughly 30 years; stands in for timeouts too large to add to an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

fn run_deadline(start: Instant, run_timeout: Duration) -> Instant {
    start
        .checked_add(run_timeout)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

/// Executes a contract table against a hub
pub struct ContractRunner<'a> {
    api: &'a dyn HubApi,
    options: RunOptions,
}

impl<'a> ContractRunner<'a> {
    pub fn new(api: &'a dyn HubApi, options: RunOptions) -> Self {
        Self { api, options }
    }

    /// Run every check of `table`
    ///
    /// Checks are independent: a failing check never stops the others.
    /// Results come back in table order regardless of completion order.
    pub async fn run(&self, ctx: &RunContext, table: &ContractTable) -> RunReport {
        let started_at = Utc::now();
        let deadline = run_deadline(Instant::now(), self.options.run_timeout);
        let checks = table.checks();

        info!(
            "Running {} checks against {} (concurrency {})",
            checks.len(),
            self.api.base_url(),
            self.options.concurrency
        );

        let results: Vec<CheckResult> = stream::iter(checks.iter())
            .map(|spec| self.run_check(ctx, spec, deadline))
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        RunReport::new(
            self.api.base_url(),
            ctx.directory().len(),
            started_at,
            Utc::now(),
            results,
        )
    }

    async fn run_check(
        &self,
        ctx: &RunContext,
        spec: &CheckSpec,
        deadline: Instant,
    ) -> CheckResult {
        let label = spec.label();
        let started = Instant::now();

        let outcome = if started >= deadline {
            CheckOutcome::NotRun {
                reason: "run timeout elapsed before the check started".to_string(),
            }
        } else {
            match tokio::time::timeout_at(deadline, self.execute(ctx, spec)).await {
                Ok(outcome) => outcome,
                Err(_) => CheckOutcome::NotRun {
                    reason: "run timeout elapsed while the check was in flight".to_string(),
                },
            }
        };

        match &outcome {
            CheckOutcome::Passed => info!("PASS {}", label),
            CheckOutcome::Failed(detail) => warn!("FAIL {}: {}", label, detail.message),
            CheckOutcome::Skipped { reason } => info!("SKIP {}: {}", label, reason),
            CheckOutcome::NotRun { reason } => warn!("NOT RUN {}: {}", label, reason),
        }

        CheckResult {
            label,
            device_type: spec.device_type.to_string(),
            outcome,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    async fn execute(&self, ctx: &RunContext, spec: &CheckSpec) -> CheckOutcome {
        let Some(device) = spec.device_type.resolve(ctx.directory()) else {
            return CheckOutcome::Skipped {
                reason: spec.device_type.not_found_reason(),
            };
        };
        debug!("{} resolved to device {}", spec.device_type, device.id);

        match &spec.kind {
            CheckKind::Status(check) => self.check_status(device, check).await,
            CheckKind::Command(command) => self.check_command(device, command).await,
        }
    }

    async fn check_status(&self, device: &Device, check: &StatusCheck) -> CheckOutcome {
        let path = paths::device(&device.id);
        let probe = Probe::new(device, format!("GET {}", self.api.url(&path)), None);

        let response = match self.api.get(&path).await {
            Ok(response) => response,
            Err(e) => return probe.transport(e),
        };
        if let Err(outcome) = probe.expect_ok(&response) {
            return outcome;
        }

        let Some(status) = response.field("status") else {
            return probe.assertion(
                "status",
                "field 'status' present",
                body_text(&response),
                "response has no 'status' field",
            );
        };

        match check.validate(status) {
            Ok(()) => CheckOutcome::Passed,
            Err(violation) => probe.assertion(
                "status",
                violation.expected,
                violation.actual.to_string(),
                violation.reason,
            ),
        }
    }

    async fn check_command(&self, device: &Device, command: &CommandSpec) -> CheckOutcome {
        let path = paths::command(&device.id, &command.value, command.query.as_deref());
        let probe = Probe::new(
            device,
            format!("PUT {}", self.api.url(&path)),
            Some(command.to_string()),
        );

        let response = match self.api.put(&path).await {
            Ok(response) => response,
            Err(e) => return probe.transport(e),
        };
        if let Err(outcome) = probe.expect_ok(&response) {
            return outcome;
        }

        let expected = Value::String(command.expected_result.clone());
        match response.field("result") {
            Some(result) if *result == expected => CheckOutcome::Passed,
            Some(result) => probe.assertion(
                "result",
                expected.to_string(),
                result.to_string(),
                "acknowledgement text does not match",
            ),
            None => probe.assertion(
                "result",
                expected.to_string(),
                body_text(&response),
                "response has no 'result' field",
            ),
        }
    }
}

/// Request identity shared by every failure of one check
struct Probe {
    device_id: String,
    device_type: String,
    endpoint: String,
    payload: Option<String>,
}

impl Probe {
    fn new(device: &Device, endpoint: String, payload: Option<String>) -> Self {
        Self {
            device_id: device.id.clone(),
            device_type: device.device_type.clone(),
            endpoint,
            payload,
        }
    }

    fn fail(
        &self,
        kind: FailureKind,
        field: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
        message: impl Into<String>,
    ) -> CheckOutcome {
        CheckOutcome::Failed(FailureDetail {
            kind,
            device_id: self.device_id.clone(),
            device_type: self.device_type.clone(),
            endpoint: self.endpoint.clone(),
            payload: self.payload.clone(),
            field: field.to_string(),
            expected: expected.into(),
            actual: actual.into(),
            message: message.into(),
        })
    }

    fn assertion(
        &self,
        field: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
        message: impl Into<String>,
    ) -> CheckOutcome {
        self.fail(FailureKind::Assertion, field, expected, actual, message)
    }

    fn transport(&self, error: ClientError) -> CheckOutcome {
        let actual = if error.is_timeout() {
            "timeout"
        } else {
            "no response"
        };
        self.fail(
            FailureKind::Transport,
            "response",
            "HTTP response",
            actual,
            error.to_string(),
        )
    }

    /// Require HTTP 200 and a JSON body
    fn expect_ok(&self, response: &ApiResponse) -> Result<(), CheckOutcome> {
        if response.status.as_u16() != 200 {
            return Err(self.assertion(
                "http_status",
                "200",
                response.status.as_u16().to_string(),
                format!("unexpected HTTP status {}", response.status),
            ));
        }
        if response.body.is_none() {
            return Err(self.assertion(
                "body",
                "JSON body",
                excerpt(&response.raw_body),
                "response body is not valid JSON",
            ));
        }
        Ok(())
    }
}

fn body_text(response: &ApiResponse) -> String {
    match &response.body {
        Some(body) => excerpt(&body.to_string()),
        None => excerpt(&response.raw_body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hp_client::{ClientResult, StatusCode};
    use hp_core::{ContractRow, DeviceDirectory};
    use serde_json::json;
    use std::collections::HashMap;

    /// Canned responses keyed by path; unknown paths time out
    struct ScriptedHub {
        responses: HashMap<String, (u16, String)>,
    }

    impl ScriptedHub {
        fn new(responses: &[(&str, u16, &str)]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|(path, status, body)| (path.to_string(), (*status, body.to_string())))
                    .collect(),
            }
        }

        fn respond(&self, path: &str) -> ClientResult<ApiResponse> {
            let Some((status, raw)) = self.responses.get(path) else {
                return Err(ClientError::Timeout {
                    url: self.url(path),
                });
            };
            Ok(ApiResponse {
                status: StatusCode::from_u16(*status).unwrap(),
                body: serde_json::from_str(raw).ok(),
                raw_body: raw.clone(),
            })
        }
    }

    #[async_trait]
    impl HubApi for ScriptedHub {
        fn base_url(&self) -> &str {
            "http://hub.test"
        }

        async fn get(&self, path: &str) -> ClientResult<ApiResponse> {
            self.respond(path)
        }

        async fn put(&self, path: &str) -> ClientResult<ApiResponse> {
            self.respond(path)
        }
    }

    fn context() -> RunContext {
        let directory = DeviceDirectory::from_json(&json!([
            {"id": "1", "type": "switch"},
            {"id": "2", "type": "dimmer"},
        ]))
        .unwrap();
        RunContext::from_directory(directory)
    }

    async fn run(hub: &ScriptedHub, rows: Vec<ContractRow>) -> RunReport {
        ContractRunner::new(hub, RunOptions::default())
            .run(&context(), &ContractTable::new(rows))
            .await
    }

    #[tokio::test]
    async fn test_non_200_status_is_assertion_failure() {
        let hub = ScriptedHub::new(&[("/devices/1", 503, "busy")]);
        let report = run(&hub, vec![ContractRow::new("switch").status(StatusCheck::Boolean)]).await;

        let detail = report.results[0].outcome.failure().unwrap();
        assert_eq!(detail.kind, FailureKind::Assertion);
        assert_eq!(detail.field, "http_status");
        assert_eq!(detail.expected, "200");
        assert_eq!(detail.actual, "503");
    }

    #[tokio::test]
    async fn test_non_json_body_fails() {
        let hub = ScriptedHub::new(&[("/devices/1", 200, "<html>ok</html>")]);
        let report = run(&hub, vec![ContractRow::new("switch").status(StatusCheck::Boolean)]).await;

        let detail = report.results[0].outcome.failure().unwrap();
        assert_eq!(detail.field, "body");
        assert_eq!(detail.actual, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_transport_error_is_reported_not_raised() {
        let hub = ScriptedHub::new(&[("/devices/2", 200, r#"{"status": 40}"#)]);
        let report = run(
            &hub,
            vec![
                ContractRow::new("switch").status(StatusCheck::Boolean),
                ContractRow::new("dimmer").status(StatusCheck::IntegerRange { min: 0, max: 100 }),
            ],
        )
        .await;

        let detail = report.results[0].outcome.failure().unwrap();
        assert_eq!(detail.kind, FailureKind::Transport);
        assert_eq!(detail.actual, "timeout");
        assert_eq!(detail.endpoint, "GET http://hub.test/devices/1");
        assert!(report.results[1].outcome.is_passed());
    }

    #[tokio::test]
    async fn test_command_without_result_field_fails() {
        let hub = ScriptedHub::new(&[("/devices/2/50", 200, r#"{"ok": true}"#)]);
        let report = run(
            &hub,
            vec![ContractRow::new("dimmer").command(CommandSpec::new(50))],
        )
        .await;

        let detail = report.results[0].outcome.failure().unwrap();
        assert_eq!(detail.field, "result");
        assert_eq!(detail.message, "response has no 'result' field");
        assert_eq!(detail.payload.as_deref(), Some("50"));
    }

    #[tokio::test]
    async fn test_custom_acknowledgement() {
        let hub = ScriptedHub::new(&[("/devices/1/1", 200, r#"{"result": "done"}"#)]);
        let report = run(
            &hub,
            vec![ContractRow::new("switch").command(CommandSpec::new(1).expecting("done"))],
        )
        .await;

        assert!(report.results[0].outcome.is_passed());
    }

    #[test]
    fn test_run_deadline_saturates() {
        let start = Instant::now();
        assert_eq!(run_deadline(start, Duration::from_secs(5)), start + Duration::from_secs(5));
        assert_eq!(run_deadline(start, Duration::from_secs(u64::MAX)), start + FAR_FUTURE);
    }

    #[tokio::test]
    async fn test_huge_run_timeout_does_not_overflow() {
        let hub = ScriptedHub::new(&[("/devices/1", 200, r#"{"status": true}"#)]);
        let report = ContractRunner::new(
            &hub,
            RunOptions {
                concurrency: 1,
                run_timeout: Duration::from_secs(u64::MAX),
            },
        )
        .run(
            &context(),
            &ContractTable::new(vec![ContractRow::new("switch").status(StatusCheck::Boolean)]),
        )
        .await;

        assert!(report.success());
        assert_eq!(report.summary.passed, 1);
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_runs() {
        let hub = ScriptedHub::new(&[("/devices/1", 200, r#"{"status": false}"#)]);
        let report = ContractRunner::new(
            &hub,
            RunOptions {
                concurrency: 0,
                run_timeout: Duration::from_secs(5),
            },
        )
        .run(
            &context(),
            &ContractTable::new(vec![ContractRow::new("switch").status(StatusCheck::Boolean)]),
        )
        .await;

        assert!(report.success());
        assert_eq!(report.summary.passed, 1);
    }
}
