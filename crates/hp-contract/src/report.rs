//! Run report: console summary plus JSON and HTML artifacts

use crate::error::ReportError;
use crate::outcome::{CheckOutcome, CheckResult};
use chrono::{DateTime, Utc};
use minijinja::{context, Environment};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use ulid::Ulid;

const HTML_TEMPLATE: &str = include_str!("report.html.j2");

/// Counts per outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub not_run: usize,
}

/// Aggregated result of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub base_url: String,
    pub directory_size: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: Summary,
    pub results: Vec<CheckResult>,
}

impl RunReport {
    pub fn new(
        base_url: &str,
        directory_size: usize,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        results: Vec<CheckResult>,
    ) -> Self {
        let summary = results.iter().fold(
            Summary {
                total: results.len(),
                ..Summary::default()
            },
            |mut s, r| {
                match r.outcome {
                    CheckOutcome::Passed => s.passed += 1,
                    CheckOutcome::Failed(_) => s.failed += 1,
                    CheckOutcome::Skipped { .. } => s.skipped += 1,
                    CheckOutcome::NotRun { .. } => s.not_run += 1,
                }
                s
            },
        );

        Self {
            run_id: Ulid::new().to_string(),
            base_url: base_url.to_string(),
            directory_size,
            started_at,
            finished_at,
            summary,
            results,
        }
    }

    /// True when nothing failed and nothing was cut off by the run timeout
    pub fn success(&self) -> bool {
        self.summary.failed == 0 && self.summary.not_run == 0
    }

    /// Find a result by its label
    pub fn result(&self, label: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.label == label)
    }

    /// Console rendering of the report
    pub fn render_console(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n=== HitePro Contract Report ===");
        let _ = writeln!(out, "Hub: {}", self.base_url);
        let _ = writeln!(out, "Devices in directory: {}", self.directory_size);
        let _ = writeln!(out);

        for result in &self.results {
            match &result.outcome {
                CheckOutcome::Passed => {
                    let _ = writeln!(out, "✅ {} - PASS", result.label);
                }
                CheckOutcome::Failed(detail) => {
                    let _ = writeln!(out, "❌ {} - FAIL", result.label);
                    let _ = writeln!(
                        out,
                        "   [{:>9}] {} : expected {}, got {} ({})",
                        detail.kind, detail.field, detail.expected, detail.actual, detail.message
                    );
                    let _ = write!(
                        out,
                        "   device {} ({}) {}",
                        detail.device_id, detail.device_type, detail.endpoint
                    );
                    if let Some(payload) = &detail.payload {
                        let _ = write!(out, " payload {}", payload);
                    }
                    let _ = writeln!(out);
                }
                CheckOutcome::Skipped { reason } => {
                    let _ = writeln!(out, "⏭️  {} - SKIPPED ({})", result.label, reason);
                }
                CheckOutcome::NotRun { reason } => {
                    let _ = writeln!(out, "⏱️  {} - NOT RUN ({})", result.label, reason);
                }
            }
        }

        let s = &self.summary;
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Results: {} passed, {} failed, {} skipped, {} not run ({} total)",
            s.passed, s.failed, s.skipped, s.not_run, s.total
        );
        if self.success() {
            let _ = writeln!(out, "✅ All checks passed!");
        } else {
            let _ = writeln!(out, "❌ {} checks failed, {} did not run", s.failed, s.not_run);
        }
        out
    }

    /// Print the console report to stdout
    pub fn print_summary(&self) {
        print!("{}", self.render_console());
    }

    /// Render the HTML artifact
    pub fn render_html(&self) -> Result<String, ReportError> {
        let mut env = Environment::new();
        env.add_template("report.html", HTML_TEMPLATE)?;
        let template = env.get_template("report.html")?;
        Ok(template.render(context! { report => self })?)
    }

    /// Write `report.json` and `report.html` into `dir`, creating it if needed
    pub fn write_artifacts(&self, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
        fs::create_dir_all(dir).map_err(|source| ReportError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let json_path = dir.join("report.json");
        write_file(&json_path, &serde_json::to_string_pretty(self)?)?;

        let html_path = dir.join("report.html");
        write_file(&html_path, &self.render_html()?)?;

        info!("Wrote report artifacts to {:?}", dir);
        Ok(vec![json_path, html_path])
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), ReportError> {
    fs::write(path, content).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}
