use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Vulnerability;

/// Terminal state of a single scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Every dependency group was excluded, so nothing was audited.
    Misconfigured,
    /// The audit command exited cleanly.
    Clean,
    /// The audit command failed and printed no advisory tables.
    ExecutionFailure { stderr: String, status: i32 },
    /// Advisories were found but all of them are on the exception list.
    AllExempted,
    /// At least one advisory remains after filtering.
    FindingsReported,
}

impl ScanOutcome {
    /// Returns true when the scan should be treated as passing.
    pub fn passed(&self) -> bool {
        matches!(self, ScanOutcome::Clean | ScanOutcome::AllExempted)
    }
}

/// A non-fatal note attached to a report, e.g. a suspicious configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanWarning {
    pub kind: String,
    pub message: String,
}

/// Everything a single scan produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scanner: String,
    pub scanned_at: DateTime<Utc>,
    pub outcome: ScanOutcome,
    pub passed: bool,
    /// Advisory IDs from the exception list that were in effect, coerced to
    /// integers, deduplicated and sorted ascending.
    pub ignored_advisories: Vec<u64>,
    /// Distinct advisory IDs found before the exception list was applied.
    pub found_advisories: Vec<u64>,
    pub warnings: Vec<ScanWarning>,
    pub errors: Vec<String>,
    pub vulnerabilities: Vec<Vulnerability>,
    /// Human-readable rendering of `vulnerabilities`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub log: String,
}

impl ScanReport {
    pub fn new(scanner: impl Into<String>) -> Self {
        Self {
            scanner: scanner.into(),
            scanned_at: Utc::now(),
            outcome: ScanOutcome::Clean,
            passed: true,
            ignored_advisories: Vec::new(),
            found_advisories: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            vulnerabilities: Vec::new(),
            log: String::new(),
        }
    }

    pub fn warn(&mut self, kind: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ScanWarning {
            kind: kind.into(),
            message: message.into(),
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Seals the report with its terminal state.
    pub fn finish(mut self, outcome: ScanOutcome) -> Self {
        self.passed = outcome.passed();
        self.outcome = outcome;
        self
    }
}
