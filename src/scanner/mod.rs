//! Running `yarn audit` and turning its output into a [`ScanReport`](crate::model::ScanReport).
//!
//! The [`AuditCommand`] trait abstracts the process invocation so the scan
//! procedure can be driven by captured output. [`YarnCli`] is the real
//! implementation; [`YarnAuditScanner`] runs the whole procedure.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use yarnscan::scanner::{YarnAuditScanner, YarnCli};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let project = Path::new(".");
//!     let scanner = YarnAuditScanner::new(YarnCli::default());
//!
//!     if scanner.should_run(project) {
//!         let report = scanner.scan(project).await?;
//!         println!("passed: {}", report.passed);
//!     }
//!     Ok(())
//! }
//! ```

mod audit;
mod yarn;

pub use audit::{process_output, YarnAuditScanner, SCANNER_NAME};
pub use yarn::YarnCli;

use std::path::Path;

use async_trait::async_trait;

use crate::error::ScanError;

/// Captured result of one audit command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit status; -1 when the process was terminated by a signal.
    pub status: i32,
}

impl CommandOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, status: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            status,
        }
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code().unwrap_or(-1),
        }
    }
}

/// Runs the package manager's audit command.
#[async_trait]
pub trait AuditCommand: Send + Sync {
    /// Runs the audit in `project_dir` with `extra_args` appended.
    ///
    /// A non-zero exit is not an error here; it is reported through
    /// [`CommandOutput::status`].
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Spawn`] if the process could not be started.
    async fn run(&self, project_dir: &Path, extra_args: &[String]) -> Result<CommandOutput, ScanError>;

    /// Returns the audit tool's version string, trimmed.
    async fn version(&self) -> Result<String, ScanError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output_success() {
        assert!(CommandOutput::new("", "", 0).success());
        assert!(!CommandOutput::new("", "", 12).success());
        assert!(!CommandOutput::new("", "", -1).success());
    }
}
