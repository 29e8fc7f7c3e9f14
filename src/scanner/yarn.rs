use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{AuditCommand, CommandOutput};
use crate::error::ScanError;

/// `yarn audit` flags that are always passed.
const AUDIT_ARGS: [&str; 2] = ["audit", "--no-color"];

/// Invokes the yarn executable.
pub struct YarnCli {
    program: String,
}

impl YarnCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn describe(&self, args: &[String]) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(AUDIT_ARGS.iter().map(|a| a.to_string()));
        parts.extend(args.iter().cloned());
        parts.join(" ")
    }
}

impl Default for YarnCli {
    fn default() -> Self {
        let program = if cfg!(target_os = "windows") {
            "yarn.cmd"
        } else {
            "yarn"
        };
        Self::new(program)
    }
}

#[async_trait]
impl AuditCommand for YarnCli {
    async fn run(&self, project_dir: &Path, extra_args: &[String]) -> Result<CommandOutput, ScanError> {
        let command = self.describe(extra_args);
        debug!(command = %command, dir = %project_dir.display(), "running audit");

        let output = Command::new(&self.program)
            .args(AUDIT_ARGS)
            .args(extra_args)
            .current_dir(project_dir)
            .output()
            .await
            .map_err(|source| ScanError::Spawn { command, source })?;

        let output = CommandOutput::from(output);
        debug!(status = output.status, "audit finished");
        Ok(output)
    }

    async fn version(&self) -> Result<String, ScanError> {
        let output = Command::new(&self.program)
            .args(["audit", "--version"])
            .output()
            .await
            .map_err(|source| ScanError::Spawn {
                command: format!("{} audit --version", self.program),
                source,
            })?;

        // stdout looks like "1.22.19\n"
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
