//! Error types for yarnscan.
//!
//! Only structural failures live here. Scan verdicts such as "findings
//! present" or "audit command failed without output tables" are values of
//! [`ScanOutcome`](crate::model::ScanOutcome), not errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The audit command could not be started at all.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// The lockfile exists but could not be read.
    #[error("failed to read lockfile {}: {source}", path.display())]
    Lockfile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A configuration value is unusable.
    #[error("config error: {field}: {reason}")]
    Config { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lockfile_error_mentions_path() {
        let err = ScanError::Lockfile {
            path: PathBuf::from("/repo/yarn.lock"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/repo/yarn.lock"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn spawn_error_mentions_command() {
        let err = ScanError::Spawn {
            command: "yarn audit".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("yarn audit"));
    }

    #[test]
    fn config_error_display() {
        let err = ScanError::Config {
            field: "default_format".to_string(),
            reason: "unknown format".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "config error: default_format: unknown format"
        );
    }
}
