pub mod audit;
pub mod config;
pub mod error;
pub mod lockfile;
pub mod model;
pub mod output;
pub mod scanner;

pub use config::Config;
pub use error::ScanError;
pub use lockfile::LockfileIndex;
pub use model::{ScanOutcome, ScanReport, Severity, Vulnerability};
pub use scanner::{YarnAuditScanner, YarnCli};
