//! Core data types for audit findings and scan reports.
//!
//! - [`Severity`] - Advisory severity as printed by `yarn audit`
//! - [`Vulnerability`] - One normalized advisory row set
//! - [`ScanReport`] - Everything a single scan produced
//! - [`ScanOutcome`] - The terminal state of a scan
//!
//! # Example
//!
//! ```
//! use yarnscan::{ScanOutcome, ScanReport};
//!
//! let report = ScanReport::new("YarnAudit").finish(ScanOutcome::Clean);
//! assert!(report.passed);
//! ```

mod report;
mod vulnerability;

pub use report::*;
pub use vulnerability::*;
