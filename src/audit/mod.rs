//! Parsing and normalization of `yarn audit` text output.
//!
//! ```text
//! stdout --> find_table_region --> parse_tables --> normalize_all --> remove_exempted
//!                                                                          |
//!                              yarn.lock --> LockfileIndex --> annotate_line_numbers
//! ```
//!
//! # Example
//!
//! ```
//! use yarnscan::audit::{find_table_region, normalize_all, parse_tables};
//!
//! let stdout = "\
//! ┌───────────┬─────────────────────────────────────┐
//! │ high      │ Command Injection                   │
//! ├───────────┼─────────────────────────────────────┤
//! │ Package   │ lodash                              │
//! ├───────────┼─────────────────────────────────────┤
//! │ More info │ https://www.npmjs.com/advisories/1673 │
//! └───────────┴─────────────────────────────────────┘";
//!
//! let lines: Vec<&str> = stdout.lines().collect();
//! let region = find_table_region(&lines).unwrap();
//! let vulns = normalize_all(parse_tables(region.slice(&lines)));
//!
//! assert_eq!(vulns.len(), 1);
//! assert_eq!(vulns[0].id, 1673);
//! assert_eq!(vulns[0].package(), Some("lodash"));
//! ```

mod annotate;
mod filter;
mod normalize;
mod table;

pub use annotate::{annotate_line_numbers, patch_status_applies};
pub use filter::{distinct_ids, remove_exempted, ExceptionSet};
pub use normalize::{advisory_id, leading_integer, normalize, normalize_all, ADVISORY_URL_PREFIX};
pub use table::{find_table_region, parse_tables, RawRecord, TableRegion, PATH};
