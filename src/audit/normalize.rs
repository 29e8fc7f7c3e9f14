//! Turns parsed table records into [`Vulnerability`] values.

use tracing::debug;

use super::table::RawRecord;
use crate::model::{Severity, Vulnerability, MORE_INFO};

/// URL prefix of npm advisory links; the advisory ID follows it.
pub const ADVISORY_URL_PREFIX: &str = "https://www.npmjs.com/advisories/";

/// Parses the leading run of ASCII digits, ignoring leading whitespace.
///
/// Anything without leading digits, or too large for a `u64`, yields 0.
pub fn leading_integer(s: &str) -> u64 {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().unwrap_or(0)
}

/// Extracts the numeric advisory ID from a `More info` URL.
///
/// # Example
///
/// ```
/// use yarnscan::audit::advisory_id;
///
/// assert_eq!(advisory_id(Some("https://www.npmjs.com/advisories/1179")), 1179);
/// assert_eq!(advisory_id(Some("https://github.com/advisories/GHSA-xxxx")), 0);
/// assert_eq!(advisory_id(None), 0);
/// ```
pub fn advisory_id(more_info: Option<&str>) -> u64 {
    more_info
        .and_then(|url| url.split_once(ADVISORY_URL_PREFIX))
        .map_or(0, |(_, rest)| leading_integer(rest))
}

/// Splits the severity row into severity and title and derives the ID.
///
/// The first label found in [`Severity::LEVELS`] order is taken; any other
/// severity labels stay behind as ordinary rows.
pub fn normalize(mut record: RawRecord) -> Vulnerability {
    let (severity, title) = Severity::LEVELS
        .iter()
        .find_map(|level| record.remove(level.as_str()).map(|title| (*level, title)))
        .unwrap_or_else(|| {
            debug!("advisory table has no severity row");
            (Severity::Unknown, String::new())
        });

    let id = advisory_id(record.get(MORE_INFO));
    Vulnerability::new(severity, title, id, record.into_fields())
}

/// Normalizes every record and orders the result by advisory ID.
pub fn normalize_all(records: Vec<RawRecord>) -> Vec<Vulnerability> {
    let mut vulns: Vec<Vulnerability> = records.into_iter().map(normalize).collect();
    vulns.sort_by_key(|v| v.id);
    vulns
}
