//! Attributes findings to lines in `yarn.lock`.

use tracing::debug;

use crate::lockfile::LockfileIndex;
use crate::model::{Vulnerability, NO_PATCH_AVAILABLE};

/// Returns true when the fix range suggests the resolved versions are affected.
///
/// That is the case for an open lower bound (`>=x`) or when no fix exists.
pub fn patch_status_applies(patched_in: &str) -> bool {
    patched_in.starts_with(">=") || patched_in == NO_PATCH_AVAILABLE
}

/// Sets `line_number` on each vulnerability whose package is in the index
/// and whose patch status applies.
///
/// The line of the lowest version (string order) is used. Returns the number
/// of vulnerabilities annotated.
pub fn annotate_line_numbers(vulns: &mut [Vulnerability], index: &LockfileIndex) -> usize {
    let mut annotated = 0;
    for vuln in vulns.iter_mut() {
        let (Some(package), Some(patched_in)) = (vuln.package(), vuln.patched_in()) else {
            continue;
        };
        if !patch_status_applies(patched_in) {
            continue;
        }
        if !index.contains(package) {
            debug!(id = vuln.id, package, "package not found in lockfile");
            continue;
        }
        if let Some(line) = index.lowest_version_line(package) {
            debug!(id = vuln.id, package, line, "attributed advisory to lockfile line");
            vuln.line_number = Some(line);
            annotated += 1;
        }
    }
    annotated
}
