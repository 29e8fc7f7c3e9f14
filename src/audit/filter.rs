//! Exception list handling.

use std::collections::BTreeSet;

use super::normalize::leading_integer;
use crate::model::Vulnerability;

/// Advisory IDs accepted as known risk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionSet {
    ids: BTreeSet<u64>,
}

impl ExceptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from configured strings, coercing each to an integer.
    ///
    /// Values without leading digits become 0.
    pub fn from_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .map(|v| leading_integer(v.as_ref()))
            .collect()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn extend(&mut self, other: ExceptionSet) {
        self.ids.extend(other.ids);
    }

    /// The configured IDs in ascending order.
    pub fn ids(&self) -> Vec<u64> {
        self.ids.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<u64> for ExceptionSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Distinct advisory IDs, in order of first appearance.
pub fn distinct_ids(vulns: &[Vulnerability]) -> Vec<u64> {
    let mut seen = BTreeSet::new();
    vulns
        .iter()
        .map(|v| v.id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Drops every vulnerability whose ID is in `exceptions`.
pub fn remove_exempted(vulns: Vec<Vulnerability>, exceptions: &ExceptionSet) -> Vec<Vulnerability> {
    vulns
        .into_iter()
        .filter(|v| !exceptions.contains(v.id))
        .collect()
}
