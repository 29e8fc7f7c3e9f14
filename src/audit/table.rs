//! Box-drawn table extraction and parsing.
//!
//! `yarn audit --no-color` prints one table per advisory:
//!
//! ```text
//! ┌───────────────┬──────────────────────────────────────────────────────────────┐
//! │ low           │ Prototype Pollution                                          │
//! ├───────────────┼──────────────────────────────────────────────────────────────┤
//! │ Package       │ minimist                                                     │
//! ├───────────────┼──────────────────────────────────────────────────────────────┤
//! │ Patched in    │ >=0.2.1 <1.0.0 || >=1.2.3                                    │
//! ├───────────────┼──────────────────────────────────────────────────────────────┤
//! │ Path          │ mkdirp > minimist                                            │
//! ├───────────────┼──────────────────────────────────────────────────────────────┤
//! │ More info     │ https://www.npmjs.com/advisories/1179                        │
//! └───────────────┴──────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;
use std::hash::{Hash, Hasher};

const TOP_LEFT: &str = "┌─";
const TOP_RIGHT: &str = "─┐";
const BOTTOM_LEFT: &str = "└─";
const BOTTOM_RIGHT: &str = "─┘";
const ROW_PREFIX: &str = "│ ";
const VERTICAL: char = '│';

/// Row label whose values are never captured.
pub const PATH: &str = "Path";

/// Inclusive line range spanning every table in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRegion {
    pub start: usize,
    pub end: usize,
}

impl TableRegion {
    pub fn slice<'a, 'b>(&self, lines: &'a [&'b str]) -> &'a [&'b str] {
        &lines[self.start..=self.end]
    }
}

fn is_top_border(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(TOP_LEFT) && line.ends_with(TOP_RIGHT)
}

fn is_bottom_border(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(BOTTOM_LEFT) && line.ends_with(BOTTOM_RIGHT)
}

/// Finds the first top border and the last bottom border.
///
/// Returns `None` when either is missing or when the last bottom border
/// precedes the first top border.
pub fn find_table_region(lines: &[&str]) -> Option<TableRegion> {
    let start = lines.iter().position(|l| is_top_border(l))?;
    let end = lines.iter().rposition(|l| is_bottom_border(l))?;
    (start <= end).then_some(TableRegion { start, end })
}

/// One table's rows before normalization, in the order they were printed.
///
/// Equality ignores row order, so two tables with the same label/value pairs
/// collapse into one record.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a row, replacing an earlier row with the same label in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Appends a wrapped continuation to an existing row.
    ///
    /// Returns false when the row does not exist.
    pub fn append(&mut self, key: &str, continuation: &str) -> bool {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, value)) => {
                value.push(' ');
                value.push_str(continuation);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(pos).1)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn into_fields(self) -> Vec<(String, String)> {
        self.fields
    }

    fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

impl PartialEq for RawRecord {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for RawRecord {}

impl Hash for RawRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}

/// Splits a content row into its label and value cells.
fn split_row(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if !line.starts_with(ROW_PREFIX) {
        return None;
    }
    let mut cells = line.split(VERTICAL).skip(1);
    let key = cells.next().unwrap_or_default().trim();
    let value = cells.next().unwrap_or_default().trim();
    Some((key, value))
}

/// State carried across lines while walking the table region.
#[derive(Debug, Default)]
struct TableParser {
    current: Option<RawRecord>,
    previous_key: Option<String>,
    seen: HashSet<RawRecord>,
    records: Vec<RawRecord>,
}

impl TableParser {
    fn feed(&mut self, line: &str) {
        if is_top_border(line) {
            self.current = Some(RawRecord::new());
            self.previous_key = None;
        } else if let Some((key, value)) = split_row(line) {
            self.feed_row(key, value);
        } else if is_bottom_border(line) {
            self.finish_record();
        }
    }

    fn feed_row(&mut self, key: &str, value: &str) {
        let Some(record) = self.current.as_mut() else {
            return;
        };

        if key == PATH {
            self.previous_key = Some(PATH.to_string());
        } else if !key.is_empty() {
            record.set(key, value);
            self.previous_key = Some(key.to_string());
        } else if let Some(previous) = self.previous_key.as_deref() {
            if previous != PATH {
                record.append(previous, value);
            }
        }
    }

    fn finish_record(&mut self) {
        let Some(record) = self.current.take() else {
            return;
        };
        if self.seen.insert(record.clone()) {
            self.records.push(record);
        }
    }
}

/// Parses every table in `lines` into a record, dropping exact duplicates.
///
/// Records keep the order in which they first appeared.
pub fn parse_tables(lines: &[&str]) -> Vec<RawRecord> {
    let mut parser = TableParser::default();
    for line in lines {
        parser.feed(line);
    }
    parser.records
}
