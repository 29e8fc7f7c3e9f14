//! Line index over a v1 `yarn.lock`.
//!
//! Only the textual layout is used; the file is never parsed as a whole. An
//! entry looks like one of:
//!
//! ```text
//! "@babel/code-frame@^7.0.0", "@babel/code-frame@^7.8.3":
//!   "version" "7.8.3"
//!
//! minimist@^1.2.0:
//!   version "1.2.5"
//! ```
//!
//! Quoted and unquoted headers and version lines may appear in either combination.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::ScanError;

/// File name of the lockfile this index is built from.
pub const LOCKFILE_NAME: &str = "yarn.lock";

const QUOTED_VERSION_PREFIX: &str = "  \"version\" \"";
const VERSION_PREFIX: &str = "  version \"";

/// A single classified lockfile line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockLine<'a> {
    Header(&'a str),
    Version(&'a str),
    Other,
}

/// Extracts the dependency name from a quoted header like `"@scope/name@^1.0.0":`.
fn quoted_header_name(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('"')?;
    if !inner.contains('@') {
        return None;
    }
    // Scoped names carry their own leading '@'; the separator comes after it.
    let at = if inner.starts_with('@') {
        inner[1..].find('@')? + 1
    } else {
        inner.find('@')?
    };
    Some(&inner[..at])
}

/// Extracts the dependency name from an unquoted header like `minimist@^1.2.0:`.
fn unquoted_header_name(line: &str) -> Option<&str> {
    let first = line.chars().next()?;
    if !(first.is_ascii_alphanumeric() || first == '_') {
        return None;
    }
    line.find('@').map(|at| &line[..at])
}

fn version_value<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix)?.strip_suffix('"')
}

fn classify(line: &str) -> LockLine<'_> {
    if line.starts_with('"') {
        if let Some(name) = quoted_header_name(line) {
            return LockLine::Header(name);
        }
    } else if let Some(name) = unquoted_header_name(line) {
        return LockLine::Header(name);
    }

    version_value(line, QUOTED_VERSION_PREFIX)
        .or_else(|| version_value(line, VERSION_PREFIX))
        .map_or(LockLine::Other, LockLine::Version)
}

/// Maps each dependency name to its resolved versions and the 1-based line
/// of each `version` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockfileIndex {
    entries: HashMap<String, BTreeMap<String, usize>>,
}

impl LockfileIndex {
    /// Indexes lockfile text.
    ///
    /// When the same name resolves to the same version more than once, the
    /// last occurrence wins.
    ///
    /// # Example
    ///
    /// ```
    /// use yarnscan::LockfileIndex;
    ///
    /// let index = LockfileIndex::parse("minimist@^1.2.0:\n  version \"1.2.5\"\n");
    /// assert_eq!(index.line_of("minimist", "1.2.5"), Some(2));
    /// ```
    pub fn parse(content: &str) -> Self {
        let mut index = LockfileIndex::default();
        let mut current: Option<&str> = None;

        for (i, line) in content.lines().enumerate() {
            match classify(line) {
                LockLine::Header(name) => current = Some(name),
                LockLine::Version(version) => match current {
                    Some(name) => {
                        index
                            .entries
                            .entry(name.to_string())
                            .or_default()
                            .insert(version.to_string(), i + 1);
                    }
                    None => debug!(line = i + 1, "version line before any lockfile entry"),
                },
                LockLine::Other => {}
            }
        }

        index
    }

    /// Reads and indexes the lockfile at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Lockfile`] if the file cannot be read.
    pub fn read(path: &Path) -> Result<Self, ScanError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScanError::Lockfile {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::parse(&content);
        if index.is_empty() {
            warn!(path = %path.display(), "lockfile has no resolved entries");
        } else {
            debug!(path = %path.display(), dependencies = index.len(), "indexed lockfile");
        }
        Ok(index)
    }

    /// All recorded versions of `name`, ordered as strings.
    pub fn versions(&self, name: &str) -> Option<&BTreeMap<String, usize>> {
        self.entries.get(name)
    }

    pub fn line_of(&self, name: &str, version: &str) -> Option<usize> {
        self.versions(name)?.get(version).copied()
    }

    /// Line of the version that sorts first as a string.
    ///
    /// This is a string comparison, not a semver one: `"10.0.0"` sorts before `"2.0.0"`.
    pub fn lowest_version_line(&self, name: &str) -> Option<usize> {
        self.versions(name)?
            .first_key_value()
            .map(|(_, line)| *line)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of distinct dependency names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
