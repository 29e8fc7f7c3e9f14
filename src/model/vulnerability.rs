use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Row label holding the affected package name.
pub const PACKAGE: &str = "Package";
/// Row label holding the fixed version range.
pub const PATCHED_IN: &str = "Patched in";
/// Row label holding the advisory URL.
pub const MORE_INFO: &str = "More info";
/// Literal `yarn audit` prints when no fix exists.
pub const NO_PATCH_AVAILABLE: &str = "No patch available";

/// Advisory severity as labelled by `yarn audit`.
///
/// `Unknown` is only produced for malformed tables that carry no severity row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Unknown,
    Info,
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    /// Severity labels in the order they are looked up in a table.
    ///
    /// When a malformed table carries more than one label, the first one in
    /// this order wins.
    pub const LEVELS: [Severity; 5] = [
        Severity::Info,
        Severity::Low,
        Severity::Moderate,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Unknown => "unknown",
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single normalized advisory.
///
/// The severity row of the source table has been split into [`severity`](Self::severity)
/// and [`title`](Self::title), and [`id`](Self::id) is derived from the advisory URL.
/// Every other row (`Package`, `Patched in`, `Dependency of`, `More info`, ...) is
/// kept verbatim in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vulnerability {
    pub severity: Severity,
    pub title: String,
    pub id: u64,
    /// 1-based line of the matching entry in `yarn.lock`, when one could be attributed.
    pub line_number: Option<usize>,
    fields: Vec<(String, String)>,
}

impl Vulnerability {
    pub fn new(
        severity: Severity,
        title: impl Into<String>,
        id: u64,
        fields: Vec<(String, String)>,
    ) -> Self {
        Self {
            severity,
            title: title.into(),
            id,
            line_number: None,
            fields,
        }
    }

    /// Returns the value of a table row by its label.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn package(&self) -> Option<&str> {
        self.field(PACKAGE)
    }

    pub fn patched_in(&self) -> Option<&str> {
        self.field(PATCHED_IN)
    }

    pub fn more_info(&self) -> Option<&str> {
        self.field(MORE_INFO)
    }

    /// All fields in report order: `Severity`, `Title`, the remaining table
    /// rows, `ID` and finally `Line number` when present.
    pub fn entries(&self) -> Vec<(&str, String)> {
        let mut entries = Vec::with_capacity(self.fields.len() + 4);
        entries.push(("Severity", self.severity.to_string()));
        entries.push(("Title", self.title.clone()));
        for (k, v) in &self.fields {
            entries.push((k.as_str(), v.clone()));
        }
        entries.push(("ID", self.id.to_string()));
        if let Some(line) = self.line_number {
            entries.push(("Line number", line.to_string()));
        }
        entries
    }
}

impl Serialize for Vulnerability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.fields.len() + 3 + usize::from(self.line_number.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("Severity", &self.severity)?;
        map.serialize_entry("Title", &self.title)?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.serialize_entry("ID", &self.id)?;
        if let Some(line) = self.line_number {
            map.serialize_entry("Line number", &line)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vulnerability {
        Vulnerability::new(
            Severity::High,
            "Prototype Pollution",
            1179,
            vec![
                (PACKAGE.to_string(), "minimist".to_string()),
                (PATCHED_IN.to_string(), ">=1.2.6".to_string()),
                (
                    MORE_INFO.to_string(),
                    "https://www.npmjs.com/advisories/1179".to_string(),
                ),
            ],
        )
    }

    #[test]
    fn test_field_accessors() {
        let vuln = sample();
        assert_eq!(vuln.package(), Some("minimist"));
        assert_eq!(vuln.patched_in(), Some(">=1.2.6"));
        assert_eq!(vuln.field("Dependency of"), None);
    }

    #[test]
    fn test_entries_order() {
        let mut vuln = sample();
        vuln.line_number = Some(42);
        let keys: Vec<&str> = vuln.entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "Severity",
                "Title",
                "Package",
                "Patched in",
                "More info",
                "ID",
                "Line number"
            ]
        );
    }

    #[test]
    fn test_serialize_uses_table_labels() {
        let mut vuln = sample();
        let json = serde_json::to_value(&vuln).unwrap();
        assert_eq!(json["Severity"], "high");
        assert_eq!(json["Title"], "Prototype Pollution");
        assert_eq!(json["Patched in"], ">=1.2.6");
        assert_eq!(json["ID"], 1179);
        assert!(json.get("Line number").is_none());

        vuln.line_number = Some(7);
        let json = serde_json::to_value(&vuln).unwrap();
        assert_eq!(json["Line number"], 7);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Info > Severity::Unknown);
        assert_eq!(Severity::LEVELS[0], Severity::Info);
        assert_eq!(Severity::LEVELS[4], Severity::Critical);
    }
}
