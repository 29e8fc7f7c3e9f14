use crate::model::Vulnerability;

/// Renders findings as `key: value` lines, one blank line after each finding.
pub fn format_text(vulns: &[Vulnerability]) -> String {
    let mut out = String::new();
    for vuln in vulns {
        for (key, value) in vuln.entries() {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(&value);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Severity, PACKAGE};

    #[test]
    fn test_format_text() {
        let mut first = Vulnerability::new(
            Severity::Low,
            "ReDoS",
            7,
            vec![(PACKAGE.to_string(), "ms".to_string())],
        );
        first.line_number = Some(3);
        let second = Vulnerability::new(Severity::Critical, "RCE", 9, Vec::new());

        assert_eq!(
            format_text(&[first, second]),
            "Severity: low\nTitle: ReDoS\nPackage: ms\nID: 7\nLine number: 3\n\n\
             Severity: critical\nTitle: RCE\nID: 9\n\n"
        );
    }

    #[test]
    fn test_format_text_empty() {
        assert_eq!(format_text(&[]), "");
    }
}
