//! SARIF (Static Analysis Results Interchange Format) output for code scanning integration.
//!
//! Findings that could be attributed to a `yarn.lock` line carry a region,
//! so code scanning annotates the lockfile entry directly.

use std::collections::BTreeSet;

use crate::lockfile::LOCKFILE_NAME;
use crate::model::{ScanReport, Severity};
use anyhow::Result;
use serde::Serialize;

/// SARIF v2.1.0 schema root
#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
struct SarifRule {
    id: String,
    name: String,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "helpUri", skip_serializing_if = "Option::is_none")]
    help_uri: Option<String>,
    #[serde(rename = "defaultConfiguration")]
    default_configuration: SarifRuleConfiguration,
}

#[derive(Serialize)]
struct SarifRuleConfiguration {
    level: &'static str,
}

#[derive(Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<SarifRegion>,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: usize,
}

fn severity_to_sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Moderate => "warning",
        Severity::Low | Severity::Info | Severity::Unknown => "note",
    }
}

/// Generate SARIF as a string
pub fn generate_sarif_string(report: &ScanReport) -> Result<String> {
    let mut rules = Vec::new();
    let mut results = Vec::new();
    let mut seen_rules = BTreeSet::new();

    for vuln in &report.vulnerabilities {
        let rule_id = vuln.id.to_string();
        let level = severity_to_sarif_level(vuln.severity);

        if seen_rules.insert(vuln.id) {
            rules.push(SarifRule {
                id: rule_id.clone(),
                name: vuln.title.clone(),
                short_description: SarifMessage {
                    text: vuln.title.clone(),
                },
                help_uri: vuln.more_info().map(str::to_string),
                default_configuration: SarifRuleConfiguration { level },
            });
        }

        let package = vuln.package().unwrap_or("unknown package");
        let patched = vuln
            .patched_in()
            .map(|p| format!(" (patched in {})", p))
            .unwrap_or_default();

        results.push(SarifResult {
            rule_id,
            level,
            message: SarifMessage {
                text: format!(
                    "{} vulnerability in {}: {}{}",
                    vuln.severity, package, vuln.title, patched
                ),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation {
                        uri: LOCKFILE_NAME.to_string(),
                    },
                    region: vuln
                        .line_number
                        .map(|start_line| SarifRegion { start_line }),
                },
            }],
        });
    }

    let sarif = SarifReport {
        schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
        version: "2.1.0",
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "yarnscan",
                    version: env!("CARGO_PKG_VERSION"),
                    rules,
                },
            },
            results,
        }],
    };

    Ok(serde_json::to_string_pretty(&sarif)?)
}

/// Generate and print SARIF output
pub fn print_sarif(report: &ScanReport) -> Result<()> {
    println!("{}", generate_sarif_string(report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ScanOutcome, Vulnerability, MORE_INFO, PACKAGE, PATCHED_IN};

    fn report() -> ScanReport {
        let mut located = Vulnerability::new(
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
        );
        located.line_number = Some(5);
        let unlocated = Vulnerability::new(Severity::Low, "ReDoS", 1500, Vec::new());

        let mut report = ScanReport::new("YarnAudit");
        report.vulnerabilities = vec![located, unlocated];
        report.finish(ScanOutcome::FindingsReported)
    }

    #[test]
    fn test_sarif_results_and_regions() {
        let sarif: serde_json::Value =
            serde_json::from_str(&generate_sarif_string(&report()).unwrap()).unwrap();
        let run = &sarif["runs"][0];

        assert_eq!(sarif["version"], "2.1.0");
        assert_eq!(run["tool"]["driver"]["rules"].as_array().unwrap().len(), 2);

        let first = &run["results"][0];
        assert_eq!(first["ruleId"], "1179");
        assert_eq!(first["level"], "error");
        let location = &first["locations"][0]["physicalLocation"];
        assert_eq!(location["artifactLocation"]["uri"], "yarn.lock");
        assert_eq!(location["region"]["startLine"], 5);
        assert_eq!(
            run["tool"]["driver"]["rules"][0]["helpUri"],
            "https://www.npmjs.com/advisories/1179"
        );

        let second = &run["results"][1];
        assert_eq!(second["level"], "note");
        assert!(second["locations"][0]["physicalLocation"]
            .get("region")
            .is_none());
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(severity_to_sarif_level(Severity::Critical), "error");
        assert_eq!(severity_to_sarif_level(Severity::Moderate), "warning");
        assert_eq!(severity_to_sarif_level(Severity::Info), "note");
    }
}
