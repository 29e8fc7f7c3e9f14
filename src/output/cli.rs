use crate::model::{ScanOutcome, ScanReport, Severity, Vulnerability};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct VulnRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Patched In")]
    patched_in: String,
    #[tabled(rename = "yarn.lock")]
    line: String,
}

pub fn print_cli_table(report: &ScanReport) -> Result<()> {
    println!();
    println!(
        "Scan completed at: {}",
        report.scanned_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for warning in &report.warnings {
        println!("warning: {}", warning.message);
    }
    for error in &report.errors {
        println!("error: {}", error);
    }
    println!();

    if !report.vulnerabilities.is_empty() {
        println!("Found {} vulnerabilities:", report.vulnerabilities.len());
        println!();
        println!("{}", render_table(&report.vulnerabilities));
        println!();
    }

    print_summary(report);
    Ok(())
}

fn render_table(vulns: &[Vulnerability]) -> String {
    let mut vulns: Vec<&Vulnerability> = vulns.iter().collect();
    // most severe first, then by advisory id
    vulns.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.id.cmp(&b.id)));

    let rows: Vec<VulnRow> = vulns
        .iter()
        .map(|v| VulnRow {
            severity: format_severity(v.severity),
            id: v.id.to_string(),
            package: v.package().unwrap_or("-").to_string(),
            title: truncate(&v.title, 50),
            patched_in: v.patched_in().unwrap_or("-").to_string(),
            line: v
                .line_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

fn format_severity(severity: Severity) -> String {
    match severity {
        Severity::Critical => "\x1b[31mCRITICAL\x1b[0m".to_string(),
        Severity::High => "\x1b[91mHIGH\x1b[0m".to_string(),
        Severity::Moderate => "\x1b[33mMODERATE\x1b[0m".to_string(),
        Severity::Low => "\x1b[32mLOW\x1b[0m".to_string(),
        Severity::Info => "INFO".to_string(),
        Severity::Unknown => "UNKNOWN".to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn severity_counts(vulns: &[Vulnerability]) -> Vec<(Severity, usize)> {
    Severity::LEVELS
        .iter()
        .rev()
        .map(|level| {
            let count = vulns.iter().filter(|v| v.severity == *level).count();
            (*level, count)
        })
        .collect()
}

fn outcome_line(outcome: &ScanOutcome) -> String {
    match outcome {
        ScanOutcome::Misconfigured => "FAILED (no dependency groups were scanned)".to_string(),
        ScanOutcome::Clean => "PASSED (no advisories)".to_string(),
        ScanOutcome::ExecutionFailure { status, .. } => {
            format!("FAILED (yarn audit exited with status {})", status)
        }
        ScanOutcome::AllExempted => "PASSED (all advisories are ignored)".to_string(),
        ScanOutcome::FindingsReported => "FAILED (vulnerabilities found)".to_string(),
    }
}

fn print_summary(report: &ScanReport) {
    println!("Summary:");

    if !report.vulnerabilities.is_empty() {
        let counts: Vec<String> = severity_counts(&report.vulnerabilities)
            .into_iter()
            .map(|(level, count)| format!("{} {}", count, level))
            .collect();
        println!("  Vulnerabilities: {}", counts.join(", "));
    }

    if !report.found_advisories.is_empty() {
        println!("  Advisories found: {}", report.found_advisories.len());
    }
    if !report.ignored_advisories.is_empty() {
        let ids: Vec<String> = report
            .ignored_advisories
            .iter()
            .map(|id| id.to_string())
            .collect();
        println!("  Ignored advisories: {}", ids.join(", "));
    }

    println!();
    println!("Result: {}", outcome_line(&report.outcome));
}
