mod cli;
mod json;
mod sarif;
mod text;

pub use cli::print_cli_table;
pub use json::print_json;
pub use sarif::print_sarif;
pub use text::format_text;

use crate::model::ScanReport;
use anyhow::Result;

/// Output format for scan reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// `key: value` lines per finding
    Text,
    /// JSON format for programmatic use
    Json,
    /// SARIF format for GitHub Actions code scanning
    Sarif,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "text" | "log" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            _ => Err(format!(
                "Unknown format: {}. Use 'table', 'text', 'json', or 'sarif'",
                s
            )),
        }
    }
}

pub fn print_report(report: &ScanReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(report),
        OutputFormat::Text => {
            print!("{}", text_report(report));
            Ok(())
        }
        OutputFormat::Json => print_json(report),
        OutputFormat::Sarif => print_sarif(report),
    }
}

/// Format report to string for file output
pub fn format_report_to_string(report: &ScanReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text_report(report)),
        OutputFormat::Sarif => sarif::generate_sarif_string(report),
        // tables are for terminals; files get JSON
        OutputFormat::Json | OutputFormat::Table => json::generate_json_string(report),
    }
}

fn text_report(report: &ScanReport) -> String {
    let mut out = String::new();
    for error in &report.errors {
        out.push_str(&format!("error: {}\n", error));
    }
    for warning in &report.warnings {
        out.push_str(&format!("warning: {}\n", warning.message));
    }
    if report.log.is_empty() {
        out.push_str(&format_text(&report.vulnerabilities));
    } else {
        out.push_str(&report.log);
    }
    out
}
