use std::path::Path;

use tracing::{error, info, warn};

use super::{AuditCommand, CommandOutput};
use crate::audit::{
    annotate_line_numbers, distinct_ids, find_table_region, normalize_all, parse_tables,
    remove_exempted, ExceptionSet,
};
use crate::config::{DependencyGroup, GroupPlan};
use crate::error::ScanError;
use crate::lockfile::{LockfileIndex, LOCKFILE_NAME};
use crate::model::{ScanOutcome, ScanReport};
use crate::output::format_text;

/// Name recorded in every report produced by [`YarnAuditScanner`].
pub const SCANNER_NAME: &str = "YarnAudit";

/// Audits a yarn project and classifies the result.
pub struct YarnAuditScanner<C> {
    command: C,
    exclude_groups: Vec<DependencyGroup>,
    exceptions: ExceptionSet,
}

impl<C: AuditCommand> YarnAuditScanner<C> {
    pub fn new(command: C) -> Self {
        Self {
            command,
            exclude_groups: Vec::new(),
            exceptions: ExceptionSet::new(),
        }
    }

    pub fn with_exclude_groups(mut self, groups: Vec<DependencyGroup>) -> Self {
        self.exclude_groups = groups;
        self
    }

    pub fn with_exceptions(mut self, exceptions: ExceptionSet) -> Self {
        self.exceptions = exceptions;
        self
    }

    /// Returns true when `project_dir` contains a `yarn.lock`.
    pub fn should_run(&self, project_dir: &Path) -> bool {
        project_dir.join(LOCKFILE_NAME).is_file()
    }

    pub async fn version(&self) -> Result<String, ScanError> {
        self.command.version().await
    }

    /// Runs the audit in `project_dir` and builds the report.
    ///
    /// # Errors
    ///
    /// Fails only on structural problems: the command cannot be spawned, or
    /// findings need line numbers and `yarn.lock` cannot be read. Failing
    /// audits are reported through [`ScanReport::outcome`].
    pub async fn scan(&self, project_dir: &Path) -> Result<ScanReport, ScanError> {
        let mut report = ScanReport::new(SCANNER_NAME);

        let args = match GroupPlan::from_excluded(&self.exclude_groups) {
            GroupPlan::Nothing => {
                error!("all dependency groups are excluded, nothing to audit");
                report.error("No dependencies were scanned!");
                return Ok(report.finish(ScanOutcome::Misconfigured));
            }
            GroupPlan::Scan {
                args,
                optional_only,
            } => {
                if optional_only {
                    warn!("only optionalDependencies will be audited");
                    report.warn(
                        "scanner_misconfiguration",
                        "Scanning only optionalDependencies!",
                    );
                }
                args
            }
        };

        let output = self.command.run(project_dir, &args).await?;
        let lockfile = project_dir.join(LOCKFILE_NAME);
        process_output(report, &output, &self.exceptions, || {
            LockfileIndex::read(&lockfile)
        })
    }
}

/// Classifies captured audit output.
///
/// `load_lockfile` is only called when there are findings to annotate.
///
/// # Errors
///
/// Propagates the error of `load_lockfile`.
pub fn process_output<F>(
    mut report: ScanReport,
    output: &CommandOutput,
    exceptions: &ExceptionSet,
    load_lockfile: F,
) -> Result<ScanReport, ScanError>
where
    F: FnOnce() -> Result<LockfileIndex, ScanError>,
{
    report.ignored_advisories = exceptions.ids();
    if !exceptions.is_empty() {
        info!(ignored = ?report.ignored_advisories, "exception list in effect");
    }

    if output.success() {
        return Ok(report.finish(ScanOutcome::Clean));
    }

    let lines: Vec<&str> = output.stdout.lines().collect();
    let Some(region) = find_table_region(&lines) else {
        error!(status = output.status, "audit failed without advisory tables");
        report.error(failure_message(output));
        return Ok(report.finish(ScanOutcome::ExecutionFailure {
            stderr: output.stderr.clone(),
            status: output.status,
        }));
    };

    let vulns = normalize_all(parse_tables(region.slice(&lines)));
    report.found_advisories = distinct_ids(&vulns);
    info!(found = ?report.found_advisories, "advisories found");

    let mut vulns = remove_exempted(vulns, exceptions);
    if vulns.is_empty() {
        return Ok(report.finish(ScanOutcome::AllExempted));
    }

    let index = load_lockfile()?;
    let annotated = annotate_line_numbers(&mut vulns, &index);
    info!(
        findings = vulns.len(),
        annotated, "advisories remain after exceptions"
    );

    report.log = format_text(&vulns);
    report.vulnerabilities = vulns;
    Ok(report.finish(ScanOutcome::FindingsReported))
}

/// Error event for a failed audit: exit status plus the raw stderr.
fn failure_message(output: &CommandOutput) -> String {
    let stderr = output.stderr.trim_end();
    if stderr.is_empty() {
        format!("yarn audit exited with status {}", output.status)
    } else {
        format!("yarn audit exited with status {}: {}", output.status, stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;
    use crate::output::{format_report_to_string, OutputFormat};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const ONE_TABLE: &str = "\
yarn audit v1.22.19
┌───────────────┬──────────────────────────────────────────────────────────────┐
│ high          │ Prototype Pollution in minimist                              │
├───────────────┼──────────────────────────────────────────────────────────────┤
│ Package       │ minimist                                                     │
├───────────────┼──────────────────────────────────────────────────────────────┤
│ Patched in    │ >=1.2.6                                                      │
├───────────────┼──────────────────────────────────────────────────────────────┤
│ Dependency of │ mkdirp                                                       │
├───────────────┼──────────────────────────────────────────────────────────────┤
│ Path          │ mkdirp > minimist                                            │
├───────────────┼──────────────────────────────────────────────────────────────┤
│ More info     │ https://www.npmjs.com/advisories/1179                        │
└───────────────┴──────────────────────────────────────────────────────────────┘
1 vulnerabilities found - Packages audited: 2
Severity: 1 High
Done in 0.61s.";

    const LOCKFILE: &str = "\
# yarn lockfile v1


minimist@0.0.8:
  version \"0.0.8\"

mkdirp@^0.5.1:
  version \"0.5.1\"
  dependencies:
    minimist \"0.0.8\"
";

    struct FakeCommand {
        output: CommandOutput,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl FakeCommand {
        fn new(stdout: &str, stderr: &str, status: i32) -> Self {
            Self {
                output: CommandOutput::new(stdout, stderr, status),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AuditCommand for FakeCommand {
        async fn run(&self, _project_dir: &Path, extra_args: &[String]) -> Result<CommandOutput, ScanError> {
            self.calls.lock().unwrap().push(extra_args.to_vec());
            Ok(self.output.clone())
        }

        async fn version(&self) -> Result<String, ScanError> {
            Ok("1.22.19".to_string())
        }
    }

    fn project_with_lockfile() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LOCKFILE_NAME), LOCKFILE).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_clean_exit_ignores_stdout() {
        let dir = project_with_lockfile();
        let scanner = YarnAuditScanner::new(FakeCommand::new(ONE_TABLE, "", 0));

        let report = scanner.scan(dir.path()).await.unwrap();
        assert_eq!(report.outcome, ScanOutcome::Clean);
        assert!(report.passed);
        assert!(report.vulnerabilities.is_empty());
        assert!(report.found_advisories.is_empty());
    }

    #[tokio::test]
    async fn test_failure_without_tables() {
        let dir = project_with_lockfile();
        let scanner = YarnAuditScanner::new(FakeCommand::new(
            "yarn audit v1.22.19\n",
            "error An unexpected error occurred: \"ENOTFOUND\".",
            1,
        ));

        let report = scanner.scan(dir.path()).await.unwrap();
        assert_eq!(
            report.outcome,
            ScanOutcome::ExecutionFailure {
                stderr: "error An unexpected error occurred: \"ENOTFOUND\".".to_string(),
                status: 1,
            }
        );
        assert!(!report.passed);
        assert_eq!(
            report.errors,
            vec!["yarn audit exited with status 1: error An unexpected error occurred: \"ENOTFOUND\"."]
        );
    }

    #[test]
    fn test_failure_stderr_reaches_text_output() {
        let report = process_output(
            ScanReport::new(SCANNER_NAME),
            &CommandOutput::new("yarn audit v1.22.19\n", "error ENOTFOUND registry\n", 1),
            &ExceptionSet::new(),
            || panic!("lockfile must not be read"),
        )
        .unwrap();

        let text = format_report_to_string(&report, OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "error: yarn audit exited with status 1: error ENOTFOUND registry\n"
        );
    }

    #[test]
    fn test_failure_without_stderr_keeps_status() {
        let report = process_output(
            ScanReport::new(SCANNER_NAME),
            &CommandOutput::new("", "", 137),
            &ExceptionSet::new(),
            || panic!("lockfile must not be read"),
        )
        .unwrap();
        assert_eq!(report.errors, vec!["yarn audit exited with status 137"]);
    }

    #[tokio::test]
    async fn test_single_finding_is_reported() {
        let dir = project_with_lockfile();
        let scanner = YarnAuditScanner::new(FakeCommand::new(ONE_TABLE, "", 8));

        let report = scanner.scan(dir.path()).await.unwrap();
        assert_eq!(report.outcome, ScanOutcome::FindingsReported);
        assert!(!report.passed);
        assert_eq!(report.found_advisories, vec![1179]);
        assert_eq!(report.vulnerabilities.len(), 1);

        let vuln = &report.vulnerabilities[0];
        assert_eq!(vuln.severity, Severity::High);
        assert_eq!(vuln.title, "Prototype Pollution in minimist");
        assert_eq!(vuln.id, 1179);
        assert_eq!(vuln.package(), Some("minimist"));
        assert_eq!(vuln.line_number, Some(5));
        assert_eq!(vuln.field("Path"), None);

        assert_eq!(
            report.log,
            "Severity: high\n\
             Title: Prototype Pollution in minimist\n\
             Package: minimist\n\
             Patched in: >=1.2.6\n\
             Dependency of: mkdirp\n\
             More info: https://www.npmjs.com/advisories/1179\n\
             ID: 1179\n\
             Line number: 5\n\
             \n"
        );
    }

    #[tokio::test]
    async fn test_all_exempted_passes_without_reading_lockfile() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = YarnAuditScanner::new(FakeCommand::new(ONE_TABLE, "", 8))
            .with_exceptions(ExceptionSet::from_strings(["1179"]));

        let report = scanner.scan(dir.path()).await.unwrap();
        assert_eq!(report.outcome, ScanOutcome::AllExempted);
        assert!(report.passed);
        assert_eq!(report.ignored_advisories, vec![1179]);
        assert_eq!(report.found_advisories, vec![1179]);
        assert!(report.vulnerabilities.is_empty());
    }

    #[tokio::test]
    async fn test_findings_with_unreadable_lockfile_fail() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = YarnAuditScanner::new(FakeCommand::new(ONE_TABLE, "", 8));

        let err = scanner.scan(dir.path()).await.unwrap_err();
        assert!(matches!(err, ScanError::Lockfile { .. }));
    }

    #[tokio::test]
    async fn test_all_groups_excluded_skips_audit() {
        let dir = project_with_lockfile();
        let scanner = YarnAuditScanner::new(FakeCommand::new(ONE_TABLE, "", 8))
            .with_exclude_groups(DependencyGroup::ALL.to_vec());

        let report = scanner.scan(dir.path()).await.unwrap();
        assert_eq!(report.outcome, ScanOutcome::Misconfigured);
        assert!(!report.passed);
        assert_eq!(report.errors, vec!["No dependencies were scanned!"]);
        assert!(scanner.command.calls().is_empty());
    }

    #[tokio::test]
    async fn test_optional_only_warns_and_passes_groups() {
        let dir = project_with_lockfile();
        let scanner = YarnAuditScanner::new(FakeCommand::new("", "", 0)).with_exclude_groups(vec![
            DependencyGroup::Dependencies,
            DependencyGroup::DevDependencies,
        ]);

        let report = scanner.scan(dir.path()).await.unwrap();
        assert_eq!(report.outcome, ScanOutcome::Clean);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, "scanner_misconfiguration");
        assert_eq!(
            scanner.command.calls(),
            vec![vec![
                "--groups".to_string(),
                "optionalDependencies".to_string()
            ]]
        );
    }

    #[tokio::test]
    async fn test_duplicate_tables_and_exceptions() {
        let other = ONE_TABLE
            .replace("high          │ Prototype Pollution in minimist ", "moderate      │ Command Injection in mkdirp     ")
            .replace("Package       │ minimist", "Package       │ mkdirp  ")
            .replace("1179", "1523");
        let stdout = format!("{ONE_TABLE}\n{other}\n{ONE_TABLE}");
        let dir = project_with_lockfile();
        let scanner = YarnAuditScanner::new(FakeCommand::new(&stdout, "", 12))
            .with_exceptions(ExceptionSet::from_strings(["1179"]));

        let report = scanner.scan(dir.path()).await.unwrap();
        assert_eq!(report.found_advisories, vec![1179, 1523]);
        assert_eq!(report.vulnerabilities.len(), 1);

        let vuln = &report.vulnerabilities[0];
        assert_eq!(vuln.id, 1523);
        assert_eq!(vuln.severity, Severity::Moderate);
        assert_eq!(vuln.package(), Some("mkdirp"));
        assert_eq!(vuln.line_number, Some(8));
    }

    #[test]
    fn test_process_output_does_not_load_lockfile_when_clean() {
        let report = process_output(
            ScanReport::new(SCANNER_NAME),
            &CommandOutput::new("", "", 0),
            &ExceptionSet::new(),
            || panic!("lockfile must not be read"),
        )
        .unwrap();
        assert_eq!(report.outcome, ScanOutcome::Clean);
    }

    #[test]
    fn test_should_run_requires_lockfile() {
        let scanner = YarnAuditScanner::new(FakeCommand::new("", "", 0));
        let empty = tempfile::tempdir().unwrap();
        assert!(!scanner.should_run(empty.path()));
        assert!(scanner.should_run(project_with_lockfile().path()));
    }

    #[tokio::test]
    async fn test_version_is_delegated() {
        let scanner = YarnAuditScanner::new(FakeCommand::new("", "", 0));
        assert_eq!(scanner.version().await.unwrap(), "1.22.19");
    }
}
