use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use yarnscan::{
    audit::ExceptionSet,
    config::{Config, DependencyGroup},
    error::ScanError,
    output::{format_report_to_string, print_report, OutputFormat},
    scanner::{YarnAuditScanner, YarnCli},
};

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const FAILED: u8 = 2;
}

#[derive(Parser)]
#[command(name = "yarnscan")]
#[command(
    author,
    version,
    about = "Run yarn audit on a project and report deduplicated findings"
)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a yarn project
    Scan {
        /// Project directory containing yarn.lock
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Dependency group to leave out (dependencies, devDependencies, optionalDependencies)
        #[arg(short = 'x', long = "exclude-group")]
        exclude_group: Vec<String>,

        /// Advisory ID to accept; merged with the config file
        #[arg(short, long)]
        ignore: Vec<String>,

        /// Output format (table, text, json, sarif)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the yarn version used for auditing
    Version,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "yarnscan=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    let config = Config::load().context("failed to load config file")?;
    config.validate()?;

    match cli.command {
        Commands::Scan {
            path,
            exclude_group,
            ignore,
            format,
            output,
        } => {
            let format_str = format.unwrap_or_else(|| config.default_format.clone());
            run_scan(&config, &path, &exclude_group, &ignore, &format_str, output).await
        }
        Commands::Version => {
            let scanner = YarnAuditScanner::new(YarnCli::new(config.yarn_command.clone()));
            let version = scanner.version().await?;
            println!("{}", version);
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(&config, init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run_scan(
    config: &Config,
    project_dir: &Path,
    exclude_flags: &[String],
    ignore_flags: &[String],
    format: &str,
    output_file: Option<PathBuf>,
) -> Result<u8> {
    let format = OutputFormat::from_str(format).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table;

    let exclude_groups = if exclude_flags.is_empty() {
        config.exclude_groups.clone()
    } else {
        parse_groups(exclude_flags)?
    };

    let mut exceptions: ExceptionSet = config.ignore.exception_set();
    exceptions.extend(ExceptionSet::from_strings(ignore_flags));

    let scanner = YarnAuditScanner::new(YarnCli::new(config.yarn_command.clone()))
        .with_exclude_groups(exclude_groups)
        .with_exceptions(exceptions);

    if !scanner.should_run(project_dir) {
        anyhow::bail!("no yarn.lock found in {}", project_dir.display());
    }

    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("invalid progress template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Running yarn audit...");
        Some(pb)
    } else {
        None
    };

    let result = scanner.scan(project_dir).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let report = result.with_context(|| format!("scan of {} failed", project_dir.display()))?;
    info!(outcome = ?report.outcome, passed = report.passed, "scan finished");

    if let Some(path) = output_file {
        let content = format_report_to_string(&report, format)?;
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        if is_interactive {
            println!("Results written to: {}", path.display());
        }
    } else {
        print_report(&report, format)?;
    }

    Ok(if report.passed {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILED
    })
}

fn parse_groups(values: &[String]) -> Result<Vec<DependencyGroup>, ScanError> {
    values
        .iter()
        .map(|v| {
            DependencyGroup::from_str(v).map_err(|reason| ScanError::Config {
                field: "exclude_group".to_string(),
                reason,
            })
        })
        .collect()
}

fn handle_config(config: &Config, init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
        } else {
            Config::default()
                .save()
                .with_context(|| format!("failed to write {}", config_path.display()))?;
            debug!(path = %config_path.display(), "wrote default config");
            println!("Created config file at: {}", config_path.display());
            println!();
            println!("{}", Config::generate_default_config());
        }
        return Ok(());
    }

    if config_path.exists() {
        println!("Config file: {}", config_path.display());
    } else {
        println!("No config file at {}; using defaults.", config_path.display());
        println!("Run 'yarnscan config --init' to create one.");
    }
    println!();
    print!("{}", config.effective_summary());

    Ok(())
}
