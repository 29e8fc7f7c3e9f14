//! Configuration file handling.
//!
//! This module provides loading and saving of yarnscan configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/yarnscan/config.toml`
//! - macOS: `~/Library/Application Support/yarnscan/config.toml`
//! - Windows: `%APPDATA%\yarnscan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! default_format = "table"
//! yarn_command = "yarn"
//! exclude_groups = ["devDependencies"]
//!
//! [ignore]
//! advisories = ["1179", "1523"]
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::audit::ExceptionSet;
use crate::error::ScanError;
use crate::output::OutputFormat;

/// A dependency group `yarn audit --groups` understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyGroup {
    #[serde(rename = "dependencies")]
    Dependencies,
    #[serde(rename = "devDependencies")]
    DevDependencies,
    #[serde(rename = "optionalDependencies")]
    OptionalDependencies,
}

impl DependencyGroup {
    /// All groups, in the order they are passed to `--groups`.
    pub const ALL: [DependencyGroup; 3] = [
        DependencyGroup::Dependencies,
        DependencyGroup::DevDependencies,
        DependencyGroup::OptionalDependencies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyGroup::Dependencies => "dependencies",
            DependencyGroup::DevDependencies => "devDependencies",
            DependencyGroup::OptionalDependencies => "optionalDependencies",
        }
    }
}

impl std::fmt::Display for DependencyGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DependencyGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DependencyGroup::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Unknown dependency group: {}. Use 'dependencies', 'devDependencies', or 'optionalDependencies'",
                    s
                )
            })
    }
}

/// What to audit given a set of excluded groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupPlan {
    /// Every group is excluded; there is nothing to audit.
    Nothing,
    /// Audit with these extra command arguments.
    Scan {
        args: Vec<String>,
        /// Both dependency-bearing groups are excluded.
        optional_only: bool,
    },
}

impl GroupPlan {
    /// Derives the `--groups` arguments for `yarn audit`.
    ///
    /// # Example
    ///
    /// ```
    /// use yarnscan::config::{DependencyGroup, GroupPlan};
    ///
    /// let plan = GroupPlan::from_excluded(&[DependencyGroup::DevDependencies]);
    /// assert_eq!(
    ///     plan,
    ///     GroupPlan::Scan {
    ///         args: vec![
    ///             "--groups".to_string(),
    ///             "dependencies".to_string(),
    ///             "optionalDependencies".to_string(),
    ///         ],
    ///         optional_only: false,
    ///     }
    /// );
    /// ```
    pub fn from_excluded(excluded: &[DependencyGroup]) -> Self {
        if excluded.is_empty() {
            return GroupPlan::Scan {
                args: Vec::new(),
                optional_only: false,
            };
        }

        let included: Vec<DependencyGroup> = DependencyGroup::ALL
            .into_iter()
            .filter(|g| !excluded.contains(g))
            .collect();

        if included.is_empty() {
            return GroupPlan::Nothing;
        }

        let optional_only = included == [DependencyGroup::OptionalDependencies];
        let mut args = vec!["--groups".to_string()];
        args.extend(included.iter().map(|g| g.as_str().to_string()));

        GroupPlan::Scan {
            args,
            optional_only,
        }
    }
}

/// Application configuration.
///
/// It can be loaded from a TOML file or created with default values.
///
/// # Example
///
/// ```no_run
/// use yarnscan::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Default format: {}", config.default_format);
/// println!("Excluded groups: {:?}", config.exclude_groups);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "text", "json", "sarif"
    /// Default: "table"
    pub default_format: String,

    /// Program used to run `audit`.
    ///
    /// Default: "yarn" ("yarn.cmd" on Windows)
    pub yarn_command: String,

    /// Dependency groups to leave out of the audit.
    ///
    /// Default: none
    pub exclude_groups: Vec<DependencyGroup>,

    /// Accepted advisories.
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Advisories accepted as known risk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// npm advisory IDs (e.g. "1179").
    ///
    /// Values are read as integers; anything without leading digits counts as 0.
    pub advisories: Vec<String>,
}

impl IgnoreConfig {
    pub fn exception_set(&self) -> ExceptionSet {
        ExceptionSet::from_strings(&self.advisories)
    }
}

impl Default for Config {
    fn default() -> Self {
        let yarn_command = if cfg!(target_os = "windows") {
            "yarn.cmd"
        } else {
            "yarn"
        };

        Self {
            default_format: "table".to_string(),
            yarn_command: yarn_command.to_string(),
            exclude_groups: Vec::new(),
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from a specific file, falling back to defaults
    /// when it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use yarnscan::Config;
    ///
    /// let path = Config::config_path();
    /// println!("Config file: {}", path.display());
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("yarnscan")
            .join("config.toml")
    }

    /// Checks values serde cannot reject on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ScanError> {
        if let Err(reason) = self.default_format.parse::<OutputFormat>() {
            return Err(ScanError::Config {
                field: "default_format".to_string(),
                reason,
            });
        }
        if self.yarn_command.trim().is_empty() {
            return Err(ScanError::Config {
                field: "yarn_command".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Describes the settings a scan would use, one `label: value` per line.
    pub fn effective_summary(&self) -> String {
        let groups = if self.exclude_groups.is_empty() {
            "none".to_string()
        } else {
            let names: Vec<&str> = self.exclude_groups.iter().map(|g| g.as_str()).collect();
            names.join(", ")
        };

        let ids = self.ignore.exception_set().ids();
        let ignored = if ids.is_empty() {
            "none".to_string()
        } else {
            let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
            ids.join(", ")
        };

        let audit_args = match GroupPlan::from_excluded(&self.exclude_groups) {
            GroupPlan::Nothing => "(nothing to scan)".to_string(),
            GroupPlan::Scan { args, .. } => {
                let mut parts = vec!["audit".to_string(), "--no-color".to_string()];
                parts.extend(args);
                parts.join(" ")
            }
        };

        format!(
            "Default format: {}\n\
             Audit command: {} {}\n\
             Excluded groups: {}\n\
             Ignored advisories: {}\n",
            self.default_format, self.yarn_command, audit_args, groups, ignored
        )
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
