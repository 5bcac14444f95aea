//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.sandboxer.toml` files.

use crate::cli::OutputFormat;
use crate::input::DEFAULT_MAX_ROWS;
use crate::models::Algorithm;
use crate::report::{ReportOptions, View};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".sandboxer.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Row loading settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Engine settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "sandbox_report.md".to_string()
}

/// Row loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Maximum number of rows handed to the engine.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
        }
    }
}

fn default_max_rows() -> usize {
    DEFAULT_MAX_ROWS
}

/// Engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Algorithm id: `decision-tree`, `kmeans` or `naive-bayes`.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
        }
    }
}

fn default_algorithm() -> String {
    Algorithm::DecisionTree.id().to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Views included in Markdown reports.
    #[serde(default)]
    pub view: View,

    /// Add the raw record to each table row.
    #[serde(default)]
    pub include_raw: bool,
}

impl ReportConfig {
    pub fn options(&self) -> ReportOptions {
        ReportOptions {
            view: self.view,
            include_raw: self.include_raw,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.sandboxer.toml` from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(algorithm) = args.algorithm {
            self.analysis.algorithm = algorithm.id().to_string();
        }
        if let Some(max_rows) = args.max_rows {
            self.input.max_rows = max_rows;
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(view) = args.view {
            self.report.view = view;
        }
        if args.include_raw {
            self.report.include_raw = true;
        }
    }

    /// The configured algorithm.
    pub fn algorithm(&self) -> Result<Algorithm> {
        self.analysis
            .algorithm
            .parse::<Algorithm>()
            .context("Invalid [analysis] algorithm in configuration")
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "sandbox_report.md");
        assert_eq!(config.input.max_rows, 20);
        assert_eq!(config.algorithm().unwrap(), Algorithm::DecisionTree);
        assert_eq!(config.report.view, View::All);
        assert_eq!(config.report.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "clusters.json"

[input]
max_rows = 5

[analysis]
algorithm = "kmeans"

[report]
format = "json"
view = "table"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "clusters.json");
        assert_eq!(config.input.max_rows, 5);
        assert_eq!(config.algorithm().unwrap(), Algorithm::KMeans);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert_eq!(config.report.view, View::Table);
        assert!(!config.report.include_raw);
    }

    #[test]
    fn test_merge_with_args_only_overrides_explicit_values() {
        let mut config: Config =
            toml::from_str("[input]\nmax_rows = 7\n\n[report]\nview = \"steps\"\n").unwrap();
        let args = crate::cli::Args::try_parse_from([
            "sandboxer",
            "--sample",
            "--algorithm",
            "naive-bayes",
            "--format",
            "json",
            "--include-raw",
        ])
        .unwrap();

        config.merge_with_args(&args);

        assert_eq!(config.algorithm().unwrap(), Algorithm::NaiveBayes);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert!(config.report.include_raw);
        assert_eq!(config.input.max_rows, 7);
        assert_eq!(config.report.view, View::Steps);
        assert_eq!(config.report.options().view, View::Steps);
    }

    #[test]
    fn test_default_toml_has_no_logging_keys() {
        // Verbosity comes from --verbose/--quiet only.
        let toml_str = Config::default_toml();
        assert!(!toml_str.contains("verbose"));
        assert!(toml_str.contains("output = \"sandbox_report.md\""));
    }

    #[test]
    fn test_invalid_algorithm_in_config() {
        let config: Config = toml::from_str("[analysis]\nalgorithm = \"svm\"\n").unwrap();
        let err = config.algorithm().unwrap_err();
        assert!(format!("{:#}", err).contains("svm"));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[input]"));
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("[report]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.analysis.algorithm, "decision-tree");
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[analysis]\nalgorithm = \"naive-bayes\"\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.algorithm().unwrap(), Algorithm::NaiveBayes);
        assert_eq!(config.input.max_rows, 20);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[input\nmax_rows = ").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
