//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Algorithm;
use crate::report::View;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sandboxer - logic-based AI demos, offline
///
/// Runs a toy classifier or clusterer over a handful of rows and writes a
/// report tracing every decision it made.
///
/// Examples:
///   sandboxer --sample
///   sandboxer --input students.csv --algorithm naive-bayes
///   sandboxer --input clustering.csv --algorithm kmeans --format json -o clusters.json
///   sandboxer --sample --view steps --fail-below 0.6
///   sandboxer --list-algorithms
///   sandboxer --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// CSV or JSON file with the rows to analyze
    ///
    /// Files ending in `.json` must hold an array of objects; anything else
    /// is read as comma-separated values with a header line.
    #[arg(short, long, value_name = "FILE", conflicts_with = "sample")]
    pub input: Option<PathBuf>,

    /// Analyze the built-in sample rows instead of a file
    #[arg(short, long)]
    pub sample: bool,

    /// Algorithm to run: decision-tree, kmeans or naive-bayes
    ///
    /// Can also be set via SANDBOXER_ALGORITHM env var or .sandboxer.toml config.
    #[arg(short, long, value_name = "ID", env = "SANDBOXER_ALGORITHM")]
    pub algorithm: Option<Algorithm>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Trace views to include in Markdown reports
    #[arg(long, value_name = "VIEW")]
    pub view: Option<View>,

    /// Include each raw record in the results table
    #[arg(long)]
    pub include_raw: bool,

    /// Maximum number of rows to analyze
    ///
    /// Extra rows in the input file are dropped. Default: from config or 20.
    #[arg(long, value_name = "COUNT")]
    pub max_rows: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .sandboxer.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Fail if the average confidence is below this value (0.0 - 1.0)
    ///
    /// Useful for CI pipelines. Exit code 2 when the average falls short.
    #[arg(long, value_name = "CONFIDENCE")]
    pub fail_below: Option<f64>,

    /// List the available algorithms and exit
    #[arg(long)]
    pub list_algorithms: bool,

    /// Generate a default .sandboxer.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether the invocation only prints information and exits.
    pub fn is_informational(&self) -> bool {
        self.init_config || self.list_algorithms
    }

    /// Human-readable description of where rows come from.
    pub fn source_label(&self) -> String {
        match self.input {
            Some(ref path) => path.display().to_string(),
            None => "built-in sample".to_string(),
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.is_informational() {
            return Ok(());
        }

        if self.input.is_none() && !self.sample {
            return Err("Provide rows with --input <FILE> or use --sample".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(max_rows) = self.max_rows {
            if max_rows == 0 {
                return Err("Max rows must be at least 1".to_string());
            }
        }

        if let Some(threshold) = self.fail_below {
            if !(0.0..=1.0).contains(&threshold) {
                return Err("--fail-below must be between 0.0 and 1.0".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Input path is not a file: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
