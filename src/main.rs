//! Sandboxer - offline AI sandbox
//!
//! A CLI tool that runs small, fully traceable toy algorithms (median-split
//! decision rule, 2-means clustering, naive-bayes-like scoring) over
//! tabular rows and writes a report explaining every decision.
//!
//! Exit codes:
//!   0 - Success (average confidence meets --fail-below, or no threshold set)
//!   1 - Runtime error (bad input file, invalid config, write failure, etc.)
//!   2 - Average confidence below the --fail-below threshold

mod analysis;
mod cli;
mod config;
mod input;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use input::LoadedRows;
use models::{Algorithm, Report, ReportMetadata};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle informational flags early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }
    if args.list_algorithms {
        print_algorithms();
        return Ok(());
    }

    // Initialize logging
    init_logging(&args);

    info!("Sandboxer v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .sandboxer.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to choose the algorithm, row cap, and report views.");
    Ok(())
}

/// Handle --list-algorithms.
fn print_algorithms() {
    println!("Available algorithms:\n");
    for algorithm in Algorithm::ALL {
        println!(
            "  {:<14} {} [{}]\n  {:<14} {}\n",
            algorithm.id(),
            algorithm.title(),
            algorithm.tag(),
            "",
            algorithm.description()
        );
    }
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the load -> analyze -> report workflow. Returns exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    // Reject a bad id before any work; the engine itself is permissive.
    let algorithm = config.algorithm()?;

    // Step 1: Get the rows
    let loaded = load_rows(&args, config.input.max_rows)?;
    if loaded.rows.is_empty() {
        warn!("No rows found; the report will be empty");
    }

    // Step 2: Run the engine
    if !args.quiet {
        println!(
            "🔬 Running {} over {} rows...",
            algorithm.title(),
            loaded.rows.len()
        );
    }
    let analysis = analysis::analyze_named(&loaded.rows, &config.analysis.algorithm);

    // Step 3: Build the report
    let report = Report {
        metadata: ReportMetadata {
            source: args.source_label(),
            analysis_date: Utc::now(),
            algorithm,
            rows_analyzed: loaded.rows.len(),
            rows_dropped: loaded.dropped,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        analysis,
    };

    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, &config.report.options())
        }
    };

    let output_path = Path::new(&config.general.output);
    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    if !args.quiet {
        println!("\n📊 Analysis Summary:");
        for line in report::generate_text_summary(&report).lines() {
            println!("   {}", line);
        }
        println!("\n✅ Report saved to: {}", output_path.display());
    }

    // Check --fail-below threshold
    if let Some(threshold) = args.fail_below {
        let avg = report
            .analysis
            .summary
            .map(|s| s.avg_confidence)
            .unwrap_or(0.0);

        if avg < threshold {
            eprintln!(
                "\n⛔ Average confidence {:.2} is below {:.2}. Failing (exit code 2).",
                avg, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Load rows from the input file or the built-in sample.
fn load_rows(args: &Args, max_rows: usize) -> Result<LoadedRows> {
    match args.input {
        Some(ref path) => {
            info!("Loading rows from: {}", path.display());
            input::load_rows(path, max_rows)
                .with_context(|| format!("Failed to load rows from {}", path.display()))
        }
        None => {
            info!("Using built-in sample rows");
            Ok(LoadedRows::capped(input::sample_rows(), max_rows))
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
