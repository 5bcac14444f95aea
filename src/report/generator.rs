//! Report generation.
//!
//! Renders an analysis as a Markdown document (flowchart, steps and table
//! views), as JSON, or as a short console summary.

use crate::analysis::label_distribution;
use crate::models::{percent, Report, ReportMetadata, Summary, TraceEntry};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Which trace views to include in a Markdown report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// One node per entry with its label and confidence
    Flowchart,
    /// Ordered reasoning steps per entry
    Steps,
    /// Entry id, raw value, label and confidence
    Table,
    /// All of the above (default)
    #[default]
    All,
}

impl View {
    fn includes(self, other: View) -> bool {
        self == View::All || self == other
    }
}

/// Knobs for Markdown rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub view: View,
    /// Add the full raw record to each table row.
    pub include_raw: bool,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportOptions) -> String {
    let mut output = String::new();

    output.push_str("# Sandboxer Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(
        report.analysis.summary.as_ref(),
        &report.analysis.trace,
    ));

    let trace = &report.analysis.trace;
    if options.view.includes(View::Flowchart) {
        output.push_str(&generate_flowchart_section(trace));
    }
    if options.view.includes(View::Steps) {
        output.push_str(&generate_steps_section(trace));
    }
    if options.view.includes(View::Table) {
        output.push_str(&generate_table_section(trace, options.include_raw));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Algorithm:** {} (`{}`, {})\n",
        metadata.algorithm.title(),
        metadata.algorithm.id(),
        metadata.algorithm.tag()
    ));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Rows Analyzed:** {}\n",
        metadata.rows_analyzed
    ));
    if metadata.rows_dropped > 0 {
        section.push_str(&format!("- **Rows Dropped:** {}\n", metadata.rows_dropped));
    }
    section.push_str(&format!(
        "- **Analysis Duration:** {:.3}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: Option<&Summary>, trace: &[TraceEntry]) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");

    let Some(summary) = summary else {
        section.push_str("No rows were analyzed.\n\n");
        return section;
    };

    section.push_str(&format!(
        "**Average confidence:** {}%\n\n",
        percent(summary.avg_confidence)
    ));

    let dist = label_distribution(trace);
    if !dist.is_empty() {
        section.push_str("| Label | Entries |\n");
        section.push_str("|:---|:---:|\n");

        let mut labels: Vec<_> = dist.iter().collect();
        labels.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

        for (label, count) in labels {
            section.push_str(&format!("| {} | {} |\n", label, count));
        }
        section.push('\n');
    }

    section
}

/// One line per entry, chained like a flowchart.
fn generate_flowchart_section(trace: &[TraceEntry]) -> String {
    let mut section = String::new();

    section.push_str("## Flowchart\n\n");
    if trace.is_empty() {
        section.push_str("No entries to chart.\n\n");
        return section;
    }

    section.push_str("```text\n");
    for (i, entry) in trace.iter().enumerate() {
        if i > 0 {
            section.push_str("    |\n    v\n");
        }
        section.push_str(&format!(
            "[Entry {}] {} [{}%]\n",
            entry.entry_id,
            entry.result.label,
            percent(entry.result.confidence)
        ));
    }
    section.push_str("```\n\n");

    section
}

/// Ordered steps for every entry.
fn generate_steps_section(trace: &[TraceEntry]) -> String {
    let mut section = String::new();

    section.push_str("## Steps\n\n");
    if trace.is_empty() {
        section.push_str("No steps recorded.\n\n");
        return section;
    }

    for entry in trace {
        section.push_str(&format!(
            "### Entry {}: {} [{}%]\n\n",
            entry.entry_id,
            entry.result.label,
            percent(entry.result.confidence)
        ));
        for (i, step) in entry.steps.iter().enumerate() {
            section.push_str(&format!("{}. **{}** - `{}`\n", i + 1, step.name, step.detail));
        }
        section.push('\n');
    }

    section
}

/// Tabular results.
fn generate_table_section(trace: &[TraceEntry], include_raw: bool) -> String {
    let mut section = String::new();

    section.push_str("## Results\n\n");
    if trace.is_empty() {
        section.push_str("No results.\n\n");
        return section;
    }

    if include_raw {
        section.push_str("| # | Value | Label | Confidence | Record |\n");
        section.push_str("|:---:|:---:|:---|:---:|:---|\n");
    } else {
        section.push_str("| # | Value | Label | Confidence |\n");
        section.push_str("|:---:|:---:|:---|:---:|\n");
    }

    for entry in trace {
        let value = entry
            .raw
            .get("value")
            .filter(|v| !v.is_null())
            .map(|v| escape_cell(&v.to_string()))
            .unwrap_or_else(|| "-".to_string());

        section.push_str(&format!(
            "| {} | {} | {} | {}% |",
            entry.entry_id,
            value,
            entry.result.label,
            percent(entry.result.confidence)
        ));
        if include_raw {
            section.push_str(&format!(" `{}` |", escape_cell(&entry.raw.to_json())));
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by Sandboxer. Logic-based AI demos, offline and educational.*\n"
        .to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a short plain-text summary for the console.
pub fn generate_text_summary(report: &Report) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "Algorithm: {} ({})",
        report.metadata.algorithm.title(),
        report.metadata.algorithm.tag()
    ));
    lines.push(format!("Entries: {}", report.analysis.trace.len()));

    match report.analysis.summary {
        Some(summary) => lines.push(format!(
            "Average confidence: {}%",
            percent(summary.avg_confidence)
        )),
        None => lines.push("Average confidence: n/a".to_string()),
    }

    for (label, count) in label_distribution(&report.analysis.trace) {
        lines.push(format!("- {}: {}", label, count));
    }

    lines.join("\n")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
