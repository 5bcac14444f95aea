//! Data models for the analysis sandbox.
//!
//! This module contains the core data structures shared by the row
//! loaders, the analysis engine and the report generators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single cell of an input record.
///
/// Rows come from loosely typed sources (CSV, JSON, built-in samples), so a
/// field may hold a number, free text, or nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Null,
}

impl FieldValue {
    /// Returns the numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text payload, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Whether the value carries any content (non-empty text, non-zero number).
    fn is_present(&self) -> bool {
        match self {
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Null => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Null => write!(f, "-"),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// One input row of arbitrary named fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Returns the field as a number, or `None` when missing or not numeric.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_number)
    }

    /// The conventional numeric `value` field.
    ///
    /// `NaN` and infinities count as non-numeric, so every algorithm sends
    /// them down its fallback path.
    pub fn value(&self) -> Option<f64> {
        self.number("value").filter(|v| v.is_finite())
    }

    /// The free-text part of the record: `note`, falling back to `text`.
    ///
    /// Numeric notes are rendered as text; a missing note yields `""`.
    pub fn note_text(&self) -> String {
        ["note", "text"]
            .iter()
            .filter_map(|field| self.get(field))
            .find(|value| value.is_present())
            .map(|value| match value.as_text() {
                Some(text) => text.to_string(),
                None => value.to_string(),
            })
            .unwrap_or_default()
    }

    /// Renders the record as compact JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// One human-readable reasoning step applied to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub detail: String,
}

impl Step {
    pub fn new(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            detail: detail.into(),
        }
    }
}

/// Final classification (or cluster assignment) of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub label: String,
    /// Always within `[0.05, 0.99]`.
    pub confidence: f64,
}

impl Outcome {
    pub fn new(label: &str, confidence: f64) -> Self {
        Self {
            label: label.to_string(),
            confidence,
        }
    }
}

/// A confidence-like fraction as a rounded percentage.
pub fn percent(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}

/// Trace of a single record through an algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEntry {
    /// 1-based position of the record in the input.
    pub entry_id: usize,
    pub raw: Record,
    pub steps: Vec<Step>,
    pub result: Outcome,
}

/// Aggregate statistics over a trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub avg_confidence: f64,
}

/// Output of one engine invocation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Analysis {
    pub trace: Vec<TraceEntry>,
    /// `None` when there was nothing to analyze.
    pub summary: Option<Summary>,
}

impl Analysis {
    /// The result for empty input.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The available toy algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "decision-tree")]
    DecisionTree,
    #[serde(rename = "kmeans")]
    KMeans,
    #[serde(rename = "naive-bayes")]
    NaiveBayes,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::DecisionTree,
        Algorithm::KMeans,
        Algorithm::NaiveBayes,
    ];

    /// Stable identifier used on the command line and in config files.
    pub fn id(&self) -> &'static str {
        match self {
            Algorithm::DecisionTree => "decision-tree",
            Algorithm::KMeans => "kmeans",
            Algorithm::NaiveBayes => "naive-bayes",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Algorithm::DecisionTree => "Decision Tree",
            Algorithm::KMeans => "K-Means (logic)",
            Algorithm::NaiveBayes => "Naive Bayes (sim)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Algorithm::DecisionTree => "Simple median split and text rules.",
            Algorithm::KMeans => "Deterministic k=2 clustering on numeric value.",
            Algorithm::NaiveBayes => "Simple likelihoods from discrete features.",
        }
    }

    /// Broad task family, shown next to the title.
    pub fn tag(&self) -> &'static str {
        match self {
            Algorithm::KMeans => "clustering",
            _ => "classification",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Returned when an algorithm identifier is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown algorithm '{0}' (expected one of: decision-tree, kmeans, naive-bayes)")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.id() == s)
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

/// Metadata about a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Where the rows came from (file path or "built-in sample").
    pub source: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    pub algorithm: Algorithm,
    /// Number of rows handed to the engine.
    pub rows_analyzed: usize,
    /// Number of rows dropped by the row cap.
    pub rows_dropped: usize,
    /// Duration of the analysis in seconds.
    pub duration_seconds: f64,
}

/// The complete analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub analysis: Analysis,
}
