//! Median-split decision rule.
//!
//! Numeric records are split at the median of all numeric `value`s in the
//! row set. Records without a usable number fall back to a text rule on
//! their note.

use super::stats::{clamp_confidence, guarded_ratio, median};
use super::{Classifier, Evaluation};
use crate::models::{Outcome, Record, Step};
use tracing::debug;

/// Fixed confidence of the text fallback rule.
const TEXT_RULE_CONFIDENCE: f64 = 0.6;

/// Keyword that marks a non-numeric record as positive.
const POSITIVE_KEYWORD: &str = "good";

pub struct DecisionTree {
    median: f64,
}

impl DecisionTree {
    /// Computes the split point over all numeric values.
    pub fn fit(rows: &[Record]) -> Self {
        let values: Vec<f64> = rows.iter().filter_map(Record::value).collect();
        let median = median(&values);
        debug!(numeric = values.len(), median, "decision-tree split point");
        Self { median }
    }

    #[allow(dead_code)] // Exposed for inspection in tests
    pub fn median(&self) -> f64 {
        self.median
    }
}

impl Classifier for DecisionTree {
    fn classify(&self, record: &Record) -> Evaluation {
        let mut steps = vec![Step::new("check", record.to_json())];

        match record.value() {
            Some(value) => {
                steps.push(Step::new(
                    "compare-median",
                    format!("value={} median={}", value, self.median),
                ));
                let label = if value >= self.median {
                    "Positive"
                } else {
                    "Negative"
                };
                let confidence = 1.0 - guarded_ratio((value - self.median).abs(), self.median);
                Evaluation::new(steps, Outcome::new(label, clamp_confidence(confidence)))
            }
            None => {
                let text = record.note_text();
                steps.push(Step::new("text-rule", format!("text={}", text)));
                let label = if text.to_lowercase().contains(POSITIVE_KEYWORD) {
                    "Positive"
                } else {
                    "Neutral"
                };
                Evaluation::new(steps, Outcome::new(label, TEXT_RULE_CONFIDENCE))
            }
        }
    }
}
