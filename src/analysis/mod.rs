//! The analysis engine.
//!
//! Turns a list of records and an algorithm choice into a per-record
//! trace plus a summary. The engine is pure: it never mutates its input
//! and recomputes every derived value on each call.

pub mod decision_tree;
pub mod kmeans;
pub mod naive_bayes;
pub mod stats;

use crate::models::{Algorithm, Analysis, Outcome, Record, Step, Summary, TraceEntry};
use decision_tree::DecisionTree;
use kmeans::KMeans;
use naive_bayes::NaiveBayes;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Steps taken for one record and the result they led to.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub steps: Vec<Step>,
    pub outcome: Outcome,
}

impl Evaluation {
    pub fn new(steps: Vec<Step>, outcome: Outcome) -> Self {
        Self { steps, outcome }
    }
}

/// A model fitted over a whole row set, then applied record by record.
pub trait Classifier {
    fn classify(&self, record: &Record) -> Evaluation;
}

/// Run `algorithm` over `rows`.
///
/// Empty input yields an empty trace and no summary.
pub fn analyze(rows: &[Record], algorithm: Algorithm) -> Analysis {
    if rows.is_empty() {
        debug!("No rows to analyze");
        return Analysis::empty();
    }

    let trace = match algorithm {
        Algorithm::DecisionTree => build_trace(rows, &DecisionTree::fit(rows)),
        Algorithm::KMeans => build_trace(rows, &KMeans::fit(rows)),
        Algorithm::NaiveBayes => build_trace(rows, &NaiveBayes::fit(rows)),
    };

    let summary = summarize(&trace);
    info!(
        algorithm = %algorithm,
        rows = trace.len(),
        avg_confidence = summary.avg_confidence,
        "Analysis complete"
    );

    Analysis {
        trace,
        summary: Some(summary),
    }
}

/// Run the algorithm named `algorithm_id` over `rows`.
///
/// An unrecognized id is not an error: it produces an empty trace with a
/// zero summary. Ids are matched exactly, without trimming or case folding.
pub fn analyze_named(rows: &[Record], algorithm_id: &str) -> Analysis {
    if rows.is_empty() {
        return Analysis::empty();
    }

    match algorithm_id.parse::<Algorithm>() {
        Ok(algorithm) => analyze(rows, algorithm),
        Err(e) => {
            warn!("{}; nothing to do", e);
            Analysis {
                trace: Vec::new(),
                summary: Some(summarize(&[])),
            }
        }
    }
}

fn build_trace<C: Classifier>(rows: &[Record], model: &C) -> Vec<TraceEntry> {
    rows.iter()
        .enumerate()
        .map(|(i, record)| {
            let Evaluation { steps, outcome } = model.classify(record);
            TraceEntry {
                entry_id: i + 1,
                raw: record.clone(),
                steps,
                result: outcome,
            }
        })
        .collect()
}

/// Mean confidence over `trace`; `0.0` for an empty trace.
pub fn summarize(trace: &[TraceEntry]) -> Summary {
    let total: f64 = trace.iter().map(|t| t.result.confidence).sum();
    Summary {
        avg_confidence: total / trace.len().max(1) as f64,
    }
}

/// Number of entries per result label.
pub fn label_distribution(trace: &[TraceEntry]) -> BTreeMap<String, usize> {
    let mut dist: BTreeMap<String, usize> = BTreeMap::new();

    for entry in trace {
        *dist.entry(entry.result.label.clone()).or_default() += 1;
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    fn mixed_rows() -> Vec<Record> {
        vec![
            Record::new().with("value", 75.0).with("note", "good"),
            Record::new().with("value", 20.0).with("note", "bad"),
            Record::new().with("note", "excellent win"),
            Record::new().with("value", FieldValue::Null),
            Record::new().with("value", "seventy"),
            Record::new().with("value", 50.0).with("note", "ok"),
        ]
    }

    #[test]
    fn test_empty_input() {
        for algorithm in Algorithm::ALL {
            assert_eq!(analyze(&[], algorithm), Analysis::empty());
        }
        assert_eq!(analyze_named(&[], "kmeans"), Analysis::empty());
        assert_eq!(analyze_named(&[], "bogus"), Analysis::empty());
    }

    #[test]
    fn test_cardinality_and_order() {
        let rows = mixed_rows();
        for algorithm in Algorithm::ALL {
            let analysis = analyze(&rows, algorithm);
            assert_eq!(analysis.trace.len(), rows.len());
            for (k, entry) in analysis.trace.iter().enumerate() {
                assert_eq!(entry.entry_id, k + 1);
                assert_eq!(entry.raw, rows[k]);
                assert!(!entry.steps.is_empty());
            }
        }
    }

    #[test]
    fn test_confidence_bounds() {
        let mut rows = mixed_rows();
        rows.push(Record::new().with("value", -1e9));
        rows.push(Record::new().with("value", 1e9));
        rows.push(Record::new().with("value", 0.0));
        for algorithm in Algorithm::ALL {
            for entry in analyze(&rows, algorithm).trace {
                let c = entry.result.confidence;
                assert!((0.05..=0.99).contains(&c), "{} out of bounds", c);
            }
        }
    }

    #[test]
    fn test_determinism() {
        let rows = mixed_rows();
        for algorithm in Algorithm::ALL {
            assert_eq!(analyze(&rows, algorithm), analyze(&rows, algorithm));
        }
    }

    #[test]
    fn test_input_is_not_mutated() {
        let rows = mixed_rows();
        let before = rows.clone();
        let _ = analyze(&rows, Algorithm::KMeans);
        assert_eq!(rows, before);
    }

    #[test]
    fn test_median_split_example() {
        let rows: Vec<Record> = [10.0, 20.0, 30.0, 40.0]
            .iter()
            .map(|v| Record::new().with("value", *v))
            .collect();
        let analysis = analyze(&rows, Algorithm::DecisionTree);
        assert_eq!(analysis.trace[2].result.label, "Positive");
        assert_eq!(analysis.trace[0].result.label, "Negative");
    }

    #[test]
    fn test_text_fallback_ignores_other_rows() {
        let rows = vec![
            Record::new().with("value", 1000.0),
            Record::new().with("note", "good"),
        ];
        let analysis = analyze(&rows, Algorithm::DecisionTree);
        assert_eq!(analysis.trace[1].result, Outcome::new("Positive", 0.6));

        let alone = analyze(&[Record::new().with("note", "good")], Algorithm::DecisionTree);
        assert_eq!(alone.trace[0].result, Outcome::new("Positive", 0.6));
    }

    #[test]
    fn test_summary_is_mean_confidence() {
        let rows = vec![
            Record::new().with("note", "good"),
            Record::new().with("note", "meh"),
        ];
        let analysis = analyze(&rows, Algorithm::DecisionTree);
        let summary = analysis.summary.unwrap();
        assert!((summary.avg_confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_algorithm_yields_empty_trace() {
        let analysis = analyze_named(&mixed_rows(), "random-forest");
        assert!(analysis.trace.is_empty());
        assert_eq!(
            analysis.summary,
            Some(Summary {
                avg_confidence: 0.0
            })
        );
    }

    #[test]
    fn test_padded_algorithm_id_is_unknown() {
        let rows = vec![Record::new().with("value", 1.0)];
        let analysis = analyze_named(&rows, " kmeans ");
        assert!(analysis.trace.is_empty());
        assert_eq!(
            analysis.summary,
            Some(Summary {
                avg_confidence: 0.0
            })
        );
    }

    #[test]
    fn test_non_finite_values_keep_confidence_in_bounds() {
        let mut rows = mixed_rows();
        rows.push(Record::new().with("value", f64::NAN).with("note", "good"));
        rows.push(Record::new().with("value", f64::INFINITY));
        rows.push(Record::new().with("value", f64::NEG_INFINITY));

        for algorithm in Algorithm::ALL {
            let analysis = analyze(&rows, algorithm);
            assert_eq!(analysis.trace.len(), rows.len());
            for entry in &analysis.trace {
                let c = entry.result.confidence;
                assert!(!c.is_nan(), "{} produced NaN", algorithm);
                assert!((0.05..=0.99).contains(&c), "{} out of bounds", c);
            }
            let avg = analysis.summary.unwrap().avg_confidence;
            assert!(avg.is_finite());
        }

        let centroids = KMeans::fit(&rows).centroids().unwrap();
        assert!(centroids.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_nan_rows_do_not_merge_clusters() {
        let rows = vec![
            Record::new().with("value", 0.0),
            Record::new().with("value", 100.0),
            Record::new().with("value", f64::NAN),
        ];
        let analysis = analyze(&rows, Algorithm::KMeans);
        let labels: Vec<&str> = analysis
            .trace
            .iter()
            .map(|t| t.result.label.as_str())
            .collect();
        assert_eq!(labels, ["Cluster A", "Cluster B", "Cluster B"]);
        assert_eq!(analysis.trace[2].result.confidence, 0.5);
    }

    #[test]
    fn test_analyze_named_dispatches() {
        let rows = mixed_rows();
        assert_eq!(
            analyze_named(&rows, "naive-bayes"),
            analyze(&rows, Algorithm::NaiveBayes)
        );
    }

    #[test]
    fn test_configured_id_runs_through_named_entry_point() {
        let config: crate::config::Config =
            toml::from_str("[analysis]\nalgorithm = \"kmeans\"\n").unwrap();
        let rows = mixed_rows();
        assert_eq!(
            analyze_named(&rows, &config.analysis.algorithm),
            analyze(&rows, config.algorithm().unwrap())
        );
    }

    #[test]
    fn test_label_distribution() {
        let rows: Vec<Record> = [0.0, 1.0, 2.0, 100.0, 101.0, 102.0]
            .iter()
            .map(|v| Record::new().with("value", *v))
            .collect();
        let analysis = analyze(&rows, Algorithm::KMeans);
        let dist = label_distribution(&analysis.trace);
        assert_eq!(dist.get("Cluster A"), Some(&3));
        assert_eq!(dist.get("Cluster B"), Some(&3));
    }
}
