//! Deterministic 2-means clustering on the numeric `value` field.

use super::stats::{clamp_confidence, guarded_ratio, mean, NEUTRAL_CONFIDENCE};
use super::{Classifier, Evaluation};
use crate::models::{Outcome, Record, Step};
use tracing::debug;

/// Number of refinement passes after seeding.
const ITERATIONS: usize = 6;

const CLUSTER_A: &str = "Cluster A";
const CLUSTER_B: &str = "Cluster B";

pub struct KMeans {
    /// `None` when the row set had no numeric values at all.
    centroids: Option<[f64; 2]>,
}

impl KMeans {
    /// Seeds centroids at the minimum and maximum value, then refines them.
    pub fn fit(rows: &[Record]) -> Self {
        let values: Vec<f64> = rows.iter().filter_map(Record::value).collect();
        if values.is_empty() {
            debug!("kmeans: no numeric values, every record falls back");
            return Self { centroids: None };
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut centroids = [min, max];

        for _ in 0..ITERATIONS {
            let (first, second): (Vec<f64>, Vec<f64>) = values
                .iter()
                .copied()
                .partition(|v| nearest(*v, &centroids) == 0);

            // An empty cluster keeps its previous centroid.
            centroids = [
                mean(&first).unwrap_or(centroids[0]),
                mean(&second).unwrap_or(centroids[1]),
            ];
        }

        debug!(
            c0 = centroids[0],
            c1 = centroids[1],
            "kmeans centroids after refinement"
        );
        Self {
            centroids: Some(centroids),
        }
    }

    #[allow(dead_code)] // Exposed for inspection in tests
    pub fn centroids(&self) -> Option<[f64; 2]> {
        self.centroids
    }
}

/// Index of the nearer centroid; ties go to centroid 0.
fn nearest(value: f64, centroids: &[f64; 2]) -> usize {
    let d0 = (value - centroids[0]).abs();
    let d1 = (value - centroids[1]).abs();
    if d0 <= d1 {
        0
    } else {
        1
    }
}

impl Classifier for KMeans {
    fn classify(&self, record: &Record) -> Evaluation {
        let Some(centroids) = self.centroids else {
            return Evaluation::new(
                vec![Step::new("no-numeric", "no numeric value")],
                Outcome::new(CLUSTER_B, NEUTRAL_CONFIDENCE),
            );
        };

        let Some(value) = record.value() else {
            return Evaluation::new(
                vec![Step::new("non-numeric", "No numeric value, assigned to Cluster B")],
                Outcome::new(CLUSTER_B, NEUTRAL_CONFIDENCE),
            );
        };

        let d0 = (value - centroids[0]).abs();
        let d1 = (value - centroids[1]).abs();
        let label = if d0 <= d1 { CLUSTER_A } else { CLUSTER_B };
        let confidence = 1.0 - guarded_ratio(d0.min(d1), centroids[0] - centroids[1]);

        Evaluation::new(
            vec![Step::new("distance", format!("d0={:.2} d1={:.2}", d0, d1))],
            Outcome::new(label, clamp_confidence(confidence)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[f64]) -> Vec<Record> {
        values
            .iter()
            .map(|v| Record::new().with("value", *v))
            .collect()
    }

    #[test]
    fn test_centroids_separate_two_groups() {
        let data = rows(&[0.0, 1.0, 2.0, 100.0, 101.0, 102.0]);
        let centroids = KMeans::fit(&data).centroids().unwrap();
        assert!((centroids[0] - 1.0).abs() < 1e-9);
        assert!((centroids[1] - 101.0).abs() < 1e-9);
    }

    #[test]
    fn test_cluster_assignment() {
        let data = rows(&[0.0, 1.0, 2.0, 100.0, 101.0, 102.0]);
        let model = KMeans::fit(&data);

        let zero = model.classify(&data[0]);
        let two = model.classify(&data[2]);
        let hundred = model.classify(&data[3]);

        assert_eq!(zero.outcome.label, "Cluster A");
        assert_eq!(zero.outcome.label, two.outcome.label);
        assert_ne!(zero.outcome.label, hundred.outcome.label);
        assert_eq!(zero.steps[0].detail, "d0=1.00 d1=101.00");
        assert!((zero.outcome.confidence - 0.99).abs() < 1e-9);
    }

    #[test]
    fn test_identical_values_do_not_produce_nan() {
        let data = rows(&[4.0, 4.0, 4.0]);
        let model = KMeans::fit(&data);
        assert_eq!(model.centroids(), Some([4.0, 4.0]));

        let eval = model.classify(&data[0]);
        assert_eq!(eval.outcome.label, "Cluster A");
        assert_eq!(eval.outcome.confidence, 0.99);
    }

    #[test]
    fn test_single_value_dataset() {
        let data = rows(&[42.0]);
        let eval = KMeans::fit(&data).classify(&data[0]);
        assert_eq!(eval.outcome.label, "Cluster A");
        assert!(!eval.outcome.confidence.is_nan());
    }

    #[test]
    fn test_no_numeric_values() {
        let data = vec![Record::new().with("note", "hello"), Record::new()];
        let model = KMeans::fit(&data);
        assert_eq!(model.centroids(), None);

        let eval = model.classify(&data[0]);
        assert_eq!(eval.outcome, Outcome::new("Cluster B", 0.5));
        assert_eq!(eval.steps[0].name, "no-numeric");
    }

    #[test]
    fn test_non_numeric_record_among_numeric_rows() {
        let mut data = rows(&[1.0, 9.0]);
        data.push(Record::new().with("value", "nine"));
        let eval = KMeans::fit(&data).classify(&data[2]);
        assert_eq!(eval.outcome, Outcome::new("Cluster B", 0.5));
        assert_eq!(eval.steps[0].name, "non-numeric");
    }

    #[test]
    fn test_nan_value_stays_out_of_the_fit() {
        let data = rows(&[0.0, 100.0, f64::NAN]);
        let model = KMeans::fit(&data);
        assert_eq!(model.centroids(), Some([0.0, 100.0]));

        assert_eq!(model.classify(&data[0]).outcome, Outcome::new("Cluster A", 0.99));
        assert_eq!(model.classify(&data[1]).outcome, Outcome::new("Cluster B", 0.99));

        let eval = model.classify(&data[2]);
        assert_eq!(eval.outcome, Outcome::new("Cluster B", 0.5));
        assert_eq!(eval.steps[0].name, "non-numeric");
    }

    #[test]
    fn test_infinite_values_stay_out_of_the_fit() {
        let data = rows(&[f64::NEG_INFINITY, 1.0, 9.0, f64::INFINITY]);
        let model = KMeans::fit(&data);
        assert_eq!(model.centroids(), Some([1.0, 9.0]));
        assert_eq!(model.classify(&data[3]).outcome, Outcome::new("Cluster B", 0.5));

        let only_nan = rows(&[f64::NAN]);
        assert_eq!(KMeans::fit(&only_nan).centroids(), None);
    }

    #[test]
    fn test_tie_goes_to_first_centroid() {
        assert_eq!(nearest(5.0, &[0.0, 10.0]), 0);
        assert_eq!(nearest(5.1, &[0.0, 10.0]), 1);
    }
}
