//! Keyword-driven scoring that imitates a naive-bayes posterior.
//!
//! Each record is scored on its own: positive keywords in the note and a
//! high `value` push the positive score up, a low `value` pushes the
//! negative score up.

use super::stats::clamp_confidence;
use super::{Classifier, Evaluation};
use crate::models::{Outcome, Record, Step};

const POSITIVE_KEYWORDS: [&str; 4] = ["good", "excellent", "positive", "win"];

const PRIOR: f64 = 0.5;
const KEYWORD_WEIGHT: f64 = 0.4;
const VALUE_WEIGHT: f64 = 0.2;
const VALUE_THRESHOLD: f64 = 60.0;

const POSITIVE_CUTOFF: f64 = 0.6;
const NEGATIVE_CUTOFF: f64 = 0.4;

#[derive(Debug, Default)]
pub struct NaiveBayes;

impl NaiveBayes {
    /// Nothing is learned across rows; kept for symmetry with the other models.
    pub fn fit(_rows: &[Record]) -> Self {
        Self
    }

    /// Probability that `record` is positive.
    pub fn positive_probability(record: &Record) -> f64 {
        let text = record.note_text().to_lowercase();
        let mut positive = PRIOR;
        let mut negative = PRIOR;

        positive += POSITIVE_KEYWORDS
            .iter()
            .filter(|keyword| text.contains(*keyword))
            .count() as f64
            * KEYWORD_WEIGHT;

        if let Some(value) = record.value() {
            if value > VALUE_THRESHOLD {
                positive += VALUE_WEIGHT;
            } else {
                negative += VALUE_WEIGHT;
            }
        }

        positive / (positive + negative)
    }
}

impl Classifier for NaiveBayes {
    fn classify(&self, record: &Record) -> Evaluation {
        let probability = Self::positive_probability(record);
        let label = if probability > POSITIVE_CUTOFF {
            "Positive"
        } else if probability < NEGATIVE_CUTOFF {
            "Negative"
        } else {
            "Neutral"
        };

        Evaluation::new(
            vec![Step::new("likelihoods", format!("pos={:.2}", probability))],
            Outcome::new(label, clamp_confidence(probability)),
        )
    }
}
