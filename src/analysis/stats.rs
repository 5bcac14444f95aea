//! Small numeric helpers shared by the classifiers.

/// Lower bound for any reported confidence.
pub const MIN_CONFIDENCE: f64 = 0.05;

/// Upper bound for any reported confidence.
pub const MAX_CONFIDENCE: f64 = 0.99;

/// Confidence used when a computation degenerates to NaN, and for
/// records that no rule could say anything about.
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Median of `values`; `0.0` for an empty slice.
///
/// Even-length inputs average the two middle elements.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = (sorted.len() - 1) / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid] + sorted[mid + 1]) / 2.0
    }
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Bounds a raw confidence into `[MIN_CONFIDENCE, MAX_CONFIDENCE]`.
pub fn clamp_confidence(raw: f64) -> f64 {
    if raw.is_nan() {
        NEUTRAL_CONFIDENCE
    } else {
        raw.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
    }
}

/// Divides by `denominator`, never by anything smaller than `1.0` in magnitude.
pub fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    numerator / denominator.abs().max(1.0)
}
