//! Z-Score detection (assumes roughly normal data).
//!
//! Scores use the population standard deviation of the non-NaN values.

use crate::statistics::descriptive::Moments;

/// Z-scores of every value; `None` when the data has no spread.
///
/// NaN inputs score NaN.
pub fn scores(values: &[f64]) -> Option<Vec<f64>> {
    let clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let moments = Moments::from_slice(&clean)?;
    let std = moments.population_std();
    if std <= 0.0 || !std.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| (v - moments.mean) / std).collect())
}

/// Flag values with `|z| > threshold`.
pub fn detect(values: &[f64], threshold: f64) -> Vec<bool> {
    match scores(values) {
        Some(z) => z.iter().map(|z| z.abs() > threshold).collect(),
        None => vec![false; values.len()],
    }
}
