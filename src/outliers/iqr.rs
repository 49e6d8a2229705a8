//! IQR with Tukey fences (non-parametric).
//!
//! Resistant to extreme outliers that inflate the standard deviation.
//! Uses Q1 - k*IQR and Q3 + k*IQR as fences.

use crate::statistics::descriptive::{quartiles, sorted_without_nan, QuantileMethod};

/// Lower and upper Tukey fences of the non-NaN values.
pub fn fences(values: &[f64], multiplier: f64, method: QuantileMethod) -> Option<(f64, f64)> {
    let sorted = sorted_without_nan(values);
    let (q1, q3) = quartiles(&sorted, method)?;
    let iqr = q3 - q1;
    Some((q1 - multiplier * iqr, q3 + multiplier * iqr))
}

/// Flag values outside the fences.
pub fn detect(values: &[f64], multiplier: f64, method: QuantileMethod) -> Vec<bool> {
    match fences(values, multiplier, method) {
        Some((lower, upper)) => values.iter().map(|&v| v < lower || v > upper).collect(),
        None => vec![false; values.len()],
    }
}
