//! Modified Z-Score / MAD (robust to heavy contamination).
//!
//! Modified z = 0.6745 * (x - median) / MAD, after Iglewicz and Hoaglin.

use crate::statistics::descriptive::{median, median_abs_deviation};

/// Normal-consistency constant (the 0.75 quantile of N(0, 1)).
pub const MAD_SCALE: f64 = 0.6745;

/// Stand-in for a zero MAD, when over half the values are identical.
pub const MAD_EPSILON: f64 = 1e-10;

/// Modified z-scores of every value; `None` when every value is NaN.
pub fn scores(values: &[f64]) -> Option<Vec<f64>> {
    let center = median(values)?;
    let clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let mut mad = median_abs_deviation(&clean, center)?;
    if mad == 0.0 {
        mad = MAD_EPSILON;
    }
    Some(values.iter().map(|v| MAD_SCALE * (v - center) / mad).collect())
}

/// Flag values with `|modified z| > threshold`.
pub fn detect(values: &[f64], threshold: f64) -> Vec<bool> {
    match scores(values) {
        Some(z) => z.iter().map(|z| z.abs() > threshold).collect(),
        None => vec![false; values.len()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_outliers() {
        let flags = detect(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0, 200.0], 3.5);
        assert_eq!(flags, vec![false, false, false, false, false, true, true]);
    }

    #[test]
    fn test_zero_mad_uses_epsilon() {
        // Over half identical: MAD = 0, any deviation becomes extreme
        let values = [5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 10.0];
        let z = scores(&values).unwrap();
        assert!(z.iter().all(|z| z.is_finite()));
        assert_eq!(detect(&values, 3.5), vec![false, false, false, false, false, false, false, true]);
    }

    #[test]
    fn test_identical_values() {
        assert!(detect(&[5.0; 20], 3.5).iter().all(|&f| !f));
    }

    #[test]
    fn test_all_nan() {
        assert!(scores(&[f64::NAN]).is_none());
        assert_eq!(detect(&[f64::NAN], 3.5), vec![false]);
    }
}
