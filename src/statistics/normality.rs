//! Normality tests
//!
//! - Shapiro-Wilk W with Royston's (1995, AS R94) coefficient and p-value
//!   approximations, valid for 3 ≤ n ≤ 5000.
//! - Jarque-Bera, from sample skewness and excess kurtosis, with a
//!   chi-square (2 df) p-value.

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

use super::descriptive::{sorted_without_nan, Moments};
use crate::error::{Result, StatsError};

/// Upper sample size supported by the Shapiro-Wilk approximation
pub const SHAPIRO_MAX_N: usize = 5000;

const SMALL: f64 = 1e-19;

// Royston's polynomial coefficients, lowest order first
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// Statistic and p-value of a hypothesis test
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

impl TestResult {
    /// True when the null hypothesis is rejected at level `alpha`
    pub fn rejects_at(&self, alpha: f64) -> bool {
        self.p_value <= alpha
    }
}

#[inline]
fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| StatsError::invalid_value(e.to_string()))
}

/// Antisymmetric Shapiro-Wilk coefficients `a[0..n/2]` (largest first)
fn shapiro_coefficients(n: usize, normal: &Normal) -> Vec<f64> {
    let half = n / 2;
    if n == 3 {
        return vec![core::f64::consts::FRAC_1_SQRT_2];
    }

    let an25 = n as f64 + 0.25;
    let m: Vec<f64> = (0..half)
        .map(|i| normal.inverse_cdf((i as f64 + 1.0 - 0.375) / an25))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let mut a = vec![0.0; half];
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;
    a[0] = a1;

    let (first, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };

    for i in first..half {
        a[i] = -m[i] / fac;
    }
    a
}

/// Shapiro-Wilk test for normality
///
/// NaN values are ignored. Constant data yields `W = 1, p = 1`; data
/// holding an infinity yields NaN for both.
///
/// # Errors
///
/// `InvalidValue` when fewer than 3 or more than [`SHAPIRO_MAX_N`] values
/// remain.
pub fn shapiro_wilk(data: &[f64]) -> Result<TestResult> {
    let x = sorted_without_nan(data);
    let n = x.len();
    if n < 3 {
        return Err(StatsError::invalid_value(format!(
            "shapiro-wilk requires at least 3 values, got {}",
            n
        )));
    }
    if n > SHAPIRO_MAX_N {
        return Err(StatsError::invalid_value(format!(
            "shapiro-wilk supports at most {} values, got {}",
            SHAPIRO_MAX_N, n
        )));
    }

    if x[n - 1] - x[0] < SMALL {
        return Ok(TestResult {
            statistic: 1.0,
            p_value: 1.0,
        });
    }

    let normal = standard_normal()?;
    let a = shapiro_coefficients(n, &normal);

    let mean = x.iter().sum::<f64>() / n as f64;
    let ssq: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let b: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let w = b * b / ssq;
    if !w.is_finite() {
        return Ok(TestResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
        });
    }
    let w = w.min(1.0);

    Ok(TestResult {
        statistic: w,
        p_value: shapiro_p_value(w, n, &normal),
    })
}

fn shapiro_p_value(w: f64, n: usize, normal: &Normal) -> f64 {
    if w >= 1.0 {
        return 1.0;
    }

    if n == 3 {
        // Exact distribution for n = 3
        let six_over_pi = 6.0 / core::f64::consts::PI;
        let stqr = core::f64::consts::FRAC_PI_3;
        return (six_over_pi * (w.sqrt().asin() - stqr)).clamp(0.0, 1.0);
    }

    let an = n as f64;
    let mut y = (1.0 - w).ln();
    let (m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return 1e-99;
        }
        y = -(gamma - y).ln();
        (poly(&C3, an), poly(&C4, an).exp())
    } else {
        let ln_n = an.ln();
        (poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };

    normal.sf((y - m) / s)
}

/// Jarque-Bera test for normality
///
/// NaN values are ignored.
///
/// # Errors
///
/// `InvalidValue` when fewer than 2 values remain.
pub fn jarque_bera(data: &[f64]) -> Result<TestResult> {
    let clean: Vec<f64> = data.iter().copied().filter(|v| !v.is_nan()).collect();
    if clean.len() < 2 {
        return Err(StatsError::invalid_value(format!(
            "jarque-bera requires at least 2 values, got {}",
            clean.len()
        )));
    }

    let moments = Moments::from_slice(&clean)
        .ok_or_else(|| StatsError::invalid_value("data cannot be empty"))?;
    let skew = moments.skewness();
    let kurt = moments.excess_kurtosis();
    let statistic = clean.len() as f64 / 6.0 * (skew * skew + kurt * kurt / 4.0);

    let chi2 = ChiSquared::new(2.0).map_err(|e| StatsError::invalid_value(e.to_string()))?;
    Ok(TestResult {
        statistic,
        p_value: chi2.sf(statistic),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Deterministic approximately-normal sample: normal quantiles at
    // evenly spaced probabilities.
    fn normal_scores(n: usize) -> Vec<f64> {
        let normal = Normal::new(0.0, 1.0).unwrap();
        (1..=n)
            .map(|i| normal.inverse_cdf(i as f64 / (n as f64 + 1.0)))
            .collect()
    }

    #[test]
    fn test_poly_is_horner() {
        assert_eq!(poly(&[1.0, 2.0, 3.0], 2.0), 1.0 + 4.0 + 12.0);
    }

    #[test]
    fn test_coefficients_are_normalized() {
        // sum of a_i^2 over both halves equals 1
        let normal = Normal::new(0.0, 1.0).unwrap();
        for n in [4, 5, 6, 10, 25, 100] {
            let a = shapiro_coefficients(n, &normal);
            let total: f64 = 2.0 * a.iter().map(|v| v * v).sum::<f64>();
            assert!((total - 1.0).abs() < 1e-6, "n={} sum={}", n, total);
        }
    }

    #[test]
    fn test_shapiro_normal_sample() {
        let result = shapiro_wilk(&normal_scores(50)).unwrap();
        assert!(result.statistic > 0.97, "W = {}", result.statistic);
        assert!(result.p_value > 0.05, "p = {}", result.p_value);
    }

    #[test]
    fn test_shapiro_skewed_sample() {
        let data: Vec<f64> = (0..50).map(|i| (i as f64 / 5.0).exp()).collect();
        let result = shapiro_wilk(&data).unwrap();
        assert!(result.statistic < 0.9, "W = {}", result.statistic);
        assert!(result.rejects_at(0.05), "p = {}", result.p_value);
    }

    #[test]
    fn test_shapiro_three_values() {
        // Equally spaced points attain W = 1
        let result = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert!((result.statistic - 1.0).abs() < 1e-12);
        assert!((result.p_value - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_shapiro_small_sample_in_range() {
        let result = shapiro_wilk(&[2.1, 3.4, 1.9, 5.6, 4.4, 3.3, 2.8]).unwrap();
        assert!(result.statistic > 0.0 && result.statistic <= 1.0);
        assert!(result.p_value >= 0.0 && result.p_value <= 1.0);
    }

    #[test]
    fn test_shapiro_constant() {
        let result = shapiro_wilk(&[5.0; 10]).unwrap();
        assert_eq!(result.statistic, 1.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_shapiro_infinite_values() {
        for data in [
            vec![1.0, 2.0, 3.0, f64::INFINITY, 5.0],
            vec![f64::NEG_INFINITY, 2.0, 3.0, 4.0],
        ] {
            let result = shapiro_wilk(&data).unwrap();
            assert!(result.statistic.is_nan());
            assert!(result.p_value.is_nan());
            assert!(!result.rejects_at(0.05));
        }
    }

    #[test]
    fn test_shapiro_too_few() {
        let err = shapiro_wilk(&[1.0, 2.0]).unwrap_err();
        assert!(err.is_value_error());
    }

    #[test]
    fn test_jarque_bera() {
        let normal = jarque_bera(&normal_scores(200)).unwrap();
        assert!(normal.p_value > 0.5, "p = {}", normal.p_value);

        let mut skewed: Vec<f64> = vec![0.0; 95];
        skewed.extend([50.0, 60.0, 70.0, 80.0, 90.0]);
        let skewed = jarque_bera(&skewed).unwrap();
        assert!(skewed.statistic > 100.0);
        assert!(skewed.p_value < 1e-6);
    }

    #[test]
    fn test_jarque_bera_p_value_formula() {
        // chi-square with 2 df: sf(x) = exp(-x / 2)
        let result = jarque_bera(&[1.0, 2.0, 3.0, 10.0]).unwrap();
        assert!((result.p_value - (-result.statistic / 2.0).exp()).abs() < 1e-9);
    }
}
