//! Comprehensive descriptive statistics for exploratory analysis

use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::warn;

use super::descriptive::{mode_sorted, quantile, sorted_without_nan, Moments, QuantileMethod};
use super::normality::{jarque_bera, shapiro_wilk, TestResult, SHAPIRO_MAX_N};
use crate::error::{Result, StatsError};
use crate::traits::ErrorBounds;

/// Tukey fence multiplier used for the outlier count
const OUTLIER_FENCE: f64 = 1.5;

/// Significance level behind [`DistributionTests::is_normal`]
const NORMALITY_ALPHA: f64 = 0.05;

/// Options for [`comprehensive_stats`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatsConfig {
    /// Confidence level of the mean's interval, in (0, 1) (default: 0.95)
    pub confidence_level: f64,
    /// Run Shapiro-Wilk and Jarque-Bera (default: true)
    pub include_distribution_tests: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            include_distribution_tests: true,
        }
    }
}

impl StatsConfig {
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    pub fn with_distribution_tests(mut self, enabled: bool) -> Self {
        self.include_distribution_tests = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let level = self.confidence_level;
        if !(level > 0.0 && level < 1.0) {
            return Err(StatsError::invalid_value(format!(
                "confidence_level must be between 0 and 1, got {}",
                level
            )));
        }
        Ok(())
    }
}

/// Normality test outcomes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistributionTests {
    /// Absent above 5000 values
    pub shapiro_wilk: Option<TestResult>,
    pub jarque_bera: TestResult,
    /// Shapiro-Wilk p-value above 0.05; `None` when the test was skipped
    /// or its p-value is undefined
    pub is_normal: Option<bool>,
}

/// Result of [`comprehensive_stats`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComprehensiveStats {
    /// Values used after NaN removal
    pub n: usize,
    /// NaN values dropped from the input
    pub nan_removed: usize,
    pub mean: f64,
    pub median: f64,
    /// Most frequent value, smallest on ties
    pub mode: f64,
    pub mode_count: usize,
    /// Sample standard deviation (0 for a single value)
    pub std: f64,
    /// Sample variance (0 for a single value)
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub skewness: f64,
    /// Excess (Fisher) kurtosis
    pub kurtosis: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub confidence_level: f64,
    /// Values outside the 1.5 IQR fences
    pub n_outliers: usize,
    pub outlier_percentage: f64,
    pub distribution_tests: Option<DistributionTests>,
}

impl ComprehensiveStats {
    /// Confidence interval for the mean
    pub fn confidence_interval(&self) -> ErrorBounds {
        ErrorBounds::new(self.ci_lower, self.mean, self.ci_upper, self.confidence_level)
    }
}

/// Compute a full battery of descriptive statistics
///
/// NaN values are dropped with a warning before anything is computed.
///
/// # Errors
///
/// `InvalidValue` for empty or all-NaN data and for a confidence level
/// outside (0, 1).
///
/// # Example
///
/// ```
/// use streamstats::statistics::{comprehensive_stats, StatsConfig};
///
/// let data: Vec<f64> = (1..=10).map(f64::from).collect();
/// let stats = comprehensive_stats(&data, &StatsConfig::default()).unwrap();
///
/// assert_eq!(stats.mean, 5.5);
/// assert_eq!(stats.median, 5.5);
/// assert!(stats.ci_lower < 5.5 && stats.ci_upper > 5.5);
/// ```
pub fn comprehensive_stats(data: &[f64], config: &StatsConfig) -> Result<ComprehensiveStats> {
    if data.is_empty() {
        return Err(StatsError::invalid_value("data cannot be empty"));
    }
    config.validate()?;

    let clean: Vec<f64> = data.iter().copied().filter(|v| !v.is_nan()).collect();
    let nan_removed = data.len() - clean.len();
    if nan_removed > 0 {
        warn!(
            removed = nan_removed,
            "data contains {} NaN value(s), removing them", nan_removed
        );
    }
    if clean.is_empty() {
        return Err(StatsError::invalid_value("data contains only NaN values"));
    }

    let n = clean.len();
    let sorted = sorted_without_nan(&clean);
    let moments = Moments::from_slice(&clean)
        .ok_or_else(|| StatsError::invalid_value("data cannot be empty"))?;

    let mean = moments.mean;
    let variance = moments.sample_variance();
    let std = variance.sqrt();
    let min = sorted[0];
    let max = sorted[n - 1];

    let lin = |q| quantile(&sorted, q, QuantileMethod::Linear).unwrap_or(mean);
    let median = lin(0.5);
    let q1 = lin(0.25);
    let q3 = lin(0.75);
    let iqr = q3 - q1;
    let (mode, mode_count) = mode_sorted(&sorted).unwrap_or((mean, 0));

    let skewness = if n > 2 { moments.skewness() } else { 0.0 };
    let kurtosis = if n > 3 { moments.excess_kurtosis() } else { 0.0 };

    let ci = mean_confidence_interval(mean, std, n, config.confidence_level)?;

    let lower_fence = q1 - OUTLIER_FENCE * iqr;
    let upper_fence = q3 + OUTLIER_FENCE * iqr;
    let n_outliers = clean
        .iter()
        .filter(|&&v| v < lower_fence || v > upper_fence)
        .count();

    let distribution_tests = if config.include_distribution_tests && n >= 3 {
        Some(distribution_tests(&clean)?)
    } else {
        None
    };

    Ok(ComprehensiveStats {
        n,
        nan_removed,
        mean,
        median,
        mode,
        mode_count,
        std,
        variance,
        min,
        max,
        range: max - min,
        q1,
        q3,
        iqr,
        skewness,
        kurtosis,
        ci_lower: ci.lower,
        ci_upper: ci.upper,
        confidence_level: config.confidence_level,
        n_outliers,
        outlier_percentage: n_outliers as f64 / n as f64 * 100.0,
        distribution_tests,
    })
}

/// Student's t interval `mean ± t(df = n - 1) * std / sqrt(n)`
///
/// Collapses to the mean itself for a single value or zero spread.
fn mean_confidence_interval(mean: f64, std: f64, n: usize, level: f64) -> Result<ErrorBounds> {
    if n < 2 || std == 0.0 {
        return Ok(ErrorBounds::symmetric(mean, 0.0, level));
    }

    let t_dist = StudentsT::new(0.0, 1.0, (n - 1) as f64)
        .map_err(|e| StatsError::invalid_value(e.to_string()))?;
    let t = t_dist.inverse_cdf((1.0 + level) / 2.0);
    let sem = std / (n as f64).sqrt();
    Ok(ErrorBounds::symmetric(mean, t * sem, level))
}

fn distribution_tests(clean: &[f64]) -> Result<DistributionTests> {
    let shapiro_wilk = if clean.len() <= SHAPIRO_MAX_N {
        Some(shapiro_wilk(clean)?)
    } else {
        None
    };
    Ok(DistributionTests {
        shapiro_wilk,
        jarque_bera: jarque_bera(clean)?,
        is_normal: shapiro_wilk
            .filter(|r| !r.p_value.is_nan())
            .map(|r| r.p_value > NORMALITY_ALPHA),
    })
}
