//! Core types for outlier detection.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StatsError};
use crate::statistics::QuantileMethod;

/// Statistical method taking part in the consensus vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OutlierMethod {
    ZScore,
    Iqr,
    Mad,
    Isolation,
}

impl OutlierMethod {
    /// Every method, in report order.
    pub const ALL: [OutlierMethod; 4] = [Self::ZScore, Self::Iqr, Self::Mad, Self::Isolation];

    /// Methods run when none are requested.
    pub const DEFAULT: [OutlierMethod; 3] = [Self::ZScore, Self::Iqr, Self::Mad];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ZScore => "zscore",
            Self::Iqr => "iqr",
            Self::Mad => "mad",
            Self::Isolation => "isolation",
        }
    }
}

impl fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutlierMethod {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| {
                StatsError::invalid_value(format!(
                    "Invalid method '{}'. Valid methods: zscore, iqr, mad, isolation",
                    s
                ))
            })
    }
}

/// Configuration for consensus outlier detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OutlierConfig {
    /// Methods to run (default: zscore, iqr, mad).
    pub methods: Vec<OutlierMethod>,
    /// |z| above this is flagged (default: 3.0).
    pub zscore_threshold: f64,
    /// Tukey fence multiplier (default: 1.5).
    pub iqr_multiplier: f64,
    /// |modified z| above this is flagged (default: 3.5).
    pub mad_threshold: f64,
    /// Fraction of methods that must agree, in (0, 1] (default: 0.5).
    pub consensus_threshold: f64,
    /// Quartile rule for the IQR fences (default: lower order statistic).
    pub quartile_method: QuantileMethod,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            methods: OutlierMethod::DEFAULT.to_vec(),
            zscore_threshold: 3.0,
            iqr_multiplier: 1.5,
            mad_threshold: 3.5,
            consensus_threshold: 0.5,
            quartile_method: QuantileMethod::Lower,
        }
    }
}

impl OutlierConfig {
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = OutlierMethod>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    pub fn with_zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore_threshold = threshold;
        self
    }

    pub fn with_iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = multiplier;
        self
    }

    pub fn with_mad_threshold(mut self, threshold: f64) -> Self {
        self.mad_threshold = threshold;
        self
    }

    pub fn with_consensus_threshold(mut self, threshold: f64) -> Self {
        self.consensus_threshold = threshold;
        self
    }

    pub fn with_quartile_method(mut self, method: QuantileMethod) -> Self {
        self.quartile_method = method;
        self
    }

    /// Check every threshold is in range.
    pub fn validate(&self) -> Result<()> {
        positive("zscore_threshold", self.zscore_threshold)?;
        positive("iqr_multiplier", self.iqr_multiplier)?;
        positive("mad_threshold", self.mad_threshold)?;

        let c = self.consensus_threshold;
        if !(c > 0.0 && c <= 1.0) {
            return Err(StatsError::invalid_value(format!(
                "consensus_threshold must be in (0, 1], got {}",
                c
            )));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    // NaN fails the comparison as well
    if value > 0.0 {
        Ok(())
    } else {
        Err(StatsError::invalid_value(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

/// Result of a consensus outlier run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutlierReport {
    /// Ascending positions of consensus outliers.
    pub outlier_indices: Vec<usize>,
    /// Values at `outlier_indices`, same order.
    pub outlier_values: Vec<f64>,
    /// Per-method flags, one per input element.
    pub method_results: BTreeMap<OutlierMethod, Vec<bool>>,
    /// Fraction of methods run that flagged each element.
    pub consensus_scores: Vec<f64>,
    /// Threshold the scores were compared against.
    pub consensus_threshold: f64,
}

impl OutlierReport {
    /// Number of methods that actually ran.
    pub fn methods_run(&self) -> usize {
        self.method_results.len()
    }

    pub fn is_outlier(&self, index: usize) -> bool {
        self.outlier_indices.binary_search(&index).is_ok()
    }

    /// Number of consensus outliers.
    pub fn len(&self) -> usize {
        self.outlier_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outlier_indices.is_empty()
    }
}
