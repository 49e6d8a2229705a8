//! Consensus voting across independent detectors.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, warn};

use super::isolation::AnomalyDetector;
use super::types::{OutlierConfig, OutlierMethod, OutlierReport};
use super::{iqr, mad, zscore};
use crate::error::{Result, StatsError};

/// Reusable consensus outlier detector.
///
/// Owns a validated [`OutlierConfig`] and, optionally, the detector behind
/// the `isolation` vote. With the `isolation` feature the built-in
/// [`IsolationForest`](super::IsolationForest) is registered by default.
/// When no detector is registered, `isolation` is skipped and left out of
/// the consensus denominator.
pub struct OutlierDetector {
    config: OutlierConfig,
    anomaly_detector: Option<Box<dyn AnomalyDetector>>,
}

impl fmt::Debug for OutlierDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlierDetector")
            .field("config", &self.config)
            .field("has_anomaly_detector", &self.anomaly_detector.is_some())
            .finish()
    }
}

fn builtin_anomaly_detector() -> Option<Box<dyn AnomalyDetector>> {
    #[cfg(feature = "isolation")]
    {
        Some(Box::new(super::IsolationForest::default()))
    }
    #[cfg(not(feature = "isolation"))]
    {
        None
    }
}

impl OutlierDetector {
    /// Validate `config` and register the built-in anomaly detector, if any.
    pub fn new(config: OutlierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            anomaly_detector: builtin_anomaly_detector(),
        })
    }

    /// Use `detector` for the `isolation` vote.
    pub fn with_anomaly_detector(mut self, detector: impl AnomalyDetector + 'static) -> Self {
        self.anomaly_detector = Some(Box::new(detector));
        self
    }

    /// Unregister the anomaly detector; `isolation` will be skipped.
    pub fn without_anomaly_detector(mut self) -> Self {
        self.anomaly_detector = None;
        self
    }

    pub fn has_anomaly_detector(&self) -> bool {
        self.anomaly_detector.is_some()
    }

    pub fn config(&self) -> &OutlierConfig {
        &self.config
    }

    /// Run every configured method over `data` and combine their votes.
    ///
    /// The built-in methods never flag NaN elements, and NaN never feeds
    /// their reference statistics.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if `data` is empty, or if a registered anomaly
    /// detector returns the wrong number of labels.
    pub fn detect(&self, data: &[f64]) -> Result<OutlierReport> {
        if data.is_empty() {
            return Err(StatsError::invalid_value("data cannot be empty"));
        }

        let cfg = &self.config;
        let mut method_results: BTreeMap<OutlierMethod, Vec<bool>> = BTreeMap::new();

        for &method in &cfg.methods {
            if method_results.contains_key(&method) {
                continue;
            }
            let flags = match method {
                OutlierMethod::ZScore => zscore::detect(data, cfg.zscore_threshold),
                OutlierMethod::Iqr => iqr::detect(data, cfg.iqr_multiplier, cfg.quartile_method),
                OutlierMethod::Mad => mad::detect(data, cfg.mad_threshold),
                OutlierMethod::Isolation => match &self.anomaly_detector {
                    Some(detector) => {
                        let labels = detector.fit_predict(data);
                        if labels.len() != data.len() {
                            return Err(StatsError::invalid_value(format!(
                                "anomaly detector returned {} labels for {} values",
                                labels.len(),
                                data.len()
                            )));
                        }
                        labels
                    }
                    None => {
                        debug!("no anomaly detector registered, skipping isolation");
                        continue;
                    }
                },
            };

            debug!(
                method = %method,
                flagged = flags.iter().filter(|&&f| f).count(),
                "outlier method finished"
            );
            method_results.insert(method, flags);
        }

        Ok(combine(data, method_results, cfg.consensus_threshold))
    }
}

/// Score each element by the fraction of methods that flagged it.
fn combine(
    data: &[f64],
    method_results: BTreeMap<OutlierMethod, Vec<bool>>,
    consensus_threshold: f64,
) -> OutlierReport {
    let n_methods = method_results.len();
    let mut votes = vec![0usize; data.len()];
    for flags in method_results.values() {
        for (vote, &flagged) in votes.iter_mut().zip(flags) {
            *vote += usize::from(flagged);
        }
    }

    let consensus_scores: Vec<f64> = if n_methods == 0 {
        warn!("no outlier methods could run, reporting no outliers");
        vec![0.0; data.len()]
    } else {
        votes
            .iter()
            .map(|&v| v as f64 / n_methods as f64)
            .collect()
    };

    let outlier_indices: Vec<usize> = consensus_scores
        .iter()
        .enumerate()
        .filter(|(_, &score)| score >= consensus_threshold)
        .map(|(i, _)| i)
        .collect();
    let outlier_values = outlier_indices.iter().map(|&i| data[i]).collect();

    OutlierReport {
        outlier_indices,
        outlier_values,
        method_results,
        consensus_scores,
        consensus_threshold,
    }
}

/// Detect outliers by consensus of several statistical methods.
///
/// Convenience wrapper over [`OutlierDetector`] with the built-in anomaly
/// detector.
///
/// # Example
///
/// ```
/// use streamstats::outliers::{detect_outliers, OutlierConfig};
///
/// let report = detect_outliers(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0, 200.0], &OutlierConfig::default()).unwrap();
/// assert_eq!(report.outlier_indices, vec![5, 6]);
/// assert_eq!(report.outlier_values, vec![100.0, 200.0]);
/// ```
pub fn detect_outliers(data: &[f64], config: &OutlierConfig) -> Result<OutlierReport> {
    if data.is_empty() {
        return Err(StatsError::invalid_value("data cannot be empty"));
    }
    OutlierDetector::new(config.clone())?.detect(data)
}
