//! Entry points for loosely typed input
//!
//! Data decoded from JSON (or handed over by a scripting bridge) arrives as
//! a [`serde_json::Value`] whose shape is only known at runtime. These
//! functions check the shape up front and reject it with
//! [`StatsError::InvalidType`] or [`StatsError::InvalidValue`] before any
//! computation or mutation happens.
//!
//! JSON `null` elements inside a data array stand for missing values and
//! are treated as NaN.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use streamstats::dynamic;
//!
//! let report = dynamic::detect_outliers(
//!     &json!([1, 2, 3, 4, 5, 100, 200]),
//!     &json!({ "methods": ["iqr", "mad"], "consensus_threshold": 1.0 }),
//! )
//! .unwrap();
//! assert_eq!(report.outlier_indices, vec![5, 6]);
//!
//! let err = dynamic::detect_outliers(&json!("not a list"), &json!(null)).unwrap_err();
//! assert!(err.is_type_error());
//! ```

use serde_json::{Map, Value};

use crate::error::{Result, StatsError};
use crate::outliers::{OutlierConfig, OutlierDetector, OutlierMethod, OutlierReport};
use crate::statistics::{ComprehensiveStats, StatsConfig, StreamingAggregator};

const OUTLIER_OPTIONS: [&str; 5] = [
    "methods",
    "zscore_threshold",
    "iqr_multiplier",
    "mad_threshold",
    "consensus_threshold",
];

const STATS_OPTIONS: [&str; 2] = ["confidence_level", "include_distribution_tests"];

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a JSON number; booleans and numeric strings are rejected
pub fn as_number(value: &Value, name: &str) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        StatsError::invalid_type(format!(
            "{} must be a number, got {}",
            name,
            type_name(value)
        ))
    })
}

fn data_array<'a>(data: &'a Value, name: &str) -> Result<&'a [Value]> {
    match data {
        Value::Array(items) => Ok(items.as_slice()),
        other => Err(StatsError::invalid_type(format!(
            "{} must be a list or array of numbers, got {}",
            name,
            type_name(other)
        ))),
    }
}

/// Convert array elements to floats; `null` becomes NaN
fn numeric_data(items: &[Value]) -> Result<Vec<f64>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Null => Ok(f64::NAN),
            Value::Number(n) => n.as_f64().ok_or_else(|| non_numeric(i, item)),
            other => Err(non_numeric(i, other)),
        })
        .collect()
}

fn non_numeric(index: usize, item: &Value) -> StatsError {
    StatsError::invalid_value(format!(
        "data contains non-numeric values: element {} is a {}",
        index,
        type_name(item)
    ))
}

fn options_object<'a>(options: &'a Value, known: &[&str]) -> Result<Option<&'a Map<String, Value>>> {
    let map = match options {
        Value::Null => return Ok(None),
        Value::Object(map) => map,
        other => {
            return Err(StatsError::invalid_type(format!(
                "options must be an object, got {}",
                type_name(other)
            )))
        }
    };
    if let Some(key) = map.keys().find(|k| !known.contains(&k.as_str())) {
        return Err(StatsError::invalid_type(format!("unexpected option '{}'", key)));
    }
    Ok(Some(map))
}

/// Option value, treating an absent key and `null` alike
fn option<'a>(map: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Value> {
    map.and_then(|m| m.get(key)).filter(|v| !v.is_null())
}

fn number_option(map: Option<&Map<String, Value>>, key: &str, default: f64) -> Result<f64> {
    option(map, key).map_or(Ok(default), |v| as_number(v, key))
}

impl StreamingAggregator {
    /// Fold in a JSON number
    ///
    /// # Errors
    ///
    /// `InvalidType` if `value` is not a number; the aggregator is left
    /// untouched.
    pub fn add_value(&mut self, value: &Value) -> Result<()> {
        let v = as_number(value, "value")?;
        self.push(v);
        Ok(())
    }

    /// Fold in every element of a JSON array
    ///
    /// The whole batch is checked before any element is applied, so a
    /// rejected batch leaves the aggregator untouched.
    ///
    /// # Errors
    ///
    /// `InvalidType` if `values` is not an array or holds a non-number.
    pub fn add_batch_value(&mut self, values: &Value) -> Result<()> {
        let items = values.as_array().ok_or_else(|| {
            StatsError::invalid_type(format!("values must be a list, got {}", type_name(values)))
        })?;
        let parsed = items
            .iter()
            .map(|v| as_number(v, "value"))
            .collect::<Result<Vec<f64>>>()?;
        self.add_batch(&parsed);
        Ok(())
    }
}

/// Option types only; values are checked by [`finish_outlier_config`]
fn parse_outlier_options(options: &Value) -> Result<(OutlierConfig, Option<&[Value]>)> {
    let map = options_object(options, &OUTLIER_OPTIONS)?;
    let defaults = OutlierConfig::default();

    let methods = match option(map, "methods") {
        None => None,
        Some(Value::Array(items)) => Some(items.as_slice()),
        Some(other) => {
            return Err(StatsError::invalid_type(format!(
                "methods must be a list or None, got {}",
                type_name(other)
            )))
        }
    };

    let config = OutlierConfig {
        zscore_threshold: number_option(map, "zscore_threshold", defaults.zscore_threshold)?,
        iqr_multiplier: number_option(map, "iqr_multiplier", defaults.iqr_multiplier)?,
        mad_threshold: number_option(map, "mad_threshold", defaults.mad_threshold)?,
        consensus_threshold: number_option(
            map,
            "consensus_threshold",
            defaults.consensus_threshold,
        )?,
        ..defaults
    };
    Ok((config, methods))
}

/// Threshold ranges, then method names
fn finish_outlier_config(config: OutlierConfig, methods: Option<&[Value]>) -> Result<OutlierConfig> {
    config.validate()?;

    let Some(items) = methods else {
        return Ok(config);
    };
    let parsed = items
        .iter()
        .map(|item| match item {
            Value::String(name) => name.parse::<OutlierMethod>(),
            other => other.to_string().parse::<OutlierMethod>(),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(config.with_methods(parsed))
}

/// Build an [`OutlierConfig`] from a JSON options object (or `null`)
pub fn outlier_config(options: &Value) -> Result<OutlierConfig> {
    let (config, methods) = parse_outlier_options(options)?;
    finish_outlier_config(config, methods)
}

/// [`crate::outliers::detect_outliers`] over loosely typed input
///
/// `options` is `null` or an object with any of `methods`,
/// `zscore_threshold`, `iqr_multiplier`, `mad_threshold` and
/// `consensus_threshold`. Argument types are checked first, then the data
/// contents, then option values.
///
/// # Errors
///
/// `InvalidType` for a non-array `data`, a non-array `methods`, a
/// non-numeric threshold or an unexpected option. `InvalidValue` for
/// non-numeric elements, empty data, out-of-range thresholds or an unknown
/// method name.
pub fn detect_outliers(data: &Value, options: &Value) -> Result<OutlierReport> {
    let items = data_array(data, "data")?;
    let (config, methods) = parse_outlier_options(options)?;

    let values = numeric_data(items)?;
    if values.is_empty() {
        return Err(StatsError::invalid_value("data cannot be empty"));
    }

    let config = finish_outlier_config(config, methods)?;
    OutlierDetector::new(config)?.detect(&values)
}

/// Build a [`StatsConfig`] from a JSON options object (or `null`)
pub fn stats_config(options: &Value) -> Result<StatsConfig> {
    let map = options_object(options, &STATS_OPTIONS)?;
    let defaults = StatsConfig::default();

    let include_distribution_tests = match option(map, "include_distribution_tests") {
        None => defaults.include_distribution_tests,
        Some(Value::Bool(flag)) => *flag,
        Some(other) => {
            return Err(StatsError::invalid_type(format!(
                "include_distribution_tests must be a boolean, got {}",
                type_name(other)
            )))
        }
    };

    Ok(StatsConfig {
        confidence_level: number_option(map, "confidence_level", defaults.confidence_level)?,
        include_distribution_tests,
    })
}

/// [`crate::statistics::comprehensive_stats`] over loosely typed input
///
/// # Errors
///
/// `InvalidType` for a non-array `data`, a non-numeric
/// `confidence_level` or a non-boolean `include_distribution_tests`.
/// `InvalidValue` for non-numeric elements, empty data or a confidence
/// level outside (0, 1).
pub fn comprehensive_stats(data: &Value, options: &Value) -> Result<ComprehensiveStats> {
    let items = data_array(data, "data")?;
    let config = stats_config(options)?;
    let values = numeric_data(items)?;
    crate::statistics::comprehensive_stats(&values, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_value_rejects_non_numbers() {
        let mut agg = StreamingAggregator::new();
        agg.add_value(&json!(1.5)).unwrap();

        for bad in [json!("not_a_number"), json!(true), json!(null), json!([1])] {
            let err = agg.add_value(&bad).unwrap_err();
            assert!(err.is_type_error());
            assert!(err.message().starts_with("value must be a number"));
        }
        assert_eq!(agg.count(), 1);
    }

    #[test]
    fn test_add_batch_value_is_all_or_nothing() {
        let mut agg = StreamingAggregator::new();
        agg.add_batch_value(&json!([1, 2, 3])).unwrap();
        assert_eq!(agg.count(), 3);

        let err = agg.add_batch_value(&json!([4, "five", 6])).unwrap_err();
        assert!(err.is_type_error());
        assert_eq!(agg.count(), 3);
        assert!((agg.mean() - 2.0).abs() < 1e-12);

        let err = agg.add_batch_value(&json!({"a": 1})).unwrap_err();
        assert_eq!(err.message(), "values must be a list, got object");
    }

    #[test]
    fn test_detect_outliers_type_errors() {
        let err = detect_outliers(&json!("not a list"), &Value::Null).unwrap_err();
        assert!(err.is_type_error());
        assert!(err.message().starts_with("data must be a list or array"));

        let err = detect_outliers(&json!([1, 2, 3]), &json!({"methods": "zscore"})).unwrap_err();
        assert!(err.is_type_error());
        assert!(err.message().starts_with("methods must be a list or None"));

        let err =
            detect_outliers(&json!([1, 2, 3]), &json!({"zscore_threshold": "3.0"})).unwrap_err();
        assert!(err.is_type_error());
        assert!(err.message().starts_with("zscore_threshold must be a number"));

        let err = detect_outliers(&json!([1, 2, 3]), &json!({"window": 3})).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_detect_outliers_value_errors() {
        let err = detect_outliers(&json!([]), &Value::Null).unwrap_err();
        assert_eq!(err, StatsError::invalid_value("data cannot be empty"));

        let err = detect_outliers(&json!([1, "a", 3]), &Value::Null).unwrap_err();
        assert!(err.is_value_error());

        let err = detect_outliers(&json!([1, 2, 3]), &json!({"methods": ["invalid_method"]}))
            .unwrap_err();
        assert!(err.message().starts_with("Invalid method 'invalid_method'"));

        let err =
            detect_outliers(&json!([1, 2, 3]), &json!({"consensus_threshold": 1.5})).unwrap_err();
        assert!(err.message().starts_with("consensus_threshold must be in (0, 1]"));

        let err = detect_outliers(&json!([1, 2, 3]), &json!({"mad_threshold": -2.0})).unwrap_err();
        assert!(err.message().starts_with("mad_threshold must be positive"));
    }

    #[test]
    fn test_data_checked_before_option_values() {
        let err = detect_outliers(&json!([]), &json!({"mad_threshold": -1})).unwrap_err();
        assert_eq!(err.message(), "data cannot be empty");

        let err = detect_outliers(&json!([1, "a"]), &json!({"methods": ["bogus"]})).unwrap_err();
        assert!(err.message().starts_with("data contains non-numeric values"));

        // Option types still come before data contents
        let err = detect_outliers(&json!([]), &json!({"mad_threshold": "x"})).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_detect_outliers_defaults() {
        let report = detect_outliers(&json!([1, 2, 3, 4, 5, 100, 200]), &Value::Null).unwrap();
        assert_eq!(report.outlier_indices, vec![5, 6]);
        assert_eq!(report.methods_run(), 3);
    }

    #[test]
    fn test_null_elements_are_missing() {
        let report = detect_outliers(
            &json!([1, 2, null, 3, 4, 5, 100, 200]),
            &json!({"methods": ["iqr", "mad"]}),
        )
        .unwrap();
        assert!(!report.is_outlier(2));
        assert!(report.is_outlier(7));
    }

    #[test]
    fn test_comprehensive_stats_errors() {
        let err = comprehensive_stats(&json!(42), &Value::Null).unwrap_err();
        assert!(err.is_type_error());

        let err = comprehensive_stats(&json!([1, 2, "x"]), &Value::Null).unwrap_err();
        assert!(err.is_value_error());
        assert!(err.message().starts_with("data contains non-numeric values"));

        let err = comprehensive_stats(&json!([]), &Value::Null).unwrap_err();
        assert_eq!(err.message(), "data cannot be empty");

        let err =
            comprehensive_stats(&json!([1, 2]), &json!({"confidence_level": "high"})).unwrap_err();
        assert!(err.is_type_error());

        let err = comprehensive_stats(&json!([1, 2]), &json!({"include_distribution_tests": 1}))
            .unwrap_err();
        assert!(err.is_type_error());

        let err =
            comprehensive_stats(&json!([1, 2]), &json!({"confidence_level": 1.0})).unwrap_err();
        assert!(err.is_value_error());
    }

    #[test]
    fn test_comprehensive_stats_with_nulls() {
        let stats = comprehensive_stats(
            &json!([1.0, null, 2.0, 3.0]),
            &json!({"include_distribution_tests": false}),
        )
        .unwrap();
        assert_eq!(stats.n, 3);
        assert_eq!(stats.nan_removed, 1);
        assert!(stats.distribution_tests.is_none());
    }
}
