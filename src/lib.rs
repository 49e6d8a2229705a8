//! # Streamstats
//!
//! Streaming aggregation and consensus outlier detection for scalar data.
//!
//! Streamstats keeps running statistics over unbounded streams in constant
//! memory, flags outliers by letting several independent detectors vote, and
//! produces a full descriptive summary (with normality tests) for data held in
//! memory.
//!
//! ## Features
//!
//! - **Streaming Aggregation**: Welford mean/variance, min, max, sum in one pass
//! - **Full Mergeability**: Partial aggregators combine exactly across workers
//! - **Consensus Outliers**: Z-Score, IQR, MAD and isolation forest vote together
//! - **Comprehensive Stats**: Quartiles, shape, confidence interval, Shapiro-Wilk
//! - **Dynamic Input**: `serde_json::Value` entry points with type validation
//!
//! ## Quick Start
//!
//! ```rust
//! use streamstats::prelude::*;
//!
//! let mut agg = StreamingAggregator::new();
//! for latency_ms in [12, 15, 11, 14, 250] {
//!     agg.add(latency_ms);
//! }
//! println!("mean latency: {:.1}ms", agg.mean());
//!
//! let report = detect_outliers(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0, 200.0], &OutlierConfig::default())
//!     .unwrap();
//! assert_eq!(report.outlier_indices, vec![5, 6]);
//! ```
//!
//! ## Distributed Computing
//!
//! [`StreamingAggregator`](statistics::StreamingAggregator) implements the
//! [`Sketch`](traits::Sketch) trait, so partial aggregates computed on
//! separate workers merge into the aggregate of the whole stream:
//!
//! ```rust
//! use streamstats::statistics::StreamingAggregator;
//!
//! let mut worker1 = StreamingAggregator::new();
//! let mut worker2 = StreamingAggregator::new();
//!
//! // Each worker processes its partition
//! worker1.add_batch(&[1.0, 2.0, 3.0]);
//! worker2.add_batch(&[4.0, 5.0]);
//!
//! // Merge results
//! worker1.merge(&worker2);
//! assert_eq!(worker1.count(), 5);
//! assert!((worker1.mean() - 3.0).abs() < 1e-12);
//! ```
//!
//! ## Feature Flags
//!
//! Algorithm families:
//! - `statistics` (default): streaming aggregator, comprehensive stats, normality tests
//! - `outliers` (default): consensus outlier detection
//! - `isolation` (default): built-in isolation forest for the `isolation` vote
//! - `full`: Enable everything
//!
//! Integration features:
//! - `dynamic` (default): `serde_json::Value` entry points
//! - `serde` (default): Enable serialization of configs and reports
//! - `parallel`: rayon-backed chunked aggregation

#![cfg_attr(docsrs, feature(doc_cfg))]

// Core types always available
pub mod error;
pub mod traits;

#[cfg(feature = "statistics")]
#[cfg_attr(docsrs, doc(cfg(feature = "statistics")))]
pub mod statistics;

#[cfg(feature = "outliers")]
#[cfg_attr(docsrs, doc(cfg(feature = "outliers")))]
pub mod outliers;

#[cfg(feature = "dynamic")]
#[cfg_attr(docsrs, doc(cfg(feature = "dynamic")))]
pub mod dynamic;

pub mod prelude {
    pub use crate::error::StatsError;
    pub use crate::traits::*;

    #[cfg(feature = "statistics")]
    pub use crate::statistics::{
        comprehensive_stats, AggregateStats, ComprehensiveStats, StatsConfig, StreamingAggregator,
    };

    #[cfg(feature = "outliers")]
    pub use crate::outliers::{
        detect_outliers, AnomalyDetector, OutlierConfig, OutlierDetector, OutlierMethod,
        OutlierReport,
    };
}

pub use error::{Result, StatsError};

#[cfg(feature = "statistics")]
pub use statistics::{comprehensive_stats, StreamingAggregator};

#[cfg(feature = "outliers")]
pub use outliers::detect_outliers;
