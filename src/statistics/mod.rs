//! Statistical summaries for streaming and in-memory data
//!
//! [`StreamingAggregator`] computes moments over a stream in a single pass
//! with constant memory. [`comprehensive_stats`] computes the full battery of
//! descriptive statistics over a slice held in memory.
//!
//! # Example
//!
//! ```
//! use streamstats::statistics::StreamingAggregator;
//!
//! let mut agg = StreamingAggregator::new();
//!
//! for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
//!     agg.add(value);
//! }
//!
//! println!("Mean: {}", agg.mean());
//! println!("Stddev: {}", agg.std_dev());
//! println!("Min: {:?}", agg.min());
//! println!("Max: {:?}", agg.max());
//! ```

mod aggregator;
mod comprehensive;
pub mod descriptive;
pub mod normality;

pub use aggregator::{AggregateStats, Numeric, StreamingAggregator};
pub use comprehensive::{comprehensive_stats, ComprehensiveStats, DistributionTests, StatsConfig};
pub use descriptive::QuantileMethod;
pub use normality::TestResult;

#[cfg(feature = "parallel")]
#[cfg_attr(docsrs, doc(cfg(feature = "parallel")))]
pub use aggregator::aggregate_parallel;
