//! Outlier detection by consensus of independent methods
//!
//! Each method has known blind spots, so a point is reported only when a
//! configurable fraction of the methods that ran agree:
//! - Z-Score → assumes near-normal data
//! - IQR with Tukey fences → non-parametric
//! - Modified Z-Score / MAD → robust to heavy contamination
//! - Isolation forest → pluggable [`AnomalyDetector`], skipped when none is registered
//!
//! # Example
//!
//! ```
//! use streamstats::outliers::{detect_outliers, OutlierConfig, OutlierMethod};
//!
//! let data = [10.0, 11.0, 9.5, 10.2, 10.8, 9.9, 45.0];
//! let config = OutlierConfig::default()
//!     .with_methods([OutlierMethod::Iqr, OutlierMethod::Mad])
//!     .with_consensus_threshold(1.0);
//!
//! let report = detect_outliers(&data, &config).unwrap();
//! assert_eq!(report.outlier_indices, vec![6]);
//! ```

mod ensemble;
pub mod iqr;
mod isolation;
pub mod mad;
mod types;
pub mod zscore;

pub use ensemble::{detect_outliers, OutlierDetector};
pub use isolation::AnomalyDetector;
pub use types::{OutlierConfig, OutlierMethod, OutlierReport};

#[cfg(feature = "isolation")]
#[cfg_attr(docsrs, doc(cfg(feature = "isolation")))]
pub use isolation::IsolationForest;
