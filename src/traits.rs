//! Core traits shared by the streaming accumulators
//!
//! Every accumulator implements [`Sketch`], which is what makes fork-join
//! aggregation possible: one accumulator per partition, merged at the end.

use core::fmt::Debug;

/// Interval estimate around a point value
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorBounds {
    /// Lower bound of the estimate
    pub lower: f64,
    /// Point estimate
    pub estimate: f64,
    /// Upper bound of the estimate
    pub upper: f64,
    /// Confidence level (e.g., 0.95 for 95%)
    pub confidence: f64,
}

impl ErrorBounds {
    /// Create new error bounds
    pub fn new(lower: f64, estimate: f64, upper: f64, confidence: f64) -> Self {
        Self {
            lower,
            estimate,
            upper,
            confidence,
        }
    }

    /// Symmetric bounds `estimate ± margin`
    pub fn symmetric(estimate: f64, margin: f64, confidence: f64) -> Self {
        Self::new(estimate - margin, estimate, estimate + margin, confidence)
    }

    /// Check if a value falls within bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Width of the confidence interval
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Core trait for mergeable streaming accumulators
pub trait Sketch: Clone + Debug {
    /// The type of item this sketch processes
    type Item: ?Sized;

    /// Add an item to the sketch
    fn update(&mut self, item: &Self::Item);

    /// Merge another sketch into this one
    ///
    /// The result must equal feeding every item `other` saw into `self`.
    fn merge(&mut self, other: &Self);

    /// Reset sketch to empty state
    fn clear(&mut self);

    /// Memory usage in bytes
    fn size_bytes(&self) -> usize;

    /// Number of items processed
    fn count(&self) -> u64;

    /// Check if sketch is empty
    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Merge a sequence of partial sketches into one
///
/// Returns `None` when `parts` is empty.
pub fn merge_all<S, I>(parts: I) -> Option<S>
where
    S: Sketch,
    I: IntoIterator<Item = S>,
{
    let mut iter = parts.into_iter();
    let mut acc = iter.next()?;
    for part in iter {
        acc.merge(&part);
    }
    Some(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_bounds() {
        let bounds = ErrorBounds::new(90.0, 100.0, 110.0, 0.95);

        assert!(bounds.contains(100.0));
        assert!(bounds.contains(90.0));
        assert!(bounds.contains(110.0));
        assert!(!bounds.contains(89.0));
        assert!(!bounds.contains(111.0));

        assert_eq!(bounds.width(), 20.0);
    }

    #[test]
    fn test_symmetric_bounds() {
        let bounds = ErrorBounds::symmetric(5.0, 1.5, 0.9);
        assert_eq!(bounds.lower, 3.5);
        assert_eq!(bounds.upper, 6.5);
        assert_eq!(bounds.confidence, 0.9);
    }
}
