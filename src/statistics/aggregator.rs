//! Streaming aggregator (count, sum, mean, variance, min, max)
//!
//! Computes descriptive statistics over an unbounded stream using Welford's
//! numerically stable online algorithm. Partial aggregates combine with
//! Chan et al.'s parallel formula, so a stream can be split across workers
//! and merged without replaying raw values.

use crate::traits::Sketch;

/// Scalar types the aggregator accepts
///
/// Implemented for every primitive integer and float type. Integers are
/// converted with `as f64`, so values beyond 2^53 lose precision.
pub trait Numeric: Copy {
    /// Convert to `f64`
    fn to_f64(self) -> f64;
}

macro_rules! impl_numeric {
    ($($t:ty),*) => {
        $(
            impl Numeric for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_numeric!(f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Streaming statistics accumulator
///
/// Keeps O(1) state no matter how many values are folded in. The sample
/// variance (Bessel's correction) is reported as `0.0` until at least two
/// values have been seen, and the mean is `0.0` for an empty aggregator.
///
/// # Example
///
/// ```
/// use streamstats::statistics::StreamingAggregator;
///
/// let mut agg = StreamingAggregator::new();
/// agg.add_batch(&[2, 4, 6, 8]);
///
/// assert_eq!(agg.count(), 4);
/// assert!((agg.mean() - 5.0).abs() < 1e-12);
/// assert!((agg.variance() - 20.0 / 3.0).abs() < 1e-12);
/// assert_eq!(agg.min(), Some(2.0));
/// assert_eq!(agg.max(), Some(8.0));
/// ```
///
/// # Distributed Usage
///
/// ```
/// use streamstats::statistics::StreamingAggregator;
///
/// let mut left = StreamingAggregator::new();
/// let mut right = StreamingAggregator::new();
///
/// left.add_batch(&[1.0, 2.0, 3.0]);
/// right.add_batch(&[4.0, 5.0, 6.0]);
///
/// left.merge(&right);
/// assert_eq!(left.count(), 6);
/// assert!((left.mean() - 3.5).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct StreamingAggregator {
    /// Number of values seen
    count: u64,
    /// Running total
    sum: f64,
    /// Running mean
    mean: f64,
    /// Sum of squared differences from mean (M2 in Welford's algorithm)
    m2: f64,
    /// Minimum value
    min: f64,
    /// Maximum value
    max: f64,
}

/// Point-in-time snapshot of a [`StreamingAggregator`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregateStats {
    pub count: u64,
    pub sum: f64,
    pub mean: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Sample variance
    pub variance: f64,
    /// Sample standard deviation
    pub std_dev: f64,
}

impl Default for StreamingAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingAggregator {
    /// Create a new empty aggregator
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Fold one value into the aggregate
    ///
    /// NaN values are ignored to prevent poisoning the statistics.
    pub fn add<T: Numeric>(&mut self, value: T) {
        self.push(value.to_f64());
    }

    pub(crate) fn push(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }

        self.count += 1;
        self.sum += value;

        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }

        // Welford's algorithm. delta2 must use the updated mean.
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    /// Fold every value of `values` in order
    pub fn add_batch<T: Numeric>(&mut self, values: &[T]) {
        for &value in values {
            self.add(value);
        }
    }

    /// Number of values folded in
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Alias for [`count`](Self::count)
    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Sum of all values
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Arithmetic mean, `0.0` when empty
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance `m2 / (n - 1)`, `0.0` when fewer than two values
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Sample standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Population variance `m2 / n`, `0.0` when empty
    pub fn population_variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    pub fn min(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.min)
        }
    }

    pub fn max(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.max)
        }
    }

    /// Range (max - min)
    pub fn range(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.max - self.min)
        }
    }

    /// Snapshot of every statistic
    pub fn get_stats(&self) -> AggregateStats {
        AggregateStats {
            count: self.count,
            sum: self.sum,
            mean: self.mean(),
            min: self.min(),
            max: self.max(),
            variance: self.variance(),
            std_dev: self.std_dev(),
        }
    }

    /// Return to the empty state in place
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Combine `other` into `self` using Chan et al.'s parallel algorithm
    ///
    /// Merging an empty aggregator is a no-op; merging into an empty one
    /// copies `other`.
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }

        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let total = self.count + other.count;
        let total_f = total as f64;
        let delta = other.mean - self.mean;

        self.m2 = self.m2 + other.m2 + delta * delta * n_a * n_b / total_f;
        self.mean = (n_a * self.mean + n_b * other.mean) / total_f;
        self.count = total;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

impl Sketch for StreamingAggregator {
    type Item = f64;

    fn update(&mut self, item: &Self::Item) {
        self.push(*item);
    }

    fn merge(&mut self, other: &Self) {
        StreamingAggregator::merge(self, other);
    }

    fn clear(&mut self) {
        self.reset();
    }

    fn size_bytes(&self) -> usize {
        core::mem::size_of::<Self>()
    }

    fn count(&self) -> u64 {
        self.count
    }
}

impl<T: Numeric> Extend<T> for StreamingAggregator {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: Numeric> FromIterator<T> for StreamingAggregator {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut agg = Self::new();
        agg.extend(iter);
        agg
    }
}

/// Aggregate `values` in parallel, one aggregator per chunk, merged at the end
///
/// A `chunk_size` of zero is treated as one.
#[cfg(feature = "parallel")]
#[cfg_attr(docsrs, doc(cfg(feature = "parallel")))]
pub fn aggregate_parallel<T>(values: &[T], chunk_size: usize) -> StreamingAggregator
where
    T: Numeric + Send + Sync,
{
    use rayon::prelude::*;

    values
        .par_chunks(chunk_size.max(1))
        .map(|chunk| {
            let mut agg = StreamingAggregator::new();
            agg.add_batch(chunk);
            agg
        })
        .reduce(StreamingAggregator::new, |mut acc, part| {
            acc.merge(&part);
            acc
        })
}
