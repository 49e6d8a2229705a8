//! Isolation forest anomaly detection
//!
//! Points that random axis splits isolate quickly are anomalous. Each tree
//! is grown on a random subsample; a point's anomaly score is
//! `2^(-E[h(x)] / c(psi))` where `h` is its path length and `c(psi)` the
//! average path length of an unsuccessful BST search over `psi` points.
//! Scores above 0.5 are labelled anomalous.
//!
//! The ensemble consumes detectors through [`AnomalyDetector`], so the
//! built-in forest can be swapped out or left unregistered.

/// Anomaly detector plugged into the `isolation` vote
pub trait AnomalyDetector: Send + Sync {
    /// Fit on `data` and label each element (`true` = anomalous)
    ///
    /// Must return exactly one label per input element.
    fn fit_predict(&self, data: &[f64]) -> Vec<bool>;
}

#[cfg(feature = "isolation")]
pub use forest::IsolationForest;

#[cfg(feature = "isolation")]
mod forest {
    use std::collections::HashMap;

    use super::AnomalyDetector;

    const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

    /// Score above which a point is labelled anomalous
    const ANOMALY_SCORE_THRESHOLD: f64 = 0.5;

    /// Simple xorshift64 PRNG, seeded for reproducible forests
    #[derive(Clone, Debug)]
    struct Xorshift64 {
        state: u64,
    }

    impl Xorshift64 {
        fn new(seed: u64) -> Self {
            Self {
                state: if seed == 0 { 0x853c49e6748fea9b } else { seed },
            }
        }

        fn next(&mut self) -> u64 {
            let mut x = self.state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.state = x;
            x
        }

        /// Uniform f64 in [0, 1)
        fn next_f64(&mut self) -> f64 {
            (self.next() >> 11) as f64 / (1u64 << 53) as f64
        }

        /// Uniform usize in [0, bound)
        fn next_bounded(&mut self, bound: usize) -> usize {
            // Rejection sampling removes modulo bias
            let bound = bound as u64;
            let threshold = bound.wrapping_neg() % bound;
            loop {
                let r = self.next();
                if r >= threshold {
                    return (r % bound) as usize;
                }
            }
        }
    }

    #[derive(Debug)]
    enum Node {
        Leaf {
            size: usize,
        },
        Split {
            threshold: f64,
            left: Box<Node>,
            right: Box<Node>,
        },
    }

    impl Node {
        fn grow(values: Vec<f64>, depth: usize, height_limit: usize, rng: &mut Xorshift64) -> Self {
            if depth >= height_limit || values.len() <= 1 {
                return Node::Leaf { size: values.len() };
            }

            let (min, max) = values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            if min >= max {
                return Node::Leaf { size: values.len() };
            }

            // threshold in [min, max): both sides are non-empty
            let threshold = min + rng.next_f64() * (max - min);
            let (left, right): (Vec<f64>, Vec<f64>) = values.into_iter().partition(|&v| v <= threshold);

            Node::Split {
                threshold,
                left: Box::new(Node::grow(left, depth + 1, height_limit, rng)),
                right: Box::new(Node::grow(right, depth + 1, height_limit, rng)),
            }
        }

        fn path_length(&self, x: f64) -> f64 {
            let mut node = self;
            let mut depth = 0.0;
            loop {
                match node {
                    Node::Leaf { size } => return depth + average_path_length(*size),
                    Node::Split {
                        threshold,
                        left,
                        right,
                    } => {
                        node = if x <= *threshold { left } else { right };
                        depth += 1.0;
                    }
                }
            }
        }
    }

    /// c(n): average path length of an unsuccessful BST search
    fn average_path_length(n: usize) -> f64 {
        match n {
            0 | 1 => 0.0,
            2 => 1.0,
            _ => {
                let n = n as f64;
                2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
            }
        }
    }

    /// Isolation forest over one-dimensional data
    ///
    /// # Example
    ///
    /// ```
    /// use streamstats::outliers::{AnomalyDetector, IsolationForest};
    ///
    /// let mut data: Vec<f64> = (0..100).map(|i| (i % 10) as f64).collect();
    /// data.push(500.0);
    ///
    /// let labels = IsolationForest::default().fit_predict(&data);
    /// assert!(labels[100]);
    /// ```
    #[derive(Debug, Clone, PartialEq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(default))]
    pub struct IsolationForest {
        /// Number of trees (default: 100)
        pub n_estimators: usize,
        /// Subsample size per tree (default: 256)
        pub max_samples: usize,
        /// PRNG seed (default: 42)
        pub seed: u64,
    }

    impl Default for IsolationForest {
        fn default() -> Self {
            Self {
                n_estimators: 100,
                max_samples: 256,
                seed: 42,
            }
        }
    }

    impl IsolationForest {
        pub fn new(n_estimators: usize, max_samples: usize, seed: u64) -> Self {
            Self {
                n_estimators: n_estimators.max(1),
                max_samples: max_samples.max(2),
                seed,
            }
        }

        /// Anomaly score in (0, 1] for each element; NaN elements score NaN
        ///
        /// Returns `None` when fewer than two non-NaN values are present.
        pub fn score_samples(&self, data: &[f64]) -> Option<Vec<f64>> {
            let clean: Vec<f64> = data.iter().copied().filter(|v| !v.is_nan()).collect();
            if clean.len() < 2 {
                return None;
            }

            let psi = self.max_samples.max(2).min(clean.len());
            let height_limit = (psi as f64).log2().ceil() as usize;
            let mut rng = Xorshift64::new(self.seed);

            let trees: Vec<Node> = (0..self.n_estimators.max(1))
                .map(|_| {
                    let sample = subsample(&clean, psi, &mut rng);
                    Node::grow(sample, 0, height_limit, &mut rng)
                })
                .collect();

            let normalizer = average_path_length(psi);
            let scores = data
                .iter()
                .map(|&x| {
                    if x.is_nan() {
                        return f64::NAN;
                    }
                    let mean_path =
                        trees.iter().map(|t| t.path_length(x)).sum::<f64>() / trees.len() as f64;
                    2f64.powf(-mean_path / normalizer)
                })
                .collect();
            Some(scores)
        }
    }

    /// `k` values drawn without replacement
    ///
    /// Partial Fisher-Yates over indices; only displaced positions are
    /// stored, so a draw costs O(k) regardless of `values.len()`.
    fn subsample(values: &[f64], k: usize, rng: &mut Xorshift64) -> Vec<f64> {
        let n = values.len();
        let k = k.min(n);
        let mut displaced: HashMap<usize, usize> = HashMap::with_capacity(2 * k);
        let mut sample = Vec::with_capacity(k);
        for i in 0..k {
            let j = i + rng.next_bounded(n - i);
            let at_i = displaced.get(&i).copied().unwrap_or(i);
            let at_j = displaced.get(&j).copied().unwrap_or(j);
            displaced.insert(j, at_i);
            sample.push(values[at_j]);
        }
        sample
    }

    impl AnomalyDetector for IsolationForest {
        fn fit_predict(&self, data: &[f64]) -> Vec<bool> {
            match self.score_samples(data) {
                Some(scores) => scores
                    .iter()
                    .map(|&s| s > ANOMALY_SCORE_THRESHOLD)
                    .collect(),
                None => vec![false; data.len()],
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn spread_sample() -> Vec<f64> {
            // Deterministic values in [-2.5, 2.5], denser near zero
            (0..100)
                .map(|i| {
                    let u = (i as f64 + 0.5) / 100.0 * 2.0 - 1.0;
                    2.5 * u * u * u.signum()
                })
                .collect()
        }

        #[test]
        fn test_average_path_length() {
            assert_eq!(average_path_length(1), 0.0);
            assert_eq!(average_path_length(2), 1.0);
            let c256 = average_path_length(256);
            assert!((c256 - 10.2447).abs() < 1e-3, "c(256) = {}", c256);
        }

        #[test]
        fn test_extremes_flagged() {
            let mut data = spread_sample();
            data.extend([10.0, 15.0, -10.0]);

            let labels = IsolationForest::default().fit_predict(&data);
            assert_eq!(labels.len(), data.len());
            assert!(labels[100] && labels[101] && labels[102]);
            // The central point is never isolated early
            assert!(!labels[50]);
            assert!(labels.iter().filter(|&&l| l).count() < data.len() / 2);
        }

        #[test]
        fn test_deterministic() {
            let mut data = spread_sample();
            data.push(40.0);
            let forest = IsolationForest::default();
            assert_eq!(forest.score_samples(&data), forest.score_samples(&data));
        }

        #[test]
        fn test_scores_in_unit_interval() {
            let scores = IsolationForest::default()
                .score_samples(&spread_sample())
                .unwrap();
            assert!(scores.iter().all(|&s| s > 0.0 && s <= 1.0));
        }

        #[test]
        fn test_degenerate_input() {
            let forest = IsolationForest::default();
            assert_eq!(forest.fit_predict(&[1.0]), vec![false]);
            assert_eq!(forest.fit_predict(&[f64::NAN, 2.0]), vec![false, false]);
            assert!(forest.fit_predict(&[3.0; 10]).iter().all(|&l| !l));
        }

        #[test]
        fn test_subsample_without_replacement() {
            let mut rng = Xorshift64::new(7);
            let values: Vec<f64> = (0..50).map(f64::from).collect();
            let mut sample = subsample(&values, 20, &mut rng);
            assert_eq!(sample.len(), 20);
            sample.sort_by(|a, b| a.partial_cmp(b).unwrap());
            sample.dedup();
            assert_eq!(sample.len(), 20);
        }

        #[test]
        fn test_subsample_whole_pool_is_permutation() {
            let mut rng = Xorshift64::new(11);
            let values: Vec<f64> = (0..30).map(f64::from).collect();
            let mut sample = subsample(&values, 30, &mut rng);
            sample.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(sample, values);

            // Asking for more than the pool holds returns the pool
            assert_eq!(subsample(&values, 100, &mut rng).len(), 30);
        }

        #[test]
        fn test_subsample_covers_large_pool() {
            // Draws reach the far end of the pool, not just the prefix
            let mut rng = Xorshift64::new(42);
            let values: Vec<f64> = (0..100_000).map(f64::from).collect();
            let sample = subsample(&values, 256, &mut rng);
            assert_eq!(sample.len(), 256);
            assert!(sample.iter().any(|&v| v >= 50_000.0));
            assert!(sample.iter().all(|&v| (0.0..100_000.0).contains(&v)));
        }
    }
}
