//! Exact descriptive statistics over in-memory slices
//!
//! These are the building blocks shared by [`comprehensive_stats`] and the
//! outlier detectors. Functions taking a `sorted` argument expect an
//! ascending slice without NaN.
//!
//! [`comprehensive_stats`]: super::comprehensive_stats

use core::cmp::Ordering;

/// How a quantile falls between two order statistics
///
/// Mirrors the classic interpolation choices: with fractional rank
/// `r = q * (n - 1)` between indices `i` and `i + 1`:
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QuantileMethod {
    /// `x[i] + (x[i + 1] - x[i]) * frac`
    #[default]
    Linear,
    /// `x[i]`
    Lower,
    /// `x[i + 1]`
    Higher,
    /// Whichever is closer, ties to the even index
    Nearest,
    /// `(x[i] + x[i + 1]) / 2`
    Midpoint,
}

/// Total order on floats for sorting; NaN sorts last
#[inline]
pub(crate) fn cmp_f64(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Copy the non-NaN values of `data` into an ascending vector
pub fn sorted_without_nan(data: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = data.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(cmp_f64);
    sorted
}

/// Quantile `q` (0.0 to 1.0) of an ascending slice
///
/// Returns `None` for an empty slice. `q` is clamped to `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64, method: QuantileMethod) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }

    let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let frac = rank - lower as f64;

    let value = match method {
        QuantileMethod::Linear => {
            if frac > 0.0 {
                sorted[lower] + (sorted[upper] - sorted[lower]) * frac
            } else {
                sorted[lower]
            }
        }
        QuantileMethod::Lower => sorted[lower],
        QuantileMethod::Higher => {
            if frac > 0.0 {
                sorted[upper]
            } else {
                sorted[lower]
            }
        }
        QuantileMethod::Nearest => sorted[(rank.round_ties_even() as usize).min(n - 1)],
        QuantileMethod::Midpoint => {
            if frac > 0.0 {
                (sorted[lower] + sorted[upper]) / 2.0
            } else {
                sorted[lower]
            }
        }
    };
    Some(value)
}

/// First and third quartiles of an ascending slice
pub fn quartiles(sorted: &[f64], method: QuantileMethod) -> Option<(f64, f64)> {
    Some((
        quantile(sorted, 0.25, method)?,
        quantile(sorted, 0.75, method)?,
    ))
}

/// Median of an ascending slice
pub fn median_sorted(sorted: &[f64]) -> Option<f64> {
    quantile(sorted, 0.5, QuantileMethod::Linear)
}

/// Median of arbitrary data, NaN ignored
pub fn median(data: &[f64]) -> Option<f64> {
    median_sorted(&sorted_without_nan(data))
}

/// Median absolute deviation from `center`
pub fn median_abs_deviation(data: &[f64], center: f64) -> Option<f64> {
    let deviations: Vec<f64> = data.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

/// Mean and central moments m2, m3, m4 (population, divided by n)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub n: usize,
    pub mean: f64,
    pub m2: f64,
    pub m3: f64,
    pub m4: f64,
}

impl Moments {
    /// Two-pass moment computation; `None` for an empty slice
    pub fn from_slice(data: &[f64]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        let n = data.len();
        let n_f = n as f64;
        let mean = data.iter().sum::<f64>() / n_f;

        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for &v in data {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }

        Some(Self {
            n,
            mean,
            m2: m2 / n_f,
            m3: m3 / n_f,
            m4: m4 / n_f,
        })
    }

    /// Sample variance (ddof = 1), `0.0` for a single value
    pub fn sample_variance(&self) -> f64 {
        if self.n < 2 {
            0.0
        } else {
            self.m2 * self.n as f64 / (self.n - 1) as f64
        }
    }

    /// Population standard deviation (ddof = 0)
    pub fn population_std(&self) -> f64 {
        self.m2.sqrt()
    }

    /// Biased skewness `m3 / m2^1.5`, `0.0` when the data has no spread
    pub fn skewness(&self) -> f64 {
        if self.m2 <= 0.0 {
            0.0
        } else {
            self.m3 / self.m2.powf(1.5)
        }
    }

    /// Biased Fisher (excess) kurtosis `m4 / m2^2 - 3`, `0.0` when the data has no spread
    pub fn excess_kurtosis(&self) -> f64 {
        if self.m2 <= 0.0 {
            0.0
        } else {
            self.m4 / (self.m2 * self.m2) - 3.0
        }
    }
}

/// Most frequent value of an ascending slice and its count
///
/// Ties resolve to the smallest value.
pub fn mode_sorted(sorted: &[f64]) -> Option<(f64, usize)> {
    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == value {
            j += 1;
        }
        let run = j - i;
        if best.map_or(true, |(_, count)| run > count) {
            best = Some((value, run));
        }
        i = j;
    }
    best
}
