//! Descriptive statistics over `f64` samples.
//!
//! Results that have no value for the given sample (the mean of nothing, the
//! spread of a single value) are [`Stat::Undefined`] rather than NaN.

use serde::Serialize;
use std::fmt;

/// A statistic that may be undefined for the sample it was computed on.
///
/// Serializes as a plain number, or `null` when undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Stat {
    Value(f64),
    Undefined,
}

impl Stat {
    pub fn value(self) -> Option<f64> {
        match self {
            Stat::Value(v) => Some(v),
            Stat::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Stat::Value(_))
    }

    /// The value, or 0.0 when undefined.
    pub fn or_zero(self) -> f64 {
        self.value().unwrap_or(0.0)
    }
}

impl From<Option<f64>> for Stat {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Stat::Undefined, Stat::Value)
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Value(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
            Stat::Undefined => f.write_str("n/a"),
        }
    }
}

/// `part` as a percentage of `total`; 0.0 when `total` is zero.
pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

pub fn mean(values: &[f64]) -> Stat {
    if values.is_empty() {
        return Stat::Undefined;
    }
    Stat::Value(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of `values`; the average of the two middle values for even counts.
pub fn median(values: &[f64]) -> Stat {
    if values.is_empty() {
        return Stat::Undefined;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Stat::Value((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Stat::Value(sorted[mid])
    }
}

/// Sample standard deviation (n - 1 denominator). Undefined below two values.
pub fn sample_stddev(values: &[f64]) -> Stat {
    let Stat::Value(mean) = mean(values) else {
        return Stat::Undefined;
    };
    if values.len() < 2 {
        return Stat::Undefined;
    }

    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    Stat::Value(variance.sqrt())
}

pub fn min(values: &[f64]) -> Stat {
    values.iter().copied().reduce(f64::min).into()
}

pub fn max(values: &[f64]) -> Stat {
    values.iter().copied().reduce(f64::max).into()
}

/// Count, centre and spread of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: Stat,
    pub median: Stat,
    pub stddev: Stat,
    pub min: Stat,
    pub max: Stat,
}

impl Describe {
    pub fn of(values: &[f64]) -> Self {
        Self {
            count: values.len(),
            mean: mean(values),
            median: median(values),
            stddev: sample_stddev(values),
            min: min(values),
            max: max(values),
        }
    }
}
