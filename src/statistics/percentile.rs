// std imports
use std::str::FromStr;

// internal imports
use crate::constants::FOLD_CHANGE_HISTOGRAM_BINS;
use crate::errors::format_error::FormatError;

/// Rows used to build the fold change distribution
///
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SignificanceMode {
    /// One distribution of all rows
    All,
    /// One distribution of the internal cleavages and one of the other rows
    Nterm,
}

impl FromStr for SignificanceMode {
    type Err = FormatError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "all" => Ok(Self::All),
            "nterm" => Ok(Self::Nterm),
            _ => Err(FormatError::UnsupportedSignificance(mode.to_string())),
        }
    }
}

/// Classification of a fold change
///
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Significance {
    High,
    Low,
}

impl Significance {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "significant high",
            Self::Low => "significant low",
        }
    }
}

/// Cumulative distribution estimated from a histogram of the values,
/// linear within each bin
///
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramDistribution {
    edges: Vec<f64>,
    cumulative: Vec<f64>,
}

impl HistogramDistribution {
    /// Builds the distribution of the finite values. Returns `None` if there are none.
    /// If all values are equal, the range is widened by 0.5 on each side.
    ///
    /// # Arguments
    /// * `values` - Values, non-finite ones are ignored
    ///
    pub fn new(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|value| value.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        let (mut min, mut max) = finite
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
                (min.min(*value), max.max(*value))
            });
        if min == max {
            min -= 0.5;
            max += 0.5;
        }
        let bins = FOLD_CHANGE_HISTOGRAM_BINS;
        let width = (max - min) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|idx| {
                if idx == bins {
                    max
                } else {
                    min + idx as f64 * width
                }
            })
            .collect();

        let mut counts = vec![0_usize; bins];
        for value in &finite {
            // last bin is closed on the right
            let bin = match edges[1..].iter().position(|edge| value < edge) {
                Some(bin) => bin,
                None => bins - 1,
            };
            counts[bin] += 1;
        }
        let total = finite.len() as f64;
        let mut cumulative = Vec::with_capacity(bins + 1);
        let mut running = 0;
        cumulative.push(0.0);
        for count in counts {
            running += count;
            cumulative.push(running as f64 / total);
        }
        Some(Self { edges, cumulative })
    }

    /// Cumulative probability of the value
    ///
    /// # Arguments
    /// * `value` - Value
    ///
    pub fn cdf(&self, value: f64) -> f64 {
        if value.is_nan() {
            return f64::NAN;
        }
        let last = self.edges.len() - 1;
        if value <= self.edges[0] {
            return 0.0;
        }
        if value >= self.edges[last] {
            return 1.0;
        }
        let bin = self.edges[1..]
            .iter()
            .position(|edge| value < *edge)
            .unwrap_or(last - 1);
        let (left, right) = (self.edges[bin], self.edges[bin + 1]);
        let (lower, upper) = (self.cumulative[bin], self.cumulative[bin + 1]);
        lower + (value - left) / (right - left) * (upper - lower)
    }
}

/// Classifies a cumulative probability: high if it is at least `1 - percentile`,
/// low if it is below `percentile`
///
/// # Arguments
/// * `cdf` - Cumulative probability
/// * `percentile` - Percentile
///
pub fn classify(cdf: f64, percentile: f64) -> Option<Significance> {
    if cdf.is_nan() {
        None
    } else if cdf >= 1.0 - percentile {
        Some(Significance::High)
    } else if cdf < percentile {
        Some(Significance::Low)
    } else {
        None
    }
}

/// Classifies each value against the distribution of the group it belongs to.
/// Groups without any finite value stay unclassified.
///
/// # Arguments
/// * `values` - Fold changes
/// * `groups` - Group of each row, e.g. internal vs. other
/// * `percentile` - Percentile
///
pub fn classify_groups(
    values: &[f64],
    groups: &[usize],
    percentile: f64,
) -> (Vec<Option<Significance>>, Vec<usize>) {
    let mut classes = vec![None; values.len()];
    let mut empty_groups = Vec::new();
    let mut group_ids: Vec<usize> = groups.to_vec();
    group_ids.sort_unstable();
    group_ids.dedup();
    for group in group_ids {
        let members: Vec<usize> = (0..values.len()).filter(|row| groups[*row] == group).collect();
        let member_values: Vec<f64> = members.iter().map(|row| values[*row]).collect();
        match HistogramDistribution::new(&member_values) {
            Some(distribution) => {
                for row in members {
                    classes[row] = classify(distribution.cdf(values[row]), percentile);
                }
            }
            None => empty_groups.push(group),
        }
    }
    (classes, empty_groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distribution() -> HistogramDistribution {
        // 19 values in the first bin, one in the last, range 0..10 gives integer edges
        let mut values: Vec<f64> = (0..19).map(|idx| idx as f64 * 0.05).collect();
        values.push(10.0);
        HistogramDistribution::new(&values).unwrap()
    }

    #[test]
    fn test_cdf() {
        let distribution = distribution();
        assert_eq!(distribution.cdf(-1.0), 0.0);
        assert_eq!(distribution.cdf(0.5), 0.475);
        assert_eq!(distribution.cdf(9.0), 0.95);
        assert_eq!(distribution.cdf(10.0), 1.0);
        assert!(distribution.cdf(f64::NAN).is_nan());
    }

    #[test]
    fn test_classification_boundary() {
        let distribution = distribution();
        assert_eq!(
            classify(distribution.cdf(9.0), 0.05),
            Some(Significance::High)
        );
        assert_eq!(classify(0.95, 0.05), Some(Significance::High));
        assert_eq!(classify(0.94999, 0.05), None);
        assert_eq!(classify(distribution.cdf(0.99999), 0.05), None);
        assert_eq!(classify(0.0499, 0.05), Some(Significance::Low));
        assert_eq!(classify(0.05, 0.05), None);
    }

    #[test]
    fn test_equal_values_and_empty_groups() {
        let distribution = HistogramDistribution::new(&[2.0, 2.0, f64::INFINITY]).unwrap();
        assert_eq!(distribution.cdf(1.6), 0.0);
        assert_eq!(distribution.cdf(2.4), 1.0);
        assert!(HistogramDistribution::new(&[f64::NAN, f64::NEG_INFINITY]).is_none());

        let (classes, empty) = classify_groups(&[1.0, f64::NAN, 100.0], &[0, 1, 0], 0.05);
        assert_eq!(empty, vec![1]);
        assert_eq!(classes, vec![Some(Significance::Low), None, Some(Significance::High)]);
    }
}
