// std imports
use std::str::FromStr;

// internal imports
use crate::errors::statistics_error::StatisticsError;

/// Methods for the correction of p-values for multiple testing
///
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CorrectionMethod {
    Bonferroni,
    Sidak,
    Holm,
    HolmSidak,
    SimesHochberg,
    /// Benjamini-Hochberg
    FdrBh,
    /// Benjamini-Yekutieli
    FdrBy,
}

impl CorrectionMethod {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Bonferroni => "bonferroni",
            Self::Sidak => "sidak",
            Self::Holm => "holm",
            Self::HolmSidak => "holm-sidak",
            Self::SimesHochberg => "simes-hochberg",
            Self::FdrBh => "fdr_bh",
            Self::FdrBy => "fdr_by",
        }
    }

    /// Corrects the p-values. The input must not contain NaN.
    /// Corrected values are clipped to 1 and keep the order of the input.
    ///
    /// # Arguments
    /// * `p_values` - Raw p-values
    ///
    pub fn correct(&self, p_values: &[f64]) -> Vec<f64> {
        let n = p_values.len();
        if n == 0 {
            return Vec::new();
        }
        let count = n as f64;
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|left, right| p_values[*left].total_cmp(&p_values[*right]));
        let sorted: Vec<f64> = order.iter().map(|idx| p_values[*idx]).collect();

        let adjusted_sorted: Vec<f64> = match self {
            Self::Bonferroni => sorted.iter().map(|p| p * count).collect(),
            Self::Sidak => sorted.iter().map(|p| 1.0 - (1.0 - p).powf(count)).collect(),
            Self::Holm => cumulative_max(
                sorted
                    .iter()
                    .enumerate()
                    .map(|(rank, p)| p * (n - rank) as f64)
                    .collect(),
            ),
            Self::HolmSidak => cumulative_max(
                sorted
                    .iter()
                    .enumerate()
                    .map(|(rank, p)| 1.0 - (1.0 - p).powf((n - rank) as f64))
                    .collect(),
            ),
            Self::SimesHochberg => reverse_cumulative_min(
                sorted
                    .iter()
                    .enumerate()
                    .map(|(rank, p)| p * (n - rank) as f64)
                    .collect(),
            ),
            Self::FdrBh => reverse_cumulative_min(
                sorted
                    .iter()
                    .enumerate()
                    .map(|(rank, p)| p * count / (rank + 1) as f64)
                    .collect(),
            ),
            Self::FdrBy => {
                let harmonic: f64 = (1..=n).map(|k| 1.0 / k as f64).sum();
                reverse_cumulative_min(
                    sorted
                        .iter()
                        .enumerate()
                        .map(|(rank, p)| p * count * harmonic / (rank + 1) as f64)
                        .collect(),
                )
            }
        };

        let mut corrected = vec![f64::NAN; n];
        for (rank, idx) in order.into_iter().enumerate() {
            corrected[idx] = adjusted_sorted[rank].min(1.0);
        }
        corrected
    }
}

impl FromStr for CorrectionMethod {
    type Err = StatisticsError;

    fn from_str(method: &str) -> Result<Self, Self::Err> {
        match method {
            "bonferroni" => Ok(Self::Bonferroni),
            "sidak" => Ok(Self::Sidak),
            "holm" => Ok(Self::Holm),
            "holm-sidak" => Ok(Self::HolmSidak),
            "simes-hochberg" => Ok(Self::SimesHochberg),
            "fdr_bh" => Ok(Self::FdrBh),
            "fdr_by" => Ok(Self::FdrBy),
            _ => Err(StatisticsError::UnknownCorrectionMethod(method.to_string())),
        }
    }
}

fn cumulative_max(mut values: Vec<f64>) -> Vec<f64> {
    for idx in 1..values.len() {
        values[idx] = values[idx].max(values[idx - 1]);
    }
    values
}

fn reverse_cumulative_min(mut values: Vec<f64>) -> Vec<f64> {
    for idx in (0..values.len().saturating_sub(1)).rev() {
        values[idx] = values[idx].min(values[idx + 1]);
    }
    values
}
