/// Row-wise mean, standard deviation and coefficient of variation of the replicate values
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSummary {
    pub mean: Vec<f64>,
    pub deviation: Vec<f64>,
    pub cv: Vec<f64>,
}

/// Summarizes replicate columns row by row. Missing values are skipped,
/// the standard deviation uses `n - 1` degrees of freedom.
///
/// # Arguments
/// * `replicates` - One column per replicate, all of the same height
/// * `height` - Number of rows
///
pub fn summarize(replicates: &[Vec<f64>], height: usize) -> ConditionSummary {
    let mut summary = ConditionSummary {
        mean: Vec::with_capacity(height),
        deviation: Vec::with_capacity(height),
        cv: Vec::with_capacity(height),
    };
    for row in 0..height {
        let values: Vec<f64> = replicates
            .iter()
            .map(|replicate| replicate[row])
            .filter(|value| !value.is_nan())
            .collect();
        let (mean, deviation) = mean_and_deviation(&values);
        summary.mean.push(mean);
        summary.deviation.push(deviation);
        summary.cv.push(deviation / mean);
    }
    summary
}

/// Mean and sample standard deviation, NaN if not enough values
///
/// # Arguments
/// * `values` - Values without missing ones
///
pub fn mean_and_deviation(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, f64::NAN);
    }
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}

/// Fold change and log2 fold change of the row means.
/// Divisions by zero and logarithms of non-positive values are not treated specially.
///
/// # Arguments
/// * `numerator` - Means of the numerator condition
/// * `denominator` - Means of the denominator condition
///
pub fn fold_change(numerator: &[f64], denominator: &[f64]) -> (Vec<f64>, Vec<f64>) {
    numerator
        .iter()
        .zip(denominator)
        .map(|(numerator, denominator)| {
            let fold = numerator / denominator;
            (fold, fold.log2())
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_skips_missing() {
        let replicates = vec![vec![1.0, 2.0, f64::NAN], vec![3.0, f64::NAN, f64::NAN]];
        let summary = summarize(&replicates, 3);
        assert_eq!(summary.mean[0], 2.0);
        assert!((summary.deviation[0] - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((summary.cv[0] - 2.0_f64.sqrt() / 2.0).abs() < 1e-12);
        assert_eq!(summary.mean[1], 2.0);
        assert!(summary.deviation[1].is_nan());
        assert!(summary.mean[2].is_nan());
    }

    #[test]
    fn test_fold_change_of_condition_against_itself() {
        let means = vec![1.5, 20.0, 1e-3];
        let (fold, log_fold) = fold_change(&means, &means);
        for (fold, log_fold) in fold.iter().zip(log_fold) {
            assert!((fold - 1.0).abs() < 1e-12);
            assert!(log_fold.abs() < 1e-12);
        }
    }

    #[test]
    fn test_fold_change_edge_cases_propagate() {
        let (fold, log_fold) = fold_change(&[1.0, 0.0, -2.0], &[0.0, 0.0, 1.0]);
        assert!(fold[0].is_infinite());
        assert!(fold[1].is_nan());
        assert!(log_fold[2].is_nan());
    }
}
