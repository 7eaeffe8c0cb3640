// 3rd party imports
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

// internal imports
use super::summary::mean_and_deviation;

/// Two-sided p-value of the pooled variance two sample t-test.
/// Returns NaN if any value is not finite or there are too few values.
///
/// # Arguments
/// * `first` - Values of the first group
/// * `second` - Values of the second group
///
pub fn t_test(first: &[f64], second: &[f64]) -> f64 {
    if !all_finite(&[first, second]) {
        return f64::NAN;
    }
    let (n1, n2) = (first.len() as f64, second.len() as f64);
    let freedom = n1 + n2 - 2.0;
    if first.is_empty() || second.is_empty() || freedom < 1.0 {
        return f64::NAN;
    }
    let (mean1, deviation1) = mean_and_deviation(first);
    let (mean2, deviation2) = mean_and_deviation(second);
    let squares = |deviation: f64, n: f64| {
        if n < 2.0 {
            0.0
        } else {
            deviation.powi(2) * (n - 1.0)
        }
    };
    let pooled_variance = (squares(deviation1, n1) + squares(deviation2, n2)) / freedom;
    let standard_error = (pooled_variance * (1.0 / n1 + 1.0 / n2)).sqrt();
    if standard_error == 0.0 {
        return if mean1 == mean2 { f64::NAN } else { 0.0 };
    }
    let statistic = (mean1 - mean2) / standard_error;
    match StudentsT::new(0.0, 1.0, freedom) {
        Ok(distribution) => 2.0 * distribution.sf(statistic.abs()),
        Err(_) => f64::NAN,
    }
}

/// p-value of the one-way ANOVA F-test.
/// Returns NaN if any value is not finite or there are too few values.
///
/// # Arguments
/// * `groups` - Values of each group
///
pub fn anova(groups: &[&[f64]]) -> f64 {
    if groups.len() < 2 || !all_finite(groups) || groups.iter().any(|group| group.is_empty()) {
        return f64::NAN;
    }
    let total: usize = groups.iter().map(|group| group.len()).sum();
    let between_freedom = (groups.len() - 1) as f64;
    let within_freedom = total as f64 - groups.len() as f64;
    if within_freedom < 1.0 {
        return f64::NAN;
    }
    let grand_mean = groups.iter().flat_map(|group| group.iter()).sum::<f64>() / total as f64;
    let mut between = 0.0;
    let mut within = 0.0;
    for group in groups {
        let mean = group.iter().sum::<f64>() / group.len() as f64;
        between += group.len() as f64 * (mean - grand_mean).powi(2);
        within += group.iter().map(|value| (value - mean).powi(2)).sum::<f64>();
    }
    if within == 0.0 {
        return if between > 0.0 { 0.0 } else { f64::NAN };
    }
    let statistic = (between / between_freedom) / (within / within_freedom);
    match FisherSnedecor::new(between_freedom, within_freedom) {
        Ok(distribution) => distribution.sf(statistic),
        Err(_) => f64::NAN,
    }
}

fn all_finite(groups: &[&[f64]]) -> bool {
    groups
        .iter()
        .all(|group| group.iter().all(|value| value.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_test() {
        // matches scipy.stats.ttest_ind([1, 2, 3], [4, 5, 6])
        let p = t_test(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert!((p - 0.021311641128756727).abs() < 1e-6);
        assert!(t_test(&[1.0], &[2.0]).is_nan());
        assert!(t_test(&[1.0, f64::NAN], &[2.0, 3.0]).is_nan());
        assert!(t_test(&[1.0, f64::NEG_INFINITY], &[2.0, 3.0]).is_nan());
        assert_eq!(t_test(&[1.0, 1.0], &[2.0, 2.0]), 0.0);
        assert!(t_test(&[1.0, 1.0], &[1.0, 1.0]).is_nan());
    }

    #[test]
    fn test_anova() {
        // matches scipy.stats.f_oneway([1, 2, 3], [4, 5, 6], [7, 8, 9])
        let p = anova(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[7.0, 8.0, 9.0]]);
        assert!((p - 0.001).abs() < 1e-8);
        assert!(anova(&[&[1.0], &[2.0]]).is_nan());
        let two_groups = anova(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        assert!((two_groups - t_test(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0])).abs() < 1e-8);
    }
}
