// 3rd party imports
use polars::prelude::*;
use tracing::{debug, info, warn};

// internal imports
use super::correction::CorrectionMethod;
use super::hypothesis::{anova, t_test};
use super::percentile::{classify_groups, SignificanceMode};
use super::summary::{fold_change, summarize, ConditionSummary};
use crate::conditions::{comparison_label, Condition, ConditionMap};
use crate::constants::{NTERM_ANNOTATION_COL, NTERM_INTERNAL};
use crate::errors::{statistics_error::StatisticsError, table_error::TableError};
use crate::patterns::pattern_map::PatternMap;
use crate::table::{annotation_table::AnnotationTable, peptide_table::PeptideTable};

/// Which statistics to compute
///
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsSettings {
    /// Run the t-test (two conditions) or ANOVA (more conditions)
    pub stat: bool,
    /// Additionally run a t-test for each ordered pair if there are more than two conditions
    pub pairwise: bool,
    /// Percentile classification of the fold changes
    pub significance: Option<SignificanceMode>,
    pub percentile: f64,
    /// Correction for multiple testing
    pub correction: Option<CorrectionMethod>,
    pub alpha: f64,
}

pub fn mean_column(condition: &str) -> String {
    format!("{condition}_mean")
}

pub fn deviation_column(condition: &str) -> String {
    format!("{condition}_deviation")
}

pub fn cv_column(condition: &str) -> String {
    format!("{condition}_CV")
}

pub fn fold_change_column(numerator: &str, denominator: &str) -> String {
    format!("Fold change: {}", comparison_label(&[numerator, denominator]))
}

pub fn log2_fold_change_column(numerator: &str, denominator: &str) -> String {
    format!("Log2 fold change: {}", comparison_label(&[numerator, denominator]))
}

pub fn significance_column(numerator: &str, denominator: &str) -> String {
    format!("Fold {} significance", comparison_label(&[numerator, denominator]))
}

pub fn t_test_column(names: &[&str]) -> String {
    format!("Independent T-test p-value: {}", comparison_label(names))
}

pub fn anova_column(names: &[&str]) -> String {
    format!("ANOVA p-value: {}", comparison_label(names))
}

pub fn log10_column(column: &str) -> String {
    format!("-Log10 {column}")
}

pub fn corrected_column(column: &str) -> String {
    format!("Corrected {column}")
}

/// Float column where NaN is written as missing value
///
fn float_column(name: &str, values: &[f64]) -> Column {
    let values: Vec<Option<f64>> = values
        .iter()
        .map(|value| if value.is_nan() { None } else { Some(*value) })
        .collect();
    Column::new(name.into(), values)
}

fn nan_filled(values: Vec<Option<f64>>) -> Vec<f64> {
    values
        .into_iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .collect()
}

fn negative_log10(values: &[f64]) -> Vec<f64> {
    values.iter().map(|value| -value.log10()).collect()
}

/// Computes the statistics of the conditions and appends them to the annotation table
///
pub struct StatisticsEngine<'a> {
    peptides: &'a PeptideTable,
    conditions: &'a ConditionMap,
    quantification_columns: Vec<String>,
}

impl<'a> StatisticsEngine<'a> {
    /// Creates a new engine
    ///
    /// # Arguments
    /// * `peptides` - Sanitized peptide table with float quantification columns
    /// * `patterns` - Resolved patterns
    /// * `conditions` - Conditions of the experiment
    ///
    pub fn new(peptides: &'a PeptideTable, patterns: &PatternMap, conditions: &'a ConditionMap) -> Self {
        let quantification_columns = match patterns.quantification.as_ref() {
            Some(pattern) => peptides.columns_matching(pattern.regex()),
            None => Vec::new(),
        };
        Self {
            peptides,
            conditions,
            quantification_columns,
        }
    }

    /// Runs all requested statistics
    ///
    /// # Arguments
    /// * `annotation` - Annotation table, row aligned with the peptides
    /// * `settings` - Requested statistics
    ///
    pub fn run(
        &self,
        annotation: &mut AnnotationTable,
        settings: &StatisticsSettings,
    ) -> Result<(), StatisticsError> {
        info!(
            "Comparing conditions: {}",
            self.conditions.combination_labels().join(", ")
        );
        self.summarize(annotation)?;
        if let Some(mode) = settings.significance {
            self.classify_fold_changes(annotation, mode, settings.percentile)?;
        }
        if !settings.stat {
            return Ok(());
        }
        let p_value_columns = self.test_conditions(annotation, settings.pairwise)?;
        if let Some(method) = settings.correction {
            Self::correct_p_values(annotation, &p_value_columns, method)?;
        }
        Self::report_significant(annotation, &p_value_columns, settings.alpha)?;
        Ok(())
    }

    /// Replicate values of the condition, one vector per column, missing values are NaN
    ///
    fn replicate_values(&self, condition: &Condition) -> Result<Vec<Vec<f64>>, TableError> {
        let columns = condition.matching_columns(&self.quantification_columns);
        if columns.is_empty() {
            warn!(
                "No quantification columns found for condition `{}`",
                condition.name()
            );
        }
        debug!("Columns of condition `{}`: {:?}", condition.name(), columns);
        columns
            .into_iter()
            .map(|column| -> Result<Vec<f64>, TableError> {
                Ok(nan_filled(self.peptides.f64_values(column)?))
            })
            .collect()
    }

    /// Appends mean, deviation and CV of each condition and the (log2) fold change of each ordered condition pair
    ///
    /// # Arguments
    /// * `annotation` - Annotation table
    ///
    pub fn summarize(&self, annotation: &mut AnnotationTable) -> Result<(), StatisticsError> {
        let height = annotation.height();
        let mut summaries: Vec<ConditionSummary> = Vec::with_capacity(self.conditions.len());
        for condition in self.conditions.conditions() {
            let summary = summarize(&self.replicate_values(condition)?, height);
            annotation.append(float_column(&mean_column(condition.name()), &summary.mean))?;
            annotation.append(float_column(
                &deviation_column(condition.name()),
                &summary.deviation,
            ))?;
            annotation.append(float_column(&cv_column(condition.name()), &summary.cv))?;
            summaries.push(summary);
        }

        for (numerator, denominator) in self.conditions.permutations() {
            let mean_of = |condition: &Condition| -> Result<Vec<f64>, TableError> {
                Ok(nan_filled(annotation.f64_values(&mean_column(condition.name()))?))
            };
            let (fold, log_fold) = fold_change(&mean_of(numerator)?, &mean_of(denominator)?);
            annotation.append(float_column(
                &fold_change_column(numerator.name(), denominator.name()),
                &fold,
            ))?;
            annotation.append(float_column(
                &log2_fold_change_column(numerator.name(), denominator.name()),
                &log_fold,
            ))?;
        }
        info!("Calculated condition summaries and fold changes");
        Ok(())
    }

    /// Classifies the fold changes by the percentile of their distribution
    ///
    /// # Arguments
    /// * `annotation` - Annotation table with fold changes
    /// * `mode` - Rows used for the distribution
    /// * `percentile` - Percentile
    ///
    pub fn classify_fold_changes(
        &self,
        annotation: &mut AnnotationTable,
        mode: SignificanceMode,
        percentile: f64,
    ) -> Result<(), StatisticsError> {
        let groups: Vec<usize> = match mode {
            SignificanceMode::All => vec![0; annotation.height()],
            SignificanceMode::Nterm => annotation
                .str_values(NTERM_ANNOTATION_COL)?
                .iter()
                .map(|annotation| match annotation.as_deref() {
                    Some(NTERM_INTERNAL) => 0,
                    _ => 1,
                })
                .collect(),
        };
        for (numerator, denominator) in self.conditions.permutations() {
            let fold_column = fold_change_column(numerator.name(), denominator.name());
            let values = nan_filled(annotation.f64_values(&fold_column)?);
            let (classes, empty_groups) = classify_groups(&values, &groups, percentile);
            if !empty_groups.is_empty() {
                warn!(
                    "No finite fold changes in `{}` to build a distribution from, rows stay unclassified",
                    fold_column
                );
            }
            let labels: Vec<Option<&str>> = classes
                .iter()
                .map(|class| class.map(|class| class.label()))
                .collect();
            annotation.append(Column::new(
                significance_column(numerator.name(), denominator.name()).into(),
                labels,
            ))?;
        }
        info!("Classified fold changes by percentile {}", percentile);
        Ok(())
    }

    /// Runs the t-test (two conditions) or ANOVA (more conditions) on the log2 replicate values
    /// and appends p-value and -log10 p-value. Returns the names of the p-value columns.
    ///
    /// # Arguments
    /// * `annotation` - Annotation table
    /// * `pairwise` - Additionally run a t-test for each ordered pair if there are more than two conditions
    ///
    pub fn test_conditions(
        &self,
        annotation: &mut AnnotationTable,
        pairwise: bool,
    ) -> Result<Vec<String>, StatisticsError> {
        if self.conditions.len() < 2 {
            warn!("Condition statistics were requested, but less than 2 conditions were supplied. Please recheck the conditions.");
            return Ok(Vec::new());
        }
        let height = annotation.height();
        let log2_values: Vec<Vec<Vec<f64>>> = self
            .conditions
            .conditions()
            .iter()
            .map(|condition| -> Result<Vec<Vec<f64>>, TableError> {
                Ok(self
                    .replicate_values(condition)?
                    .into_iter()
                    .map(|replicate| replicate.into_iter().map(f64::log2).collect())
                    .collect())
            })
            .collect::<Result<_, TableError>>()?;
        let row_values = |condition: usize, row: usize| -> Vec<f64> {
            log2_values[condition]
                .iter()
                .map(|replicate| replicate[row])
                .collect()
        };

        let mut p_value_columns = Vec::new();
        let names = self.conditions.names();
        let (column, p_values) = if names.len() == 2 {
            let p_values = (0..height)
                .map(|row| t_test(&row_values(0, row), &row_values(1, row)))
                .collect::<Vec<f64>>();
            (t_test_column(&names), p_values)
        } else {
            let p_values = (0..height)
                .map(|row| {
                    let groups: Vec<Vec<f64>> =
                        (0..names.len()).map(|condition| row_values(condition, row)).collect();
                    let groups: Vec<&[f64]> = groups.iter().map(|group| group.as_slice()).collect();
                    anova(&groups)
                })
                .collect::<Vec<f64>>();
            (anova_column(&names), p_values)
        };
        Self::append_p_values(annotation, &column, &p_values)?;
        p_value_columns.push(column);

        if pairwise && names.len() > 2 {
            let position = |name: &str| names.iter().position(|other| *other == name).unwrap_or(0);
            for (first, second) in self.conditions.permutations() {
                let (first_idx, second_idx) = (position(first.name()), position(second.name()));
                let p_values = (0..height)
                    .map(|row| t_test(&row_values(first_idx, row), &row_values(second_idx, row)))
                    .collect::<Vec<f64>>();
                let column = t_test_column(&[first.name(), second.name()]);
                Self::append_p_values(annotation, &column, &p_values)?;
                p_value_columns.push(column);
            }
        }
        info!("Finished condition statistics");
        Ok(p_value_columns)
    }

    fn append_p_values(
        annotation: &mut AnnotationTable,
        column: &str,
        p_values: &[f64],
    ) -> Result<(), TableError> {
        annotation.append(float_column(column, p_values))?;
        annotation.append(float_column(&log10_column(column), &negative_log10(p_values)))
    }

    /// Corrects each p-value column for multiple testing. The corrected p-value and its -log10
    /// are inserted directly after the -log10 column of the raw p-value.
    /// Missing p-values are excluded from the correction.
    ///
    /// # Arguments
    /// * `annotation` - Annotation table
    /// * `columns` - p-value columns
    /// * `method` - Correction method
    ///
    pub fn correct_p_values(
        annotation: &mut AnnotationTable,
        columns: &[String],
        method: CorrectionMethod,
    ) -> Result<(), StatisticsError> {
        for column in columns {
            let p_values = nan_filled(annotation.f64_values(column)?);
            let present: Vec<usize> = (0..p_values.len())
                .filter(|row| !p_values[*row].is_nan())
                .collect();
            let corrected_name = corrected_column(column);
            if present.is_empty() {
                warn!("No p-values to correct for `{}`", corrected_name);
                continue;
            }
            let raw: Vec<f64> = present.iter().map(|row| p_values[*row]).collect();
            let mut corrected = vec![f64::NAN; p_values.len()];
            for (row, value) in present.into_iter().zip(method.correct(&raw)) {
                corrected[row] = value;
            }
            annotation.insert_after(&log10_column(column), float_column(&corrected_name, &corrected))?;
            annotation.insert_after(
                &corrected_name,
                float_column(&log10_column(&corrected_name), &negative_log10(&corrected)),
            )?;
            debug!("Corrected `{}` using {}", column, method.code());
        }
        info!(
            "Finished multiple testing correction using the {} method",
            method.code()
        );
        Ok(())
    }

    /// Logs the number of significant rows of each test, using the corrected p-values if available
    ///
    /// # Arguments
    /// * `annotation` - Annotation table
    /// * `columns` - p-value columns
    /// * `alpha` - Significance threshold
    ///
    pub fn report_significant(
        annotation: &AnnotationTable,
        columns: &[String],
        alpha: f64,
    ) -> Result<(), StatisticsError> {
        for column in columns {
            let corrected = corrected_column(column);
            let reported = if annotation.has_column(&corrected) {
                corrected
            } else {
                column.clone()
            };
            let significant = annotation
                .f64_values(&reported)?
                .into_iter()
                .flatten()
                .filter(|p_value| *p_value <= alpha)
                .count();
            info!(
                "{} rows with `{}` <= {}",
                significant, reported, alpha
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::software::resolve;
    use std::str::FromStr;

    fn setup(conditions: &str) -> (PeptideTable, PatternMap, ConditionMap, AnnotationTable) {
        let mut peptides = PeptideTable::from_string_columns(vec![
            ("Master Protein Accessions", vec![Some("P1"), Some("P2"), Some("P3"), Some("P4")]),
            ("Sequence", vec![Some("PEPTIDE"); 4]),
            ("Modifications", vec![None; 4]),
            ("Abundance: F1", vec![Some("10"), Some("1"), Some("5"), None]),
            ("Abundance: F2", vec![Some("12"), Some("2"), Some("5"), Some("1")]),
            ("Abundance: F3", vec![Some("40"), Some("1"), Some("6"), Some("1")]),
            ("Abundance: F4", vec![Some("44"), Some("2"), Some("4"), Some("1")]),
            ("Abundance: F5", vec![Some("1"), Some("1"), Some("5"), Some("1")]),
            ("Abundance: F6", vec![Some("2"), Some("2"), Some("5"), Some("1")]),
        ])
        .unwrap();
        let patterns = resolve(&mut peptides, "pd", None).unwrap();
        let conditions = ConditionMap::from_str(conditions).unwrap();
        let annotation = AnnotationTable::new(4, &[NTERM_ANNOTATION_COL.to_string()]).unwrap();
        (peptides, patterns, conditions, annotation)
    }

    fn settings() -> StatisticsSettings {
        StatisticsSettings {
            stat: true,
            pairwise: false,
            significance: None,
            percentile: 0.05,
            correction: Some(CorrectionMethod::FdrBh),
            alpha: 0.05,
        }
    }

    #[test]
    fn test_two_conditions() {
        let (peptides, patterns, conditions, mut annotation) = setup("A F1 F2\nB F3 F4\n");
        let engine = StatisticsEngine::new(&peptides, &patterns, &conditions);
        engine.run(&mut annotation, &settings()).unwrap();
        let p_column = t_test_column(&["A", "B"]);
        assert_eq!(
            annotation.column_names(),
            vec![
                NTERM_ANNOTATION_COL.to_string(),
                "A_mean".to_string(),
                "A_deviation".to_string(),
                "A_CV".to_string(),
                "B_mean".to_string(),
                "B_deviation".to_string(),
                "B_CV".to_string(),
                "Fold change: A vs. B".to_string(),
                "Log2 fold change: A vs. B".to_string(),
                "Fold change: B vs. A".to_string(),
                "Log2 fold change: B vs. A".to_string(),
                p_column.clone(),
                log10_column(&p_column),
                corrected_column(&p_column),
                log10_column(&corrected_column(&p_column)),
            ]
        );
        let fold = annotation.f64_values("Fold change: A vs. B").unwrap();
        assert!((fold[0].unwrap() - 11.0 / 42.0).abs() < 1e-12);
        let p_values = annotation.f64_values(&p_column).unwrap();
        assert!(p_values[0].unwrap() < 0.05);
        // missing replicate gives no p-value
        assert_eq!(p_values[3], None);
        let corrected = annotation.f64_values(&corrected_column(&p_column)).unwrap();
        for (raw, corrected) in p_values.iter().zip(corrected) {
            match (raw, corrected) {
                (Some(raw), Some(corrected)) => assert!(corrected >= *raw),
                (None, None) => (),
                _ => panic!("corrected p-value without raw p-value"),
            }
        }
    }

    #[test]
    fn test_anova_and_pairwise() {
        let (peptides, patterns, conditions, mut annotation) = setup("A F1 F2\nB F3 F4\nC F5 F6\n");
        let engine = StatisticsEngine::new(&peptides, &patterns, &conditions);
        let columns = engine.test_conditions(&mut annotation, true).unwrap();
        assert_eq!(columns.len(), 7);
        assert_eq!(columns[0], "ANOVA p-value: A vs. B vs. C");
        assert_eq!(columns[1], "Independent T-test p-value: A vs. B");
        assert!(annotation.has_column("-Log10 Independent T-test p-value: C vs. B"));
    }

    #[test]
    fn test_correction_without_p_values() {
        let mut annotation = AnnotationTable::new(2, &[]).unwrap();
        annotation.append(float_column("p", &[f64::NAN, f64::NAN])).unwrap();
        annotation.append(float_column("-Log10 p", &[f64::NAN, f64::NAN])).unwrap();
        StatisticsEngine::correct_p_values(&mut annotation, &["p".to_string()], CorrectionMethod::Holm)
            .unwrap();
        assert_eq!(annotation.column_names(), vec!["p", "-Log10 p"]);
    }

    #[test]
    fn test_single_condition_skips_tests() {
        let (peptides, patterns, conditions, mut annotation) = setup("A F1 F2\n");
        let engine = StatisticsEngine::new(&peptides, &patterns, &conditions);
        engine.run(&mut annotation, &settings()).unwrap();
        assert!(annotation.has_column("A_mean"));
        assert!(!annotation.column_names().iter().any(|name| name.contains("p-value")));
    }

    #[test]
    fn test_percentile_classification() {
        let (peptides, patterns, conditions, mut annotation) = setup("A F1 F2\nB F5 F6\n");
        let engine = StatisticsEngine::new(&peptides, &patterns, &conditions);
        engine.summarize(&mut annotation).unwrap();
        engine
            .classify_fold_changes(&mut annotation, SignificanceMode::All, 0.05)
            .unwrap();
        let classes = annotation.str_values("Fold A vs. B significance").unwrap();
        // fold changes 22/3, 1, 1, 1
        assert_eq!(classes[0].as_deref(), Some("significant high"));
        assert_eq!(classes[1].as_deref(), Some("significant low"));
        assert_eq!(classes[2].as_deref(), Some("significant low"));
    }
}
