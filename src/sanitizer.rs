// std imports
use std::str::FromStr;

// 3rd party imports
use tracing::{info, warn};

// internal imports
use crate::errors::{
    annotation_error::AnnotationError, format_error::FormatError, table_error::TableError,
};
use crate::patterns::pattern_map::PatternMap;
use crate::table::peptide_table::PeptideTable;

/// Peptide level to annotate
///
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Level {
    /// Every peptide
    All,
    /// Peptides with a modified N-terminus
    Nterm,
    /// Peptides with a labeled N-terminus
    Quant,
}

impl Level {
    pub fn code(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Nterm => "nterm",
            Self::Quant => "quant",
        }
    }
}

impl FromStr for Level {
    type Err = FormatError;

    fn from_str(level: &str) -> Result<Self, Self::Err> {
        match level {
            "all" => Ok(Self::All),
            "nterm" => Ok(Self::Nterm),
            "quant" => Ok(Self::Quant),
            _ => Err(FormatError::UnsupportedLevel(level.to_string())),
        }
    }
}

/// Keeps only the peptides whose modification matches the pattern of the level
///
/// # Arguments
/// * `table` - Peptide table
/// * `patterns` - Resolved patterns
/// * `level` - Peptide level
///
pub fn filter_level(
    table: &mut PeptideTable,
    patterns: &PatternMap,
    level: Level,
) -> Result<(), AnnotationError> {
    let (pattern, role) = match level {
        Level::All => return Ok(()),
        Level::Nterm => (patterns.nterm.as_ref(), "nterm"),
        Level::Quant => (patterns.nterm_label.as_ref(), "nterm_label"),
    };
    let pattern = pattern
        .ok_or_else(|| FormatError::MissingLevelPattern(level.code().to_string(), role))?;
    let mask: Vec<bool> = table
        .str_values(&patterns.modification)?
        .iter()
        .map(|modification| {
            modification
                .as_ref()
                .map(|modification| pattern.is_match(modification))
                .unwrap_or(false)
        })
        .collect();
    table.retain(&mask)?;
    info!(
        "Selected {} peptides on level `{}`",
        table.height(),
        level.code()
    );
    Ok(())
}

/// Drops peptides without any quantification value
///
/// # Arguments
/// * `table` - Peptide table
/// * `patterns` - Resolved patterns
///
pub fn drop_missing_quantification(
    table: &mut PeptideTable,
    patterns: &PatternMap,
) -> Result<(), TableError> {
    let columns = match patterns.quantification.as_ref() {
        Some(pattern) => table.columns_matching(pattern.regex()),
        None => Vec::new(),
    };
    if columns.is_empty() {
        warn!("No quantification columns, skipping removal of peptides without quantification");
        return Ok(());
    }
    let mut mask = vec![false; table.height()];
    for column in columns {
        for (keep, value) in mask.iter_mut().zip(table.f64_values(&column)?) {
            *keep |= value.map(|value| !value.is_nan()).unwrap_or(false);
        }
    }
    retain_logged(table, &mask, "without quantification")
}

/// Removes the peptides which can not be annotated, in the order:
/// empty accession, empty sequence, sequence with invalid residues.
/// The table is re-indexed after each step.
///
/// # Arguments
/// * `table` - Peptide table
/// * `patterns` - Resolved patterns
///
pub fn sanitize(table: &mut PeptideTable, patterns: &PatternMap) -> Result<(), TableError> {
    let mask = non_empty_mask(table, &patterns.accession)?;
    retain_logged(table, &mask, "with empty accession")?;

    let mask = non_empty_mask(table, &patterns.sequence)?;
    retain_logged(table, &mask, "with empty sequence")?;

    let mask: Vec<bool> = table
        .str_values(&patterns.sequence)?
        .iter()
        .map(|sequence| {
            sequence
                .as_ref()
                .map(|sequence| !patterns.invalid_alphabet.is_match(&sequence.to_uppercase()))
                .unwrap_or(false)
        })
        .collect();
    retain_logged(table, &mask, "with invalid amino acids")
}

fn non_empty_mask(table: &PeptideTable, column: &str) -> Result<Vec<bool>, TableError> {
    Ok(table
        .str_values(column)?
        .iter()
        .map(|value| {
            value
                .as_ref()
                .map(|value| !value.trim().is_empty())
                .unwrap_or(false)
        })
        .collect())
}

fn retain_logged(table: &mut PeptideTable, mask: &[bool], reason: &str) -> Result<(), TableError> {
    let dropped = mask.iter().filter(|keep| !**keep).count();
    if dropped > 0 {
        info!("Removing {} peptides {}", dropped, reason);
        table.retain(mask)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::software::resolve;

    fn peptides() -> (PeptideTable, PatternMap) {
        let mut table = PeptideTable::from_string_columns(vec![
            (
                "Master Protein Accessions",
                vec![Some("P1"), Some(""), Some("P3"), Some("P4"), Some("P5")],
            ),
            (
                "Sequence",
                vec![Some("PEPTIDE"), Some("PEPTIDE"), None, Some("PEPXIDE"), Some("MAGIC")],
            ),
            (
                "Modifications",
                vec![
                    Some("1xTMTpro [N-Term]"),
                    None,
                    None,
                    Some("1xTMTpro [N-Term]"),
                    Some("1xAcetyl [N-Term]"),
                ],
            ),
            (
                "Abundance: F1",
                vec![Some("1"), Some("2"), Some("3"), Some("4"), None],
            ),
        ])
        .unwrap();
        let patterns = resolve(&mut table, "pd", None).unwrap();
        (table, patterns)
    }

    #[test]
    fn test_sanitize() {
        let (mut table, patterns) = peptides();
        sanitize(&mut table, &patterns).unwrap();
        assert_eq!(
            table.str_values("Master Protein Accessions").unwrap(),
            vec![Some("P1".to_string()), Some("P5".to_string())]
        );
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let (mut table, patterns) = peptides();
        sanitize(&mut table, &patterns).unwrap();
        let once = table.clone();
        sanitize(&mut table, &patterns).unwrap();
        assert!(table.data_frame().equals_missing(once.data_frame()));
    }

    #[test]
    fn test_filter_level() {
        let (mut table, patterns) = peptides();
        filter_level(&mut table, &patterns, Level::Quant).unwrap();
        assert_eq!(table.height(), 2);
        let (mut table, patterns) = peptides();
        filter_level(&mut table, &patterns, Level::Nterm).unwrap();
        assert_eq!(table.height(), 3);
    }

    #[test]
    fn test_quant_level_without_label() {
        let mut table = PeptideTable::from_string_columns(vec![
            ("Master Protein Accessions", vec![Some("P1")]),
            ("Sequence", vec![Some("PEPTIDE")]),
            ("Modifications", vec![None]),
        ])
        .unwrap();
        let patterns = resolve(&mut table, "pd", None).unwrap();
        assert!(matches!(
            filter_level(&mut table, &patterns, Level::Quant),
            Err(AnnotationError::FormatError(FormatError::MissingLevelPattern(_, "nterm_label")))
        ));
    }

    #[test]
    fn test_drop_missing_quantification() {
        let (mut table, patterns) = peptides();
        drop_missing_quantification(&mut table, &patterns).unwrap();
        assert_eq!(table.height(), 4);
    }
}
