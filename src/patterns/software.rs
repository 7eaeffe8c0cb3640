// std imports
use std::str::FromStr;

// 3rd party imports
use tracing::{info, warn};

// internal imports
use super::pattern::Pattern;
use super::pattern_map::{Labeling, PatternMap};
use super::proteome_discoverer::ProteomeDiscovererResolver;
use super::quantification::coerce_quantification_columns;
use super::spectronaut::SpectronautResolver;
use crate::errors::{annotation_error::AnnotationError, format_error::FormatError};
use crate::table::peptide_table::PeptideTable;

/// Column identifying MaxQuant output, which is recognized but not supported
///
const MAXQUANT_ACCESSION_COL: &str = "Leading razor protein";

/// Resolves the column names and patterns for one input dialect
///
pub trait DialectResolver {
    /// Resolves the patterns. Drops leading rows without accession
    /// and converts the quantification columns in place.
    ///
    /// # Arguments
    /// * `table` - Peptide table
    /// * `fillna` - Optional value for missing quantification values
    ///
    fn resolve_patterns(
        table: &mut PeptideTable,
        fillna: Option<f64>,
    ) -> Result<PatternMap, AnnotationError>;
}

/// Supported upstream software
///
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Software {
    ProteomeDiscoverer,
    Spectronaut,
}

impl Software {
    /// Short code of the software as used in the configuration
    ///
    pub fn code(&self) -> &'static str {
        match self {
            Self::ProteomeDiscoverer => "pd",
            Self::Spectronaut => "sm",
        }
    }

    /// Name of the software
    ///
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProteomeDiscoverer => "Proteome Discoverer",
            Self::Spectronaut => "Spectronaut",
        }
    }

    /// Detects the software by the accession column of the table
    ///
    /// # Arguments
    /// * `table` - Peptide table
    ///
    pub fn infer(table: &PeptideTable) -> Result<Self, FormatError> {
        let software = if table.has_column(ProteomeDiscovererResolver::ACCESSION_COL) {
            Self::ProteomeDiscoverer
        } else if table.has_column(SpectronautResolver::ACCESSION_COL) {
            Self::Spectronaut
        } else if table.has_column(MAXQUANT_ACCESSION_COL) {
            return Err(FormatError::UnsupportedDialect("MaxQuant"));
        } else {
            return Err(FormatError::UnknownDialect);
        };
        info!("Input was inferred to be from {}", software.name());
        Ok(software)
    }

    /// Resolves the patterns with the resolver of the software
    ///
    /// # Arguments
    /// * `table` - Peptide table
    /// * `fillna` - Optional value for missing quantification values
    ///
    pub fn resolve_patterns(
        &self,
        table: &mut PeptideTable,
        fillna: Option<f64>,
    ) -> Result<PatternMap, AnnotationError> {
        let patterns = match self {
            Self::ProteomeDiscoverer => ProteomeDiscovererResolver::resolve_patterns(table, fillna)?,
            Self::Spectronaut => SpectronautResolver::resolve_patterns(table, fillna)?,
        };
        patterns.log();
        Ok(patterns)
    }
}

/// Software as selected by the user
///
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SoftwareSelection {
    Infer,
    Known(Software),
}

impl SoftwareSelection {
    /// Returns the selected software or infers it from the table
    ///
    /// # Arguments
    /// * `table` - Peptide table
    ///
    pub fn software(&self, table: &PeptideTable) -> Result<Software, FormatError> {
        match self {
            Self::Infer => Software::infer(table),
            Self::Known(software) => Ok(*software),
        }
    }
}

impl FromStr for SoftwareSelection {
    type Err = FormatError;

    fn from_str(software: &str) -> Result<Self, Self::Err> {
        match software {
            "infer" => Ok(Self::Infer),
            "pd" => Ok(Self::Known(Software::ProteomeDiscoverer)),
            "sm" => Ok(Self::Known(Software::Spectronaut)),
            _ => Err(FormatError::UnsupportedSoftware(software.to_string())),
        }
    }
}

/// Builds the pattern map of the table for the given software selection
///
/// # Arguments
/// * `table` - Peptide table, leading rows without accession are dropped
/// * `software` - `infer`, `pd` or `sm`
/// * `fillna` - Optional value for missing quantification values
///
pub fn resolve(
    table: &mut PeptideTable,
    software: &str,
    fillna: Option<f64>,
) -> Result<PatternMap, AnnotationError> {
    let software = SoftwareSelection::from_str(software)?.software(table)?;
    software.resolve_patterns(table, fillna)
}

/// Checks that the columns exist
///
/// # Arguments
/// * `table` - Peptide table
/// * `software` - Software for the error message
/// * `columns` - Required columns
///
pub(crate) fn require_columns(
    table: &PeptideTable,
    software: Software,
    columns: &[&str],
) -> Result<(), FormatError> {
    for column in columns {
        if !table.has_column(column) {
            return Err(FormatError::MissingColumn(software.code(), column.to_string()));
        }
    }
    Ok(())
}

/// Drops rows from the head of the table until the first row has an accession
///
/// # Arguments
/// * `table` - Peptide table
/// * `accession_col` - Accession column
///
pub(crate) fn drop_head_without_accession(
    table: &mut PeptideTable,
    accession_col: &str,
) -> Result<(), AnnotationError> {
    if table.height() == 0 {
        return Ok(());
    }
    let leading_empty = table
        .str_values(accession_col)?
        .iter()
        .take_while(|accession| {
            accession
                .as_ref()
                .map(|accession| accession.trim().is_empty())
                .unwrap_or(true)
        })
        .count();
    if leading_empty == table.height() {
        return Err(FormatError::NoAccessionRows.into());
    }
    if leading_empty > 0 {
        warn!(
            "First {} rows have no accession, dropping them. Make sure the input format is correct.",
            leading_empty
        );
        table.drop_head(leading_empty);
    }
    Ok(())
}

/// Selects the first quantification pattern matching at least one column
/// and converts the matching columns to floats
///
/// # Arguments
/// * `table` - Peptide table
/// * `priority` - Candidate patterns, first match wins
/// * `fillna` - Optional value for missing quantification values
///
pub(crate) fn resolve_quantification(
    table: &mut PeptideTable,
    priority: &[&str],
    fillna: Option<f64>,
) -> Result<Option<Pattern>, AnnotationError> {
    for candidate in priority {
        let pattern = Pattern::new(candidate)?;
        let columns = table.columns_matching(pattern.regex());
        if !columns.is_empty() {
            coerce_quantification_columns(table, &columns, fillna)?;
            return Ok(Some(pattern));
        }
    }
    warn!("No quantification columns detected, statistics will not be available.");
    Ok(None)
}

/// Counts the rows whose value in the column matches the pattern
///
/// # Arguments
/// * `table` - Peptide table
/// * `column` - Column to search
/// * `pattern` - Pattern
///
pub(crate) fn count_matching_rows(
    table: &PeptideTable,
    column: &str,
    pattern: &str,
) -> Result<usize, AnnotationError> {
    let pattern = Pattern::new(pattern)?;
    Ok(table
        .str_values(column)?
        .iter()
        .flatten()
        .filter(|value| pattern.is_match(value))
        .count())
}

/// Label patterns selected by the labeling probe
///
pub(crate) struct LabelPatterns {
    pub labeling: Labeling,
    pub label: Option<Pattern>,
    pub nterm: Option<Pattern>,
    pub nterm_label: Option<Pattern>,
    pub lysine_label: Option<Pattern>,
}

impl LabelPatterns {
    /// Patterns for data without any detected label
    ///
    pub fn unlabeled() -> Self {
        warn!(
            "No labeled peptides detected. Label dependent steps (level `quant`, labeled N-termini) are not available."
        );
        Self {
            labeling: Labeling::Unlabeled,
            label: None,
            nterm: None,
            nterm_label: None,
            lysine_label: None,
        }
    }

    /// Compiles the given patterns
    ///
    /// # Arguments
    /// * `labeling` - Detected labeling chemistry
    /// * `label` - Pattern for any label
    /// * `nterm` - Pattern for N-terminal modifications
    /// * `nterm_label` - Pattern for labeled N-termini
    /// * `lysine_label` - Pattern for labeled lysines
    ///
    pub fn new(
        labeling: Labeling,
        label: &str,
        nterm: &str,
        nterm_label: &str,
        lysine_label: &str,
    ) -> Result<Self, FormatError> {
        Ok(Self {
            labeling,
            label: Some(Pattern::new(label)?),
            nterm: Some(Pattern::new(nterm)?),
            nterm_label: Some(Pattern::new(nterm_label)?),
            lysine_label: Some(Pattern::new(lysine_label)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pd_table() -> PeptideTable {
        PeptideTable::from_string_columns(vec![
            ("Master Protein Accessions", vec![None, Some("P12345"), Some("Q67890")]),
            ("Sequence", vec![Some("PEPTIDE"), Some("PEPTIDEK"), Some("MAGIC")]),
            (
                "Modifications",
                vec![None, Some("1xTMTpro [N-Term]; 1xTMTpro [K8]"), Some("")],
            ),
            ("Abundance: F1: 126", vec![Some("1,5"), Some("2"), Some("3")]),
            ("Abundances (Normalized): F1: 126", vec![Some("1"), Some("2"), Some("3")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_infer() {
        assert_eq!(Software::infer(&pd_table()).unwrap(), Software::ProteomeDiscoverer);
        let sm = PeptideTable::from_string_columns(vec![("PG.ProteinAccessions", vec![Some("P1")])])
            .unwrap();
        assert_eq!(Software::infer(&sm).unwrap(), Software::Spectronaut);
        let mq = PeptideTable::from_string_columns(vec![("Leading razor protein", vec![Some("P1")])])
            .unwrap();
        assert!(matches!(
            Software::infer(&mq),
            Err(FormatError::UnsupportedDialect("MaxQuant"))
        ));
        let unknown = PeptideTable::from_string_columns(vec![("Protein", vec![Some("P1")])]).unwrap();
        assert!(matches!(Software::infer(&unknown), Err(FormatError::UnknownDialect)));
    }

    #[test]
    fn test_unsupported_software() {
        let mut table = pd_table();
        assert!(matches!(
            resolve(&mut table, "maxquant", None),
            Err(AnnotationError::FormatError(FormatError::UnsupportedSoftware(_)))
        ));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let mut first_table = pd_table();
        let mut second_table = pd_table();
        let first = resolve(&mut first_table, "infer", None).unwrap();
        let second = resolve(&mut second_table, "pd", None).unwrap();
        assert_eq!(first, second);
        // leading row without accession is dropped
        assert_eq!(first_table.height(), 2);
        assert_eq!(
            first.quantification.as_ref().map(|pattern| pattern.as_str()),
            Some(r"Abundances \(?Normalized\):.*")
        );
        assert_eq!(first.labeling, Labeling::Tmt);
    }

    #[test]
    fn test_no_accession_rows() {
        let mut table = PeptideTable::from_string_columns(vec![
            ("Master Protein Accessions", vec![None, Some(" ")]),
            ("Sequence", vec![Some("PEPTIDE"), Some("PEPTIDE")]),
            ("Modifications", vec![None, None]),
        ])
        .unwrap();
        assert!(matches!(
            resolve(&mut table, "pd", None),
            Err(AnnotationError::FormatError(FormatError::NoAccessionRows))
        ));
    }
}
