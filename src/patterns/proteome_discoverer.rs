// internal imports
use super::pattern::Pattern;
use super::pattern_map::{Labeling, PatternMap};
use super::software::{
    count_matching_rows, drop_head_without_accession, require_columns, resolve_quantification,
    DialectResolver, LabelPatterns, Software,
};
use crate::constants::{INVALID_AMINO_ACID_PATTERN, INVALID_ANNOTATED_AMINO_ACID_PATTERN};
use crate::errors::{annotation_error::AnnotationError, format_error::FormatError};
use crate::table::peptide_table::PeptideTable;

/// Resolver for Proteome Discoverer peptide groups
///
pub struct ProteomeDiscovererResolver;

impl ProteomeDiscovererResolver {
    pub const ACCESSION_COL: &'static str = "Master Protein Accessions";
    pub const SEQUENCE_COL: &'static str = "Sequence";
    pub const ANNOTATED_SEQUENCE_COL: &'static str = "Annotated Sequence";
    pub const MODIFICATION_COL: &'static str = "Modifications";
    const NTERM_PATTERN: &'static str = r"\[N-Term\]";
    const QUANTIFICATION_PRIORITY: [&'static str; 5] = [
        r"Abundances \(?Scaled\):.*",
        r"Abundances \(?Normalized\):.*",
        r"Abundances \(Grouped\):.*",
        r"Abundance: .*",
        r"Abundance.*",
    ];
}

impl DialectResolver for ProteomeDiscovererResolver {
    fn resolve_patterns(
        table: &mut PeptideTable,
        fillna: Option<f64>,
    ) -> Result<PatternMap, AnnotationError> {
        let software = Software::ProteomeDiscoverer;
        require_columns(table, software, &[Self::ACCESSION_COL, Self::MODIFICATION_COL])?;
        let (sequence, sequence_is_annotated, invalid_alphabet) =
            if table.has_column(Self::SEQUENCE_COL) {
                (Self::SEQUENCE_COL, false, INVALID_AMINO_ACID_PATTERN)
            } else if table.has_column(Self::ANNOTATED_SEQUENCE_COL) {
                (
                    Self::ANNOTATED_SEQUENCE_COL,
                    true,
                    INVALID_ANNOTATED_AMINO_ACID_PATTERN,
                )
            } else {
                return Err(FormatError::MissingColumn(
                    software.code(),
                    Self::SEQUENCE_COL.to_string(),
                )
                .into());
            };

        drop_head_without_accession(table, Self::ACCESSION_COL)?;
        let quantification = resolve_quantification(table, &Self::QUANTIFICATION_PRIORITY, fillna)?;

        let labels = if count_matching_rows(table, Self::MODIFICATION_COL, "TMT")? > 0 {
            LabelPatterns::new(
                Labeling::Tmt,
                "TMT",
                Self::NTERM_PATTERN,
                r"TMT.* \[N-Term\]",
                r"TMT.{0,5} \[K",
            )?
        } else if count_matching_rows(table, Self::MODIFICATION_COL, "Dimethyl")? > 0 {
            LabelPatterns::new(
                Labeling::Dimethyl,
                "Dimethyl",
                Self::NTERM_PATTERN,
                r"Dimethyl \[N-Term\]",
                r"Dimethyl \[K",
            )?
        } else {
            LabelPatterns {
                nterm: Some(Pattern::new(Self::NTERM_PATTERN)?),
                ..LabelPatterns::unlabeled()
            }
        };

        Ok(PatternMap {
            software,
            accession: Self::ACCESSION_COL.to_string(),
            sequence: sequence.to_string(),
            sequence_is_annotated,
            modification: Self::MODIFICATION_COL.to_string(),
            invalid_alphabet: Pattern::new(invalid_alphabet)?,
            quantification,
            labeling: labels.labeling,
            label: labels.label,
            nterm: labels.nterm,
            nterm_label: labels.nterm_label,
            lysine_label: labels.lysine_label,
        })
    }
}
