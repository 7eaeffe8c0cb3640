// internal imports
use super::pattern::Pattern;
use super::pattern_map::{Labeling, PatternMap};
use super::software::{
    count_matching_rows, drop_head_without_accession, require_columns, resolve_quantification,
    DialectResolver, LabelPatterns, Software,
};
use crate::constants::INVALID_AMINO_ACID_PATTERN;
use crate::errors::{annotation_error::AnnotationError, format_error::FormatError};
use crate::table::peptide_table::PeptideTable;

/// Resolver for Spectronaut peptide reports
///
pub struct SpectronautResolver;

impl SpectronautResolver {
    pub const ACCESSION_COL: &'static str = "PG.ProteinAccessions";
    pub const SEQUENCE_COL: &'static str = "PEP.StrippedSequence";
    const MODIFICATION_PRIORITY: [&'static str; 2] = ["P.MoleculeID", "EG.PrecursorId"];
    const QUANTIFICATION_PRIORITY: [&'static str; 2] = [r"PEP\.TMT", r"EG\.TotalQuantity"];
}

impl DialectResolver for SpectronautResolver {
    fn resolve_patterns(
        table: &mut PeptideTable,
        fillna: Option<f64>,
    ) -> Result<PatternMap, AnnotationError> {
        let software = Software::Spectronaut;
        require_columns(table, software, &[Self::ACCESSION_COL, Self::SEQUENCE_COL])?;
        let modification = Self::MODIFICATION_PRIORITY
            .iter()
            .find(|column| table.has_column(column))
            .ok_or_else(|| {
                FormatError::MissingModificationColumn(
                    software.code(),
                    Self::MODIFICATION_PRIORITY.join(", "),
                )
            })?
            .to_string();

        drop_head_without_accession(table, Self::ACCESSION_COL)?;
        let quantification = resolve_quantification(table, &Self::QUANTIFICATION_PRIORITY, fillna)?;

        let labels = if count_matching_rows(table, &modification, r"\[TMT")? > 0 {
            LabelPatterns::new(
                Labeling::Tmt,
                r"\[TMT",
                "N-?ter",
                "TMT.*_Nter",
                r"K\[TMT.{0,3}_Lys\]",
            )?
        } else if count_matching_rows(table, &modification, "Dimeth")? > 0 {
            LabelPatterns::new(
                Labeling::Dimethyl,
                "Dimeth",
                "DimethNter0",
                r"\[DimethNter0\]",
                r"K\[DimethLys0\]",
            )?
        } else {
            LabelPatterns::unlabeled()
        };

        Ok(PatternMap {
            software,
            accession: Self::ACCESSION_COL.to_string(),
            sequence: Self::SEQUENCE_COL.to_string(),
            sequence_is_annotated: false,
            modification,
            invalid_alphabet: Pattern::new(INVALID_AMINO_ACID_PATTERN)?,
            quantification,
            labeling: labels.labeling,
            label: labels.label,
            nterm: labels.nterm,
            nterm_label: labels.nterm_label,
            lysine_label: labels.lysine_label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmt_with_precursor_id() {
        let mut table = PeptideTable::from_string_columns(vec![
            ("PG.ProteinAccessions", vec![Some("P12345"), Some("Q67890")]),
            ("PEP.StrippedSequence", vec![Some("PEPTIDEK"), Some("MAGIC")]),
            (
                "EG.PrecursorId",
                vec![Some("_[TMTpro_Nter]PEPTIDEK[TMTpro_Lys]_.2"), Some("_MAGIC_.2")],
            ),
            ("PEP.TMTpro_126", vec![Some("100,5"), Some("200")]),
        ])
        .unwrap();
        let patterns = SpectronautResolver::resolve_patterns(&mut table, None).unwrap();
        assert_eq!(patterns.modification, "EG.PrecursorId");
        assert_eq!(patterns.labeling, Labeling::Tmt);
        assert!(patterns
            .lysine_label
            .unwrap()
            .is_match("_[TMTpro_Nter]PEPTIDEK[TMTpro_Lys]_.2"));
        assert_eq!(
            table.f64_values("PEP.TMTpro_126").unwrap(),
            vec![Some(100.5), Some(200.0)]
        );
    }

    #[test]
    fn test_missing_modification_column() {
        let mut table = PeptideTable::from_string_columns(vec![
            ("PG.ProteinAccessions", vec![Some("P12345")]),
            ("PEP.StrippedSequence", vec![Some("PEPTIDE")]),
        ])
        .unwrap();
        assert!(matches!(
            SpectronautResolver::resolve_patterns(&mut table, None),
            Err(AnnotationError::FormatError(
                FormatError::MissingModificationColumn("sm", _)
            ))
        ));
    }
}
