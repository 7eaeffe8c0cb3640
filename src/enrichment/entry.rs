// 3rd party imports
use fancy_regex::Regex;
use lazy_static::lazy_static;
use tracing::debug;

// internal imports
use super::merops::MeropsDatabase;
use super::protein_record::ProteinRecord;
use super::warnings::{Warning, WarningCategory};
use crate::constants::{NTERM_INTERNAL, RECORD_NOT_FOUND_NAME, VALUE_SEPARATOR, WINDOW_PADDING};
use crate::functions::is_match;
use crate::patterns::pattern_map::PatternMap;

lazy_static! {
    /// Acetylated N-terminus in Proteome Discoverer and Spectronaut notation
    ///
    static ref ACETYL_NTERM_REGEX: Regex =
        Regex::new(r"Acetyl.{0,5} \[N-Term\]|Acetyl \(Protein N-term\)|\[Acetyl.{0,10}N-?ter").unwrap();
}

/// Prefix of the description of UniProt `Site` features marking a cleavage
///
const CLEAVAGE_SITE_PREFIX: &str = "Cleavage; by ";

/// Features whose C-terminal end marks a processed N-terminus, with the annotation to write
///
const PROCESSING_FEATURES: [(&str, &str); 3] = [
    ("Signal", "Signal peptide"),
    ("Propeptide", "Propeptide"),
    ("Transit peptide", "Transit peptide"),
];

/// Annotation of one peptide. Empty fields are written as missing values.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryAnnotation {
    pub query_sequence: Option<String>,
    pub query_accession: Option<String>,
    pub name: Option<String>,
    pub full_sequence: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub go_codes: Option<String>,
    pub go_names: Option<String>,
    pub accession_length: Option<i64>,
    pub start_pep: Option<i64>,
    pub end_pep: Option<i64>,
    pub p1_position: Option<i64>,
    pub cleavage_site: Option<String>,
    pub cleavage_window: Option<String>,
    pub nterm_annotation: Option<String>,
    pub nterm_modification: Option<String>,
    pub protease_uniprot: Option<String>,
    pub protease_merops_code: Option<String>,
    pub protease_merops_name: Option<String>,
}

impl EntryAnnotation {
    /// Annotation of a peptide whose record could not be retrieved
    ///
    pub fn not_found() -> Self {
        Self {
            name: Some(RECORD_NOT_FOUND_NAME.to_string()),
            ..Default::default()
        }
    }
}

/// Position of the peptide in the protein
///
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct PeptidePosition {
    /// 0-based index of the first peptide residue
    offset: usize,
    /// 1-based position of the P1 residue, 0 if the peptide starts the protein
    p1: usize,
}

/// Peptide with the protein record it was matched to
///
pub struct Entry<'a> {
    accession: &'a str,
    sequence: &'a str,
    record: &'a ProteinRecord,
}

impl<'a> Entry<'a> {
    /// Creates a new entry
    ///
    /// # Arguments
    /// * `accession` - Parsed accession
    /// * `sequence` - Plain upper case peptide sequence
    /// * `record` - Protein record of the accession
    ///
    pub fn new(accession: &'a str, sequence: &'a str, record: &'a ProteinRecord) -> Self {
        Self {
            accession,
            sequence,
            record,
        }
    }

    /// Derives the complete annotation of the peptide
    ///
    /// # Arguments
    /// * `modification` - Modification cell of the peptide
    /// * `patterns` - Resolved patterns
    /// * `window_size` - Residues on each side of the cleavage site
    /// * `merops` - MEROPS database, `None` to skip the MEROPS attribution
    ///
    pub fn annotate(
        &self,
        modification: Option<&str>,
        patterns: &PatternMap,
        window_size: usize,
        merops: Option<&MeropsDatabase>,
    ) -> (EntryAnnotation, Vec<Warning>) {
        let mut warnings = Vec::new();
        let mut annotation = self.general();
        annotation.nterm_modification = Some(Self::nterm_modification(modification, patterns));

        let position = match self.position() {
            Some(position) => position,
            None => {
                debug!("Peptide {} not found in {}", self.sequence, self.accession);
                warnings.push(Warning::new(
                    WarningCategory::PeptidesNotFound,
                    format!("{} not found in {}", self.sequence, self.accession),
                ));
                return (annotation, warnings);
            }
        };
        annotation.start_pep = Some(position.offset as i64 + 1);
        annotation.end_pep = Some((position.offset + self.sequence.len()) as i64);
        annotation.p1_position = Some(position.p1 as i64);
        annotation.cleavage_window = Some(self.cleavage_window(position, window_size));
        annotation.nterm_annotation = Some(self.nterm_annotation(position).to_string());
        annotation.cleavage_site = self.cleavage_site(position);

        if annotation.cleavage_site.is_some() {
            if let Some(merops) = merops {
                let proteases = merops.proteases(self.accession, position.p1);
                if !proteases.is_empty() {
                    annotation.protease_merops_code = Some(
                        proteases
                            .iter()
                            .map(|protease| protease.code.as_str())
                            .collect::<Vec<&str>>()
                            .join(VALUE_SEPARATOR),
                    );
                    annotation.protease_merops_name = Some(
                        proteases
                            .iter()
                            .map(|protease| protease.name.as_deref().unwrap_or(protease.code.as_str()))
                            .collect::<Vec<&str>>()
                            .join(VALUE_SEPARATOR),
                    );
                }
            }
            annotation.protease_uniprot = self.protease_uniprot(position);
        }
        (annotation, warnings)
    }

    fn protein_sequence(&self) -> &str {
        self.record.sequence().unwrap_or_default()
    }

    fn general(&self) -> EntryAnnotation {
        let join = |values: Vec<&str>| {
            if values.is_empty() {
                None
            } else {
                Some(values.join(VALUE_SEPARATOR))
            }
        };
        let go_terms = self.record.go_terms();
        EntryAnnotation {
            query_sequence: Some(self.sequence.to_string()),
            query_accession: Some(self.accession.to_string()),
            name: self.record.name().map(|name| name.to_string()),
            full_sequence: self.record.sequence().map(|sequence| sequence.to_string()),
            description: join(self.record.function_texts()),
            keywords: join(self.record.keyword_names()),
            go_codes: join(go_terms.iter().map(|(code, _)| *code).collect()),
            go_names: join(go_terms.iter().map(|(_, name)| *name).collect()),
            accession_length: self.record.sequence().map(|sequence| sequence.len() as i64),
            ..Default::default()
        }
    }

    /// First occurrence of the peptide in the protein
    ///
    fn position(&self) -> Option<PeptidePosition> {
        if self.sequence.is_empty() {
            return None;
        }
        let offset = self.protein_sequence().find(self.sequence)?;
        Some(PeptidePosition { offset, p1: offset })
    }

    fn residue(&self, idx: usize) -> Option<char> {
        self.protein_sequence().as_bytes().get(idx).map(|residue| *residue as char)
    }

    /// Cleavage site, e.g. `K10-A11`. `None` if the peptide starts the protein.
    ///
    fn cleavage_site(&self, position: PeptidePosition) -> Option<String> {
        if position.p1 == 0 {
            return None;
        }
        let p1 = self.residue(position.p1 - 1)?;
        let p1_prime = self.residue(position.offset)?;
        Some(format!("{}{}-{}{}", p1, position.p1, p1_prime, position.p1 + 1))
    }

    /// Residues P_n..P_1 and P_1'..P_n', padded at the protein termini
    ///
    fn cleavage_window(&self, position: PeptidePosition, window_size: usize) -> String {
        let offset = position.offset as i64;
        (offset - window_size as i64..offset + window_size as i64)
            .map(|idx| {
                if idx < 0 {
                    WINDOW_PADDING
                } else {
                    self.residue(idx as usize).unwrap_or(WINDOW_PADDING)
                }
            })
            .collect()
    }

    fn nterm_annotation(&self, position: PeptidePosition) -> &'static str {
        if position.p1 == 0 {
            return "Protein N-term";
        }
        if position.p1 == 1 && self.residue(0) == Some('M') {
            return "Met removed";
        }
        for (feature_type, annotation) in PROCESSING_FEATURES {
            if self
                .record
                .features_of_type(feature_type)
                .any(|feature| feature.end() == Some(position.p1))
            {
                return annotation;
            }
        }
        NTERM_INTERNAL
    }

    fn nterm_modification(modification: Option<&str>, patterns: &PatternMap) -> String {
        let modification = modification.unwrap_or_default();
        let labeled = patterns
            .nterm_label
            .as_ref()
            .map(|pattern| pattern.is_match(modification))
            .unwrap_or(false);
        if labeled {
            "Labeled".to_string()
        } else if is_match(&ACETYL_NTERM_REGEX, modification) {
            "Acetylated".to_string()
        } else {
            "Free".to_string()
        }
    }

    /// Proteases of UniProt `Site` features cleaving after P1
    ///
    fn protease_uniprot(&self, position: PeptidePosition) -> Option<String> {
        let proteases: Vec<&str> = self
            .record
            .features_of_type("Site")
            .filter(|feature| feature.start() == Some(position.p1))
            .filter_map(|feature| feature.description.strip_prefix(CLEAVAGE_SITE_PREFIX))
            .collect();
        if proteases.is_empty() {
            None
        } else {
            Some(proteases.join(VALUE_SEPARATOR))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::software::resolve;
    use crate::table::peptide_table::PeptideTable;

    fn patterns() -> PatternMap {
        let mut table = PeptideTable::from_string_columns(vec![
            ("Master Protein Accessions", vec![Some("P12345")]),
            ("Sequence", vec![Some("PEPTIDE")]),
            ("Modifications", vec![Some("1xTMTpro [N-Term]")]),
        ])
        .unwrap();
        resolve(&mut table, "pd", None).unwrap()
    }

    fn record() -> ProteinRecord {
        // 1-based: M1 K2 T3 A4 Y5 I6 A7 K8 Q9 R10 Q11 I12 S13 F14
        ProteinRecord::new("P12345", "Test protein", "MKTAYIAKQRQISF")
            .with_feature("Signal", 1, 4, "")
            .with_feature("Site", 8, 9, "Cleavage; by thrombin")
    }

    #[test]
    fn test_internal_cleavage() {
        let record = record();
        let merops = MeropsDatabase::new(
            vec![("P12345".to_string(), 8, "S01.217".to_string())],
            vec![("S01.217".to_string(), "thrombin".to_string())],
        );
        let (annotation, warnings) = Entry::new("P12345", "QRQIS", &record).annotate(
            Some("1xTMTpro [N-Term]"),
            &patterns(),
            4,
            Some(&merops),
        );
        assert!(warnings.is_empty());
        assert_eq!(annotation.start_pep, Some(9));
        assert_eq!(annotation.end_pep, Some(13));
        assert_eq!(annotation.p1_position, Some(8));
        assert_eq!(annotation.cleavage_site.as_deref(), Some("K8-Q9"));
        assert_eq!(annotation.cleavage_window.as_deref(), Some("YIAKQRQI"));
        assert_eq!(annotation.nterm_annotation.as_deref(), Some("Internal"));
        assert_eq!(annotation.nterm_modification.as_deref(), Some("Labeled"));
        assert_eq!(annotation.protease_uniprot.as_deref(), Some("thrombin"));
        assert_eq!(annotation.protease_merops_code.as_deref(), Some("S01.217"));
        assert_eq!(annotation.protease_merops_name.as_deref(), Some("thrombin"));
        assert_eq!(annotation.accession_length, Some(14));
        assert_eq!(annotation.name.as_deref(), Some("Test protein"));
    }

    #[test]
    fn test_protein_termini() {
        let record = record();
        let patterns = patterns();
        let (annotation, _) =
            Entry::new("P12345", "MKTA", &record).annotate(None, &patterns, 2, None);
        assert_eq!(annotation.nterm_annotation.as_deref(), Some("Protein N-term"));
        assert_eq!(annotation.cleavage_site, None);
        assert_eq!(annotation.cleavage_window.as_deref(), Some("--MK"));
        assert_eq!(annotation.nterm_modification.as_deref(), Some("Free"));

        let (annotation, _) = Entry::new("P12345", "KTAY", &record).annotate(
            Some("1xAcetyl [N-Term]"),
            &patterns,
            2,
            None,
        );
        assert_eq!(annotation.nterm_annotation.as_deref(), Some("Met removed"));
        assert_eq!(annotation.cleavage_site.as_deref(), Some("M1-K2"));
        assert_eq!(annotation.nterm_modification.as_deref(), Some("Acetylated"));

        let (annotation, _) =
            Entry::new("P12345", "YIAK", &record).annotate(None, &patterns, 2, None);
        assert_eq!(annotation.nterm_annotation.as_deref(), Some("Signal peptide"));

        let (annotation, _) =
            Entry::new("P12345", "QISF", &record).annotate(None, &patterns, 3, None);
        assert_eq!(annotation.cleavage_window.as_deref(), Some("KQRQIS"));
    }

    #[test]
    fn test_peptide_not_in_protein() {
        let record = record();
        let (annotation, warnings) =
            Entry::new("P12345", "WWWW", &record).annotate(None, &patterns(), 4, None);
        assert_eq!(annotation.start_pep, None);
        assert_eq!(annotation.cleavage_window, None);
        assert_eq!(annotation.query_sequence.as_deref(), Some("WWWW"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].category, WarningCategory::PeptidesNotFound);
    }
}
