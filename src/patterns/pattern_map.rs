// 3rd party imports
use tracing::info;

// internal imports
use super::pattern::Pattern;
use super::software::Software;

/// Labeling chemistry of the N-termini and lysines
///
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Labeling {
    /// Isobaric tandem mass tags
    Tmt,
    /// Chemical dimethylation
    Dimethyl,
    /// No labeled peptides were found
    Unlabeled,
}

/// Immutable mapping from the logical roles of the input to concrete columns and patterns.
/// Built once per input table.
///
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMap {
    /// Software which created the input
    pub software: Software,
    /// Accession column
    pub accession: String,
    /// Sequence column
    pub sequence: String,
    /// True if the sequence column contains flanking residues, e.g. `[K].PEPTIDE.[R]`
    pub sequence_is_annotated: bool,
    /// Modification column
    pub modification: String,
    /// Pattern for sequences with residues outside of the standard amino acids
    pub invalid_alphabet: Pattern,
    /// Pattern selecting the quantification columns by name
    pub quantification: Option<Pattern>,
    /// Detected labeling chemistry
    pub labeling: Labeling,
    /// Pattern for any label in the modification column
    pub label: Option<Pattern>,
    /// Pattern for N-terminal modifications
    pub nterm: Option<Pattern>,
    /// Pattern for labeled N-termini
    pub nterm_label: Option<Pattern>,
    /// Pattern for labeled lysines
    pub lysine_label: Option<Pattern>,
}

impl PatternMap {
    /// Logs the detected patterns
    ///
    pub fn log(&self) {
        info!("The column name patterns which were detected are:");
        info!("- acc: {}", self.accession);
        info!("- seq: {}", self.sequence);
        info!("- mod: {}", self.modification);
        info!("- amino: {}", self.invalid_alphabet);
        info!("- quant: {}", Self::shown(self.quantification.as_ref()));
        info!("- label: {}", Self::shown(self.label.as_ref()));
        info!("- nterm: {}", Self::shown(self.nterm.as_ref()));
        info!("- nterm_label: {}", Self::shown(self.nterm_label.as_ref()));
        info!("- lysine_label: {}", Self::shown(self.lysine_label.as_ref()));
    }

    fn shown(pattern: Option<&Pattern>) -> String {
        match pattern {
            Some(pattern) => pattern.to_string(),
            None => "None".to_string(),
        }
    }
}
