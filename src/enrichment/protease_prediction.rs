// std imports
use std::collections::{HashMap, HashSet};
use std::fs::read_to_string;
use std::path::Path;

// 3rd party imports
use polars::prelude::*;
use tracing::{debug, info, warn};

// internal imports
use super::merops::MeropsDatabase;
use crate::constants::{
    cleavage_window_column, PREDICTED_PROTEASE_ACTIVITY_COL, VALUE_SEPARATOR, WINDOW_PADDING,
};
use crate::errors::{
    annotation_error::AnnotationError, format_error::FormatError, table_error::TableError,
};
use crate::io::delimited_table::DelimitedTable;
use crate::table::{annotation_table::AnnotationTable, peptide_table::PeptideTable};

/// Standard amino acids, the index is the row of the scoring matrix
///
const AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWY";

const THREE_LETTER_CODES: [(&str, char); 20] = [
    ("Ala", 'A'),
    ("Cys", 'C'),
    ("Asp", 'D'),
    ("Glu", 'E'),
    ("Phe", 'F'),
    ("Gly", 'G'),
    ("His", 'H'),
    ("Ile", 'I'),
    ("Lys", 'K'),
    ("Leu", 'L'),
    ("Met", 'M'),
    ("Asn", 'N'),
    ("Pro", 'P'),
    ("Gln", 'Q'),
    ("Arg", 'R'),
    ("Ser", 'S'),
    ("Thr", 'T'),
    ("Val", 'V'),
    ("Trp", 'W'),
    ("Tyr", 'Y'),
];

/// Extension of the protease file
///
const PROTEASE_FILE_EXTENSION: &str = "txt";

/// Code column of the MEROPS substrate table
///
const SUBSTRATE_CODE_COL: &str = "code";

fn amino_acid_index(residue: char) -> Option<usize> {
    AMINO_ACIDS.find(residue.to_ascii_uppercase())
}

/// Parses a one- or three-letter amino acid code
///
fn parse_residue(value: &str) -> Option<usize> {
    let value = value.trim();
    match value.chars().count() {
        1 => value.chars().next().and_then(amino_acid_index),
        3 => THREE_LETTER_CODES
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(value))
            .and_then(|(_, residue)| amino_acid_index(*residue)),
        _ => None,
    }
}

/// Substrate column of the window position, e.g. `Site_P2` or `Site_P1prime`
///
/// # Arguments
/// * `position` - 0-based position in the window P_n..P_1, P_1'..P_n'
/// * `window_size` - Residues on each side of the cleavage site
///
fn substrate_column(position: usize, window_size: usize) -> String {
    if position < window_size {
        format!("Site_P{}", window_size - position)
    } else {
        format!("Site_P{}prime", position - window_size + 1)
    }
}

/// Checks that the protease file exists and is a text file
///
/// # Arguments
/// * `path` - Path to the protease file
///
pub fn validate_protease_file(path: &Path) -> Result<(), FormatError> {
    if !path.is_file() {
        return Err(FormatError::MissingFile(
            "protease file",
            path.display().to_string(),
        ));
    }
    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_string())
        .unwrap_or_default();
    if extension != PROTEASE_FILE_EXTENSION {
        return Err(FormatError::UnsupportedFileFormat("protease file", extension));
    }
    Ok(())
}

/// Reads the MEROPS codes from the protease file, one per line.
/// Blank lines and repeated codes are skipped.
///
/// # Arguments
/// * `path` - Path to the protease file
///
pub fn read_protease_file(path: &Path) -> Result<Vec<String>, AnnotationError> {
    let content = read_to_string(path)
        .map_err(|err| AnnotationError::FileReadError(path.display().to_string(), err))?;
    let mut seen = HashSet::new();
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|code| !code.is_empty() && seen.insert(code.to_string()))
        .map(|code| code.to_string())
        .collect())
}

/// Position-specific scoring matrix of a protease over the cleavage window.
/// Scores are log2 odds against a uniform background, with a pseudocount of one per amino acid.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringMatrix {
    code: String,
    scores: Vec<[f64; 20]>,
}

impl ScoringMatrix {
    /// Creates the matrix from the substrate windows of a protease
    ///
    /// # Arguments
    /// * `code` - MEROPS code of the protease
    /// * `substrates` - Amino acid index per window position, `None` for unusable residues
    /// * `window_length` - Number of positions
    ///
    pub fn from_substrates(code: &str, substrates: &[Vec<Option<usize>>], window_length: usize) -> Self {
        let background = 1.0 / AMINO_ACIDS.len() as f64;
        let scores = (0..window_length)
            .map(|position| {
                let mut counts = [0_usize; 20];
                for residue in substrates
                    .iter()
                    .filter_map(|substrate| substrate.get(position).copied().flatten())
                {
                    counts[residue] += 1;
                }
                let total: usize = counts.iter().sum();
                let mut position_scores = [0.0; 20];
                for (score, count) in position_scores.iter_mut().zip(counts) {
                    let frequency =
                        (count as f64 + 1.0) / (total as f64 + AMINO_ACIDS.len() as f64);
                    *score = (frequency / background).log2();
                }
                position_scores
            })
            .collect();
        Self {
            code: code.to_string(),
            scores,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Sum of the position scores, residues outside the standard amino acids score 0.
    /// Returns `None` if the window length does not match.
    ///
    /// # Arguments
    /// * `window` - Cleavage window P_n..P_1, P_1'..P_n'
    ///
    pub fn score(&self, window: &str) -> Option<f64> {
        if window.chars().count() != self.scores.len() {
            return None;
        }
        Some(
            window
                .chars()
                .zip(self.scores.iter())
                .map(|(residue, scores)| {
                    amino_acid_index(residue)
                        .map(|index| scores[index])
                        .unwrap_or(0.0)
                })
                .sum(),
        )
    }
}

/// Predicts which of the requested proteases produced a cleavage, by scoring the
/// cleavage window against the substrate preference of each protease
///
pub struct ProteasePredictor {
    window_size: usize,
    matrices: Vec<ScoringMatrix>,
}

impl ProteasePredictor {
    /// Builds one scoring matrix per requested protease
    ///
    /// # Arguments
    /// * `codes` - MEROPS codes of the proteases
    /// * `substrates` - MEROPS substrate table
    /// * `window_size` - Residues on each side of the cleavage site
    /// * `merops` - MEROPS database for the protease names, if loaded
    ///
    pub fn new(
        codes: &[String],
        substrates: &PeptideTable,
        window_size: usize,
        merops: Option<&MeropsDatabase>,
    ) -> Result<Self, AnnotationError> {
        if !substrates.has_column(SUBSTRATE_CODE_COL) {
            return Err(FormatError::MissingColumn(
                "MEROPS substrate",
                SUBSTRATE_CODE_COL.to_string(),
            )
            .into());
        }
        let labeled_codes: Vec<String> = codes
            .iter()
            .map(|code| match merops.and_then(|merops| merops.name(code)) {
                Some(name) => format!("{code} ({name})"),
                None => code.clone(),
            })
            .collect();
        info!("Protease codes: {}", labeled_codes.join(VALUE_SEPARATOR));

        let window_length = 2 * window_size;
        let mut positions: Vec<Option<Vec<Option<String>>>> = Vec::with_capacity(window_length);
        for position in 0..window_length {
            let column = substrate_column(position, window_size);
            if substrates.has_column(&column) {
                positions.push(Some(substrates.str_values(&column)?));
            } else {
                debug!("No substrate column `{}`, the position is not scored", column);
                positions.push(None);
            }
        }

        let mut windows: HashMap<&str, Vec<Vec<Option<usize>>>> = HashMap::new();
        let substrate_codes = substrates.str_values(SUBSTRATE_CODE_COL)?;
        for (row, code) in substrate_codes.iter().enumerate() {
            let code = match code.as_deref().map(str::trim) {
                Some(code) if codes.iter().any(|requested| requested == code) => code,
                _ => continue,
            };
            let window = positions
                .iter()
                .map(|values| {
                    values
                        .as_ref()
                        .and_then(|values| values[row].as_deref())
                        .and_then(parse_residue)
                })
                .collect();
            windows.entry(code).or_default().push(window);
        }

        let mut matrices = Vec::with_capacity(codes.len());
        for code in codes {
            match windows.get(code.as_str()) {
                Some(substrates) => {
                    debug!("{} substrates for `{}`", substrates.len(), code);
                    matrices.push(ScoringMatrix::from_substrates(code, substrates, window_length));
                }
                None => warn!("No MEROPS substrates for protease `{}`, it is not predicted", code),
            }
        }
        Ok(Self {
            window_size,
            matrices,
        })
    }

    /// Reads the protease file and the MEROPS substrate table
    ///
    /// # Arguments
    /// * `protease_path` - Protease file, one MEROPS code per line
    /// * `substrate_path` - MEROPS substrate table
    /// * `window_size` - Residues on each side of the cleavage site
    /// * `merops` - MEROPS database for the protease names, if loaded
    ///
    pub fn from_files(
        protease_path: &Path,
        substrate_path: &Path,
        window_size: usize,
        merops: Option<&MeropsDatabase>,
    ) -> Result<Self, AnnotationError> {
        validate_protease_file(protease_path)?;
        let codes = read_protease_file(protease_path)?;
        info!("Reading MEROPS substrates...");
        let substrates = PeptideTable::new(DelimitedTable::read(substrate_path)?);
        Self::new(&codes, &substrates, window_size, merops)
    }

    pub fn matrices(&self) -> &[ScoringMatrix] {
        &self.matrices
    }

    /// Scores the window against every protease, best first, e.g. `C14.003: 6.01; S01.151: -0.55`.
    /// Windows of the wrong length or with padding are not scored.
    ///
    /// # Arguments
    /// * `window` - Cleavage window
    ///
    pub fn predict(&self, window: &str) -> Option<String> {
        if self.matrices.is_empty()
            || window.chars().count() != 2 * self.window_size
            || window.contains(WINDOW_PADDING)
        {
            return None;
        }
        let mut scores: Vec<(&str, f64)> = self
            .matrices
            .iter()
            .filter_map(|matrix| Some((matrix.code(), matrix.score(window)?)))
            .collect();
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        Some(
            scores
                .iter()
                .map(|(code, score)| format!("{code}: {score:.2}"))
                .collect::<Vec<String>>()
                .join(VALUE_SEPARATOR),
        )
    }

    /// Appends the predicted protease activity of every row
    ///
    /// # Arguments
    /// * `annotation` - Annotation table with the cleavage windows
    ///
    pub fn annotate(&self, annotation: &mut AnnotationTable) -> Result<(), TableError> {
        let window_column = cleavage_window_column(self.window_size);
        let predictions: Vec<Option<String>> = if annotation.has_column(&window_column) {
            annotation
                .str_values(&window_column)?
                .iter()
                .map(|window| window.as_deref().and_then(|window| self.predict(window)))
                .collect()
        } else {
            warn!(
                "No `{}` column, the protease activity can not be predicted",
                window_column
            );
            vec![None; annotation.height()]
        };
        info!(
            "Predicted the protease activity of {} cleavage windows",
            predictions.iter().flatten().count()
        );
        annotation.append(Column::new(
            PREDICTED_PROTEASE_ACTIVITY_COL.into(),
            predictions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs::write as write_file;

    const SUBSTRATES: &str = "code,Site_P2,Site_P1,Site_P1prime,Site_P2prime\n\
        C14.003,Val,Asp,Gly,Ser\n\
        C14.003,Val,Asp,Ala,Ser\n\
        C14.003,E,D,G,-\n\
        S01.151,Ala,Lys,Ala,Ala\n\
        S01.151,Gly,Arg,Ser,Ala\n\
        M10.003,Pro,Leu,Gly,Ile\n";

    fn write_fixture(name: &str, content: &str) -> std::path::PathBuf {
        let path = env::temp_dir().join(name);
        write_file(&path, content).unwrap();
        path
    }

    fn predictor() -> ProteasePredictor {
        let protease_path = write_fixture(
            "clipper_test_proteases.txt",
            "C14.003\n\nS01.151\nC14.003\nM10.001\n",
        );
        let substrate_path = write_fixture("clipper_test_merops_substrates.csv", SUBSTRATES);
        ProteasePredictor::from_files(&protease_path, &substrate_path, 2, None).unwrap()
    }

    #[test]
    fn test_parse_residue() {
        assert_eq!(parse_residue("Asp"), Some(2));
        assert_eq!(parse_residue("asp"), Some(2));
        assert_eq!(parse_residue(" d "), Some(2));
        assert_eq!(parse_residue("Xaa"), None);
        assert_eq!(parse_residue("-"), None);
        assert_eq!(substrate_column(0, 4), "Site_P4");
        assert_eq!(substrate_column(3, 4), "Site_P1");
        assert_eq!(substrate_column(4, 4), "Site_P1prime");
    }

    #[test]
    fn test_read_protease_file() {
        let path = write_fixture("clipper_test_protease_codes.txt", "C14.003\n\n S01.151 \nC14.003\n");
        assert_eq!(
            read_protease_file(&path).unwrap(),
            vec!["C14.003".to_string(), "S01.151".to_string()]
        );
    }

    #[test]
    fn test_invalid_protease_file() {
        assert!(matches!(
            validate_protease_file(&env::temp_dir().join("clipper_test_no_such_proteases.txt")),
            Err(FormatError::MissingFile("protease file", _))
        ));
        let path = write_fixture("clipper_test_proteases.csv", "C14.003\n");
        assert!(matches!(
            validate_protease_file(&path),
            Err(FormatError::UnsupportedFileFormat("protease file", _))
        ));
    }

    #[test]
    fn test_scoring_matrix() {
        let predictor = predictor();
        let codes: Vec<&str> = predictor.matrices().iter().map(|matrix| matrix.code()).collect();
        // M10.001 has no substrates
        assert_eq!(codes, vec!["C14.003", "S01.151"]);

        let caspase = &predictor.matrices()[0];
        let expected = 2.0 * (60.0_f64 / 23.0).log2()
            + (80.0_f64 / 23.0).log2()
            + (60.0_f64 / 22.0).log2();
        assert!((caspase.score("VDGS").unwrap() - expected).abs() < 1e-9);
        assert_eq!(caspase.score("VDG"), None);
    }

    #[test]
    fn test_predict() {
        let predictor = predictor();
        assert_eq!(
            predictor.predict("VDGS").as_deref(),
            Some("C14.003: 6.01; S01.151: -0.55")
        );
        // non standard residues score 0
        assert_eq!(
            predictor.predict("VDXS").as_deref(),
            Some("C14.003: 4.63; S01.151: -0.41")
        );
        assert_eq!(predictor.predict("--MK"), None);
        assert_eq!(predictor.predict("VDG"), None);
    }

    #[test]
    fn test_annotate() {
        let predictor = predictor();
        let window_column = cleavage_window_column(2);
        let mut annotation = AnnotationTable::new(4, &[window_column.clone()]).unwrap();
        annotation
            .set(Column::new(
                window_column.as_str().into(),
                vec![Some("VDGS"), Some("--MK"), None, Some("AKAA")],
            ))
            .unwrap();
        predictor.annotate(&mut annotation).unwrap();
        let predictions = annotation
            .str_values(PREDICTED_PROTEASE_ACTIVITY_COL)
            .unwrap();
        assert_eq!(
            predictions[0].as_deref(),
            Some("C14.003: 6.01; S01.151: -0.55")
        );
        assert_eq!(predictions[1], None);
        assert_eq!(predictions[2], None);
        assert!(predictions[3]
            .as_deref()
            .unwrap()
            .starts_with("S01.151: "));
    }

    #[test]
    fn test_missing_code_column() {
        let substrates = PeptideTable::from_string_columns(vec![(
            "protease",
            vec![Some("C14.003")],
        )])
        .unwrap();
        assert!(matches!(
            ProteasePredictor::new(&["C14.003".to_string()], &substrates, 2, None),
            Err(AnnotationError::FormatError(FormatError::MissingColumn(_, _)))
        ));
    }
}
