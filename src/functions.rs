// 3rd party imports
use fancy_regex::Regex;
use lazy_static::lazy_static;

// internal imports
use crate::constants::ACCESSION_SEPARATOR;
use crate::errors::format_error::FormatError;

lazy_static! {
    /// Regex for the dotted core of an annotated sequence, e.g. `[K].PEPTIDE.[R]`
    ///
    static ref ANNOTATED_SEQUENCE_REGEX: Regex = Regex::new(r"\.([^.]+)\.").unwrap();
}

/// Compiles the given pattern into a regex
///
/// # Arguments
/// * `pattern` - Regular expression
///
pub fn compile_pattern(pattern: &str) -> Result<Regex, FormatError> {
    Regex::new(pattern).map_err(|err| FormatError::InvalidPattern(pattern.to_string(), Box::new(err)))
}

/// Checks if the regex matches anywhere in the haystack.
/// A regex exceeding the backtrack limit counts as no match.
///
/// # Arguments
/// * `regex` - Regex to search
/// * `haystack` - String to search in
///
pub fn is_match(regex: &Regex, haystack: &str) -> bool {
    regex.is_match(haystack).unwrap_or(false)
}

/// Returns the first accession of a semicolon separated accession list
/// or `None` if the cell is empty.
///
/// # Arguments
/// * `accessions` - Accession cell, e.g. `P12345; Q67890`
///
pub fn parse_accession(accessions: &str) -> Option<String> {
    accessions
        .split(ACCESSION_SEPARATOR)
        .next()
        .map(|accession| accession.trim())
        .filter(|accession| !accession.is_empty())
        .map(|accession| accession.to_string())
}

/// Counts the non-empty accessions of a semicolon separated accession list
///
/// # Arguments
/// * `accessions` - Accession cell, e.g. `P12345; Q67890`
///
pub fn count_accessions(accessions: &str) -> usize {
    accessions
        .split(ACCESSION_SEPARATOR)
        .filter(|accession| !accession.trim().is_empty())
        .count()
}

/// Extracts the plain upper case peptide sequence from an annotated sequence.
/// Sequences without flanking residues are returned upper cased.
///
/// # Arguments
/// * `sequence` - Annotated sequence, e.g. `[K].pEPTIDE.[R]`
///
pub fn parse_sequence(sequence: &str) -> String {
    let core = match ANNOTATED_SEQUENCE_REGEX.captures(sequence) {
        Ok(Some(captures)) => captures
            .get(1)
            .map(|core| core.as_str())
            .unwrap_or(sequence),
        _ => sequence,
    };
    core.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accession() {
        assert_eq!(parse_accession("P12345"), Some("P12345".to_string()));
        assert_eq!(
            parse_accession(" P12345 ; Q67890"),
            Some("P12345".to_string())
        );
        assert_eq!(parse_accession(""), None);
        assert_eq!(parse_accession(" ;Q67890"), None);
    }

    #[test]
    fn test_count_accessions() {
        assert_eq!(count_accessions("P12345"), 1);
        assert_eq!(count_accessions("P12345; Q67890;"), 2);
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("[K].aEPTIDEk.[R]"), "AEPTIDEK");
        assert_eq!(parse_sequence("[-].MAGIC.[-]"), "MAGIC");
        assert_eq!(parse_sequence("peptide"), "PEPTIDE");
    }
}
