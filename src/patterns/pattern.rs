// 3rd party imports
use fancy_regex::Regex;

// internal imports
use crate::errors::format_error::FormatError;
use crate::functions::{compile_pattern, is_match};

/// Regular expression which remembers its source, so two patterns compare equal
/// if they were compiled from the same expression.
///
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles a new pattern
    ///
    /// # Arguments
    /// * `source` - Regular expression
    ///
    pub fn new(source: &str) -> Result<Self, FormatError> {
        Ok(Self {
            source: source.to_string(),
            regex: compile_pattern(source)?,
        })
    }

    /// Returns the regular expression
    ///
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the compiled regex
    ///
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Checks if the pattern matches anywhere in the haystack
    ///
    /// # Arguments
    /// * `haystack` - String to search in
    ///
    pub fn is_match(&self, haystack: &str) -> bool {
        is_match(&self.regex, haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern() {
        let pattern = Pattern::new(r"TMT.* \[N-Term\]").unwrap();
        assert!(pattern.is_match("1xTMTpro [N-Term]; 1xTMTpro [K4]"));
        assert!(!pattern.is_match("1xDimethyl [N-Term]"));
        assert_eq!(pattern, Pattern::new(r"TMT.* \[N-Term\]").unwrap());
        assert!(Pattern::new("(unclosed").is_err());
    }
}
