// std imports
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

// 3rd party imports
use tracing::{info, warn};

// internal imports
use crate::errors::{annotation_error::AnnotationError, format_error::FormatError};

/// Experimental condition with its replicate channels
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    name: String,
    channels: Vec<String>,
}

impl Condition {
    /// Creates a new condition
    ///
    /// # Arguments
    /// * `name` - Name of the condition
    /// * `channels` - Channel identifiers, matched as substrings of the quantification column names
    ///
    pub fn new(name: String, channels: Vec<String>) -> Self {
        Self { name, channels }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Returns the columns containing any of the channels, keeping the given order
    ///
    /// # Arguments
    /// * `columns` - Quantification columns
    ///
    pub fn matching_columns<'a>(&self, columns: &'a [String]) -> Vec<&'a str> {
        columns
            .iter()
            .filter(|column| {
                self.channels
                    .iter()
                    .any(|channel| column.contains(channel.as_str()))
            })
            .map(|column| column.as_str())
            .collect()
    }
}

/// Ordered conditions of an experiment with their eagerly derived pairs
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionMap {
    conditions: Vec<Condition>,
    combinations: Vec<(usize, usize)>,
    permutations: Vec<(usize, usize)>,
}

impl ConditionMap {
    /// Creates a new condition map and derives the combinations and permutations
    ///
    /// # Arguments
    /// * `conditions` - Conditions in the order of the condition file
    ///
    pub fn new(conditions: Vec<Condition>) -> Result<Self, FormatError> {
        for (idx, condition) in conditions.iter().enumerate() {
            if conditions[..idx]
                .iter()
                .any(|other| other.name == condition.name)
            {
                return Err(FormatError::DuplicateCondition(condition.name.clone()));
            }
        }
        warn_overlapping_channels(&conditions);

        let mut combinations = Vec::new();
        let mut permutations = Vec::new();
        for first in 0..conditions.len() {
            for second in 0..conditions.len() {
                if first == second {
                    continue;
                }
                if first < second {
                    combinations.push((first, second));
                }
                permutations.push((first, second));
            }
        }

        Ok(Self {
            conditions,
            combinations,
            permutations,
        })
    }

    /// Reads a condition file
    ///
    /// # Arguments
    /// * `path` - Path to the condition file
    ///
    pub fn from_file(path: &Path) -> Result<Self, AnnotationError> {
        let content = read_to_string(path)
            .map_err(|err| AnnotationError::FileReadError(path.display().to_string(), err))?;
        let conditions = Self::from_str(&content)?;
        info!(
            "Read {} conditions: {}",
            conditions.len(),
            conditions.names().join(", ")
        );
        Ok(conditions)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Condition names in order
    ///
    pub fn names(&self) -> Vec<&str> {
        self.conditions
            .iter()
            .map(|condition| condition.name())
            .collect()
    }

    /// Unordered condition pairs, e.g. (A, B) but not (B, A)
    ///
    pub fn combinations(&self) -> impl Iterator<Item = (&Condition, &Condition)> {
        self.combinations
            .iter()
            .map(|(first, second)| (&self.conditions[*first], &self.conditions[*second]))
    }

    /// Ordered condition pairs, e.g. (A, B) and (B, A)
    ///
    pub fn permutations(&self) -> impl Iterator<Item = (&Condition, &Condition)> {
        self.permutations
            .iter()
            .map(|(first, second)| (&self.conditions[*first], &self.conditions[*second]))
    }

    /// Labels of the combinations, e.g. `A vs. B`
    ///
    pub fn combination_labels(&self) -> Vec<String> {
        self.combinations()
            .map(|(first, second)| comparison_label(&[first.name(), second.name()]))
            .collect()
    }
}

impl FromStr for ConditionMap {
    type Err = FormatError;

    /// Parses whitespace separated lines: `<condition> <channel> [<channel> ...]`.
    /// Empty lines are skipped.
    ///
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let mut conditions = Vec::new();
        for (line_idx, line) in content.lines().enumerate() {
            let mut tokens = line.split_whitespace();
            let name = match tokens.next() {
                Some(name) => name.to_string(),
                None => continue,
            };
            let channels: Vec<String> = tokens.map(|token| token.to_string()).collect();
            if channels.is_empty() {
                return Err(FormatError::InvalidConditionLine(
                    line_idx + 1,
                    line.to_string(),
                ));
            }
            conditions.push(Condition::new(name, channels));
        }
        Self::new(conditions)
    }
}

/// Joins condition names to a comparison label, e.g. `A vs. B vs. C`
///
/// # Arguments
/// * `names` - Condition names
///
pub fn comparison_label(names: &[&str]) -> String {
    names.join(" vs. ")
}

/// Channels are matched as substrings, so a channel of one condition which is contained
/// in a channel of another condition selects the columns of both.
///
fn warn_overlapping_channels(conditions: &[Condition]) {
    for (idx, condition) in conditions.iter().enumerate() {
        for other in &conditions[idx + 1..] {
            for channel in condition.channels() {
                for other_channel in other.channels() {
                    if channel.contains(other_channel.as_str())
                        || other_channel.contains(channel.as_str())
                    {
                        warn!(
                            "Channel `{}` of condition `{}` overlaps with channel `{}` of condition `{}`. Columns may be counted for both conditions.",
                            channel,
                            condition.name(),
                            other_channel,
                            other.name()
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let conditions = ConditionMap::from_str("A 126 127N\n\nB 128C\nC 129N 130C\n").unwrap();
        assert_eq!(conditions.names(), vec!["A", "B", "C"]);
        assert_eq!(conditions.conditions()[0].channels(), &["126", "127N"]);
        assert_eq!(
            conditions.combination_labels(),
            vec!["A vs. B", "A vs. C", "B vs. C"]
        );
        let permutations: Vec<(&str, &str)> = conditions
            .permutations()
            .map(|(first, second)| (first.name(), second.name()))
            .collect();
        assert_eq!(
            permutations,
            vec![
                ("A", "B"),
                ("A", "C"),
                ("B", "A"),
                ("B", "C"),
                ("C", "A"),
                ("C", "B")
            ]
        );
    }

    #[test]
    fn test_line_without_channel() {
        assert!(matches!(
            ConditionMap::from_str("A 126\nB\n"),
            Err(FormatError::InvalidConditionLine(2, _))
        ));
    }

    #[test]
    fn test_duplicate_condition() {
        assert!(matches!(
            ConditionMap::from_str("A 126\nA 127\n"),
            Err(FormatError::DuplicateCondition(_))
        ));
    }

    #[test]
    fn test_matching_columns() {
        let condition = Condition::new("A".to_string(), vec!["F1".to_string(), "F3".to_string()]);
        let columns = vec![
            "Abundance: F1".to_string(),
            "Abundance: F2".to_string(),
            "Abundance: F3".to_string(),
        ];
        assert_eq!(
            condition.matching_columns(&columns),
            vec!["Abundance: F1", "Abundance: F3"]
        );
    }
}
