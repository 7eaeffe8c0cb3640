// std imports
use std::collections::{HashMap, HashSet};

// 3rd party imports
use polars::prelude::*;
use tracing::{debug, info};

// internal imports
use crate::constants::{EXOPEPTIDASE_COL, EXOPEPTIDASE_SUFFIX_LENGTH, QUERY_SEQUENCE_COL};
use crate::errors::table_error::TableError;
use crate::table::annotation_table::AnnotationTable;

/// Exopeptidase activity explaining a ragged N-terminus
///
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExopeptidaseActivity {
    Aminopeptidase,
    Dipeptidase,
    /// Single residue strip following a two residue strip
    DipeptidaseSeedAminopeptidase,
}

impl ExopeptidaseActivity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Aminopeptidase => "Aminopeptidase_activity",
            Self::Dipeptidase => "Dipeptidase_activity",
            Self::DipeptidaseSeedAminopeptidase => "Dipeptidase_seed_Aminopeptidase_activity",
        }
    }
}

/// Checks if both sequences share their last residues, at most `EXOPEPTIDASE_SUFFIX_LENGTH`
///
fn shares_suffix(head: &str, candidate: &str) -> bool {
    let length = EXOPEPTIDASE_SUFFIX_LENGTH
        .min(head.chars().count())
        .min(candidate.chars().count());
    head.chars()
        .rev()
        .take(length)
        .eq(candidate.chars().rev().take(length))
}

/// Sequence without its first `count` residues, `None` if it is not longer than that
///
fn strip_residues(sequence: &str, count: usize) -> Option<&str> {
    sequence
        .char_indices()
        .nth(count)
        .map(|(index, _)| &sequence[index..])
}

/// Detects ragged N-termini produced by amino- and dipeptidases.
///
/// Sequences are processed longest first. Each unprocessed sequence starts a chain which is
/// extended by every candidate sharing its C-terminus that equals the current chain end
/// without its first one or two residues. Sequences consumed by a chain do not start one
/// themselves and keep the first label they receive.
///
/// # Arguments
/// * `sequences` - Peptide sequence of each row, rows without sequence are skipped
///
pub fn detect(sequences: &[Option<String>]) -> Vec<Option<ExopeptidaseActivity>> {
    let mut distinct: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for sequence in sequences.iter().flatten() {
        if seen.insert(sequence.as_str()) {
            distinct.push(sequence.as_str());
        }
    }
    // stable, ties keep their first occurrence
    distinct.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

    let mut labels: HashMap<&str, ExopeptidaseActivity> = HashMap::new();
    let mut cleared: HashSet<&str> = HashSet::new();
    for head in distinct.iter().copied() {
        if !cleared.insert(head) {
            continue;
        }
        let candidates: Vec<&str> = distinct
            .iter()
            .copied()
            .filter(|candidate| *candidate != head && shares_suffix(head, candidate))
            .collect();
        if candidates.is_empty() {
            continue;
        }
        let mut chain_end = head;
        let mut chain_length = head.chars().count();
        let mut ragged = false;
        for candidate in candidates {
            if strip_residues(chain_end, 1) == Some(candidate) {
                cleared.insert(candidate);
                chain_end = candidate;
                debug!("Aminopeptidase step {} -> {}", head, candidate);
                let activity = if ragged && candidate.chars().count() + 1 == chain_length {
                    ExopeptidaseActivity::DipeptidaseSeedAminopeptidase
                } else {
                    ragged = false;
                    ExopeptidaseActivity::Aminopeptidase
                };
                labels.entry(candidate).or_insert(activity);
            } else if strip_residues(chain_end, 2) == Some(candidate) {
                cleared.insert(candidate);
                chain_end = candidate;
                chain_length = candidate.chars().count();
                ragged = true;
                debug!("Dipeptidase step {} -> {}", head, candidate);
                labels
                    .entry(candidate)
                    .or_insert(ExopeptidaseActivity::Dipeptidase);
            }
        }
    }

    if !labels.is_empty() {
        info!(
            "Exopeptidase activity found for {} sequences, check the output for the exact peptides",
            labels.len()
        );
    }
    sequences
        .iter()
        .map(|sequence| {
            sequence
                .as_deref()
                .and_then(|sequence| labels.get(sequence).copied())
        })
        .collect()
}

/// Labels the rows of the annotation table by their exopeptidase activity
///
/// # Arguments
/// * `annotation` - Annotation table with query sequences
///
pub fn annotate(annotation: &mut AnnotationTable) -> Result<(), TableError> {
    let activities = detect(&annotation.str_values(QUERY_SEQUENCE_COL)?);
    let labels: Vec<Option<&str>> = activities
        .iter()
        .map(|activity| activity.map(|activity| activity.label()))
        .collect();
    annotation.append(Column::new(EXOPEPTIDASE_COL.into(), labels))
}
