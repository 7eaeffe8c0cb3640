/// Append-only column store holding the annotation of each peptide
pub mod annotation_table;
/// Input table of detected peptides
pub mod peptide_table;
