/// Delimited peptide tables
pub mod delimited_table;
