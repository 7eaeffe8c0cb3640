use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatisticsError {
    #[error("Unknown multiple testing correction method `{0}`")]
    UnknownCorrectionMethod(String),
    #[error("Table error during statistics:\n\t{0}")]
    TableError(#[from] super::table_error::TableError),
}
