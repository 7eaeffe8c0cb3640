use polars::error::PolarsError;
use thiserror::Error;

/// Violations of the append-only column store and wrapped polars errors
///
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Column `{0}` has {1} rows, table has {2}")]
    HeightMismatch(String, usize, usize),
    #[error("Column `{0}` already exists")]
    DuplicateColumn(String),
    #[error("Anchor column `{0}` does not exist")]
    MissingAnchor(String),
    #[error("Column `{0}` does not exist")]
    MissingColumn(String),
    #[error("Polars error when `{0}`:\n\t{1}")]
    PolarsError(&'static str, PolarsError),
}
