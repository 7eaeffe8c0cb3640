use thiserror::Error;

use super::{
    format_error::FormatError, record_error::RecordError, statistics_error::StatisticsError,
    table_error::TableError,
};

/// Merges all component errors into a single error type
/// including some shared errors
///
#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("Format error: {0}")]
    FormatError(#[from] FormatError),
    #[error("Table error: {0}")]
    TableError(#[from] TableError),
    #[error("Statistics error: {0}")]
    StatisticsError(#[from] StatisticsError),
    #[error("Record error: {0}")]
    RecordError(#[from] RecordError),
    #[error("Unable to read file: `{0}`:\n\t{1}")]
    FileReadError(String, std::io::Error),
    #[error("Unable to write file: `{0}`:\n\t{1}")]
    FileWriteError(String, std::io::Error),
    #[error("Unable to parse file `{0}`:\n\t{1}")]
    FileParseError(String, polars::error::PolarsError),
    #[error("Unable to deserialize config `{0}`:\n\t{1}")]
    ConfigDeserializationError(String, toml::de::Error),
    #[error("Unable to join task: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}
