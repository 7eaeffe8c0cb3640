// std imports
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

// 3rd party imports
use polars::prelude::*;
use tracing::{debug, info};

// internal imports
use crate::errors::{annotation_error::AnnotationError, format_error::FormatError};

/// Separators tried in order when reading a delimited file
///
const INPUT_SEPARATORS: [u8; 3] = [b',', b';', b'\t'];

/// Supported output formats
///
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    /// File extension of the format
    ///
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            _ => Err(FormatError::UnsupportedFileFormat(
                "output",
                format.to_string(),
            )),
        }
    }
}

/// Reader and writer for delimited peptide tables
///
pub struct DelimitedTable;

impl DelimitedTable {
    /// Checks the extension of the input file
    ///
    /// # Arguments
    /// * `path` - Path to the input file
    ///
    pub fn validate_input_path(path: &Path) -> Result<(), FormatError> {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("csv") | Some("tsv") | Some("txt") => Ok(()),
            other => Err(FormatError::UnsupportedFileFormat(
                "input",
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Reads a delimited file with every column as string.
    /// The separators `,`, `;` and `\t` are tried in this order, the first one
    /// resulting in more than one column is used.
    ///
    /// # Arguments
    /// * `path` - Path to the delimited file
    ///
    pub fn read(path: &Path) -> Result<DataFrame, AnnotationError> {
        let mut last_result = None;
        for separator in INPUT_SEPARATORS {
            match Self::read_with_separator(path, separator) {
                Ok(df) => {
                    if df.width() > 1 {
                        info!("Read input with {} peptides.", df.height());
                        return Ok(df);
                    }
                    debug!(
                        "Parsing with `{}` resulted in a single column, trying next separator",
                        separator as char
                    );
                    last_result = Some(Ok(df));
                }
                Err(err) => {
                    debug!(
                        "Failed to parse with `{}`: {}, trying next separator",
                        separator as char, err
                    );
                    last_result = Some(Err(err));
                }
            }
        }
        match last_result {
            Some(result) => result
                .map_err(|err| AnnotationError::FileParseError(path.display().to_string(), err)),
            None => Ok(DataFrame::empty()),
        }
    }

    fn read_with_separator(path: &Path, separator: u8) -> PolarsResult<DataFrame> {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_parse_options(CsvParseOptions::default().with_separator(separator))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()
    }

    /// Writes the dataframe in the given format
    ///
    /// # Arguments
    /// * `df` - Dataframe to write
    /// * `path` - Output path
    /// * `format` - Output format
    ///
    pub fn write(df: &mut DataFrame, path: &Path, format: OutputFormat) -> Result<(), AnnotationError> {
        let mut file = File::create(path)
            .map_err(|err| AnnotationError::FileWriteError(path.display().to_string(), err))?;
        let result = match format {
            OutputFormat::Csv => CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(b',')
                .finish(df),
            OutputFormat::Tsv => CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(b'\t')
                .finish(df),
            OutputFormat::Json => JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::Json)
                .finish(df),
        };
        result.map_err(|err| AnnotationError::FileParseError(path.display().to_string(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs::write as write_file;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("TSV").unwrap(), OutputFormat::Tsv);
        assert!(matches!(
            OutputFormat::from_str("xlsx"),
            Err(FormatError::UnsupportedFileFormat("output", _))
        ));
    }

    #[test]
    fn test_validate_input_path() {
        assert!(DelimitedTable::validate_input_path(Path::new("peptides.csv")).is_ok());
        assert!(DelimitedTable::validate_input_path(Path::new("peptides.xlsx")).is_err());
    }

    #[test]
    fn test_read_semicolon_separated() {
        let path = env::temp_dir().join("clipper_test_read_semicolon_separated.csv");
        write_file(&path, "Sequence;Master Protein Accessions\nPEPTIDE;P12345\n").unwrap();
        let df = DelimitedTable::read(&path).unwrap();
        assert_eq!(df.width(), 2);
        assert_eq!(df.height(), 1);
        assert_eq!(df.column("Sequence").unwrap().dtype(), &DataType::String);
    }
}
