use thiserror::Error;

/// Fatal errors about inputs which can not be processed.
/// Each of them aborts the whole run.
///
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Invalid software input `{0}`. Please provide a valid software format (pd, sm or infer) and try again.")]
    UnsupportedSoftware(String),
    #[error("Input from `{0}` is recognized but not supported. Please convert it to a supported format and try again.")]
    UnsupportedDialect(&'static str),
    #[error("Invalid input. Please make sure input format is correct and contains accession and sequence columns with default names, and try again.")]
    UnknownDialect,
    #[error("Invalid input. Please make sure input format `{0}` is correct and contains the column `{1}`.")]
    MissingColumn(&'static str, String),
    #[error("Invalid input. Input format `{0}` contains no valid modification column ({1}).")]
    MissingModificationColumn(&'static str, String),
    #[error("Invalid input. Input contains no rows with an accession.")]
    NoAccessionRows,
    #[error("Could not filter peptides on level `{0}`: no `{1}` pattern was detected for this input. Make sure the software is correct and the peptides are labeled.")]
    MissingLevelPattern(String, &'static str),
    #[error("Unrecognized level `{0}`. Use all, nterm or quant.")]
    UnsupportedLevel(String),
    #[error("Unrecognized significance mode `{0}`. Use all or nterm.")]
    UnsupportedSignificance(String),
    #[error("Invalid {0} format `{1}`. Please select a valid {0} format and try again.")]
    UnsupportedFileFormat(&'static str, String),
    #[error("Invalid condition file line {0}: `{1}`. Expected `<condition> <channel> [<channel> ...]`.")]
    InvalidConditionLine(usize, String),
    #[error("Condition `{0}` is defined more than once.")]
    DuplicateCondition(String),
    #[error("Invalid {0}. Check if the path `{1}` exists, and try again.")]
    MissingFile(&'static str, String),
    #[error("Protease activity prediction needs a MEROPS substrate file (`merops_substrate_file` in the enrichment configuration).")]
    MissingSubstrateFile,
    #[error("Invalid regular expression `{0}`:\n\t{1}")]
    InvalidPattern(String, Box<fancy_regex::Error>),
}
