// Include readme in doc
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Readme.md"))]

/// Conditions of an experiment and their channels
pub mod conditions;
/// Configuration of an annotation run
pub mod configuration;
/// Column names and fixed patterns
pub mod constants;
/// Enrichment of the peptides with protein records
pub mod enrichment;
/// Errors
pub mod errors;
/// Detection of ragged N-termini
pub mod exopeptidase;
/// Small helpers
pub mod functions;
/// Reading and writing delimited tables
pub mod io;
/// Column patterns of the supported software
pub mod patterns;
/// Annotation run from input to output
pub mod pipeline;
/// Level filter and removal of invalid peptides
pub mod sanitizer;
/// Condition statistics
pub mod statistics;
/// Column stores backed by polars
pub mod table;
