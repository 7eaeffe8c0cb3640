/// Compiled regular expression with its source
pub mod pattern;
/// Mapping from logical roles to column names and patterns
pub mod pattern_map;
/// Pattern resolution for Proteome Discoverer input
pub mod proteome_discoverer;
/// Coercion of quantification columns to floats
pub mod quantification;
/// Supported upstream software and software inference
pub mod software;
/// Pattern resolution for Spectronaut input
pub mod spectronaut;
