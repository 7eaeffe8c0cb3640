/// Derivation of the annotation of a single peptide
pub mod entry;
/// Known cleavages of the MEROPS database
pub mod merops;
/// Protease activity prediction by substrate scoring matrices
pub mod protease_prediction;
/// UniProtKB protein record
pub mod protein_record;
/// Abstraction over the source of protein records
pub mod record_source;
/// Wave scheduling of the record retrieval
pub mod scheduler;
/// Lazily loaded index of available structural models
pub mod structure_models;
/// HTTP client for the UniProtKB REST API
pub mod uniprot_client;
/// Per row warnings and their collector
pub mod warnings;
