use std::path::PathBuf;

use crate::constants::UNIPROT_REST_URL;

/// Configuration of the record retrieval
///
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EnrichmentConfiguration {
    /// Number of concurrent record requests per wave
    pub workers: usize,
    /// Delay before each request in ms, to not overwhelm the record source
    pub sleep_time_ms: u64,
    /// Number of retries for failed requests which might succeed on another attempt
    pub max_retries: usize,
    /// Backoff before the first retry in ms, doubled on each further retry
    pub backoff_ms: u64,
    /// Base URL of the UniProt REST API
    pub record_source_url: String,
    /// MEROPS cleavage table (`uniprot_acc`, `p1`, `code`)
    pub merops_cleavage_file: Option<PathBuf>,
    /// MEROPS protease names (`code`, `name`, `type`)
    pub merops_name_file: Option<PathBuf>,
    /// MEROPS substrates (`code`, `Site_P4` .. `Site_P1`, `Site_P1prime` .. `Site_P4prime`),
    /// needed for the protease activity prediction
    pub merops_substrate_file: Option<PathBuf>,
    /// File with one accession per line for which a structural model is available
    pub structure_models_file: Option<PathBuf>,
}

impl Default for EnrichmentConfiguration {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|cores| cores.get())
                .unwrap_or(4),
            sleep_time_ms: 500,
            max_retries: 3,
            backoff_ms: 1000,
            record_source_url: UNIPROT_REST_URL.to_string(),
            merops_cleavage_file: None,
            merops_name_file: None,
            merops_substrate_file: None,
            structure_models_file: None,
        }
    }
}

/// Configuration of an annotation run
///
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AnnotationConfiguration {
    /// Software which created the input: `infer`, `pd` (Proteome Discoverer) or `sm` (Spectronaut)
    pub software: String,
    /// Peptide level: `all`, `nterm` (all N-termini) or `quant` (labeled N-termini)
    pub level: String,
    /// Drop rows without any quantification value
    pub dropna: bool,
    /// Value to fill missing quantification values with
    pub fillna: Option<f64>,
    /// Only write the annotation instead of joining it to the input
    pub separate: bool,
    /// Output format: `csv`, `tsv` or `json`
    pub output_format: String,
    /// Number of residues on each side of the cleavage site in the cleavage window
    pub cleavage_site_size: usize,
    /// Skip protease attribution by MEROPS
    pub nomerops: bool,
    /// Skip the exopeptidase detection
    pub noexo: bool,
    /// Text file with one MEROPS protease code per line, enables the protease activity prediction
    pub protease_file: Option<PathBuf>,
    /// Run hypothesis tests between the conditions
    pub stat: bool,
    /// Run pairwise t-tests for every ordered condition pair when there are more than two conditions
    pub stat_pairwise: bool,
    /// Percentile classification of the fold changes: `all` or `nterm`
    pub significance: Option<String>,
    /// Percentile used by the percentile classification
    pub percentile: f64,
    /// Correct p-values for multiple testing
    pub multiple_testing: bool,
    /// Method for multiple testing correction
    pub multiple_testing_method: String,
    /// Significance threshold
    pub alpha: f64,
    /// Record retrieval
    pub enrichment: EnrichmentConfiguration,
}

impl AnnotationConfiguration {
    /// Create a new default configuration
    ///
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for AnnotationConfiguration {
    fn default() -> Self {
        Self {
            software: "infer".to_string(),
            level: "all".to_string(),
            dropna: false,
            fillna: None,
            separate: false,
            output_format: "csv".to_string(),
            cleavage_site_size: 4,
            nomerops: false,
            noexo: false,
            protease_file: None,
            stat: false,
            stat_pairwise: false,
            significance: None,
            percentile: 0.05,
            multiple_testing: false,
            multiple_testing_method: "fdr_bh".to_string(),
            alpha: 0.05,
            enrichment: EnrichmentConfiguration::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip_of_default() {
        let config = AnnotationConfiguration::new();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AnnotationConfiguration = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.software, "infer");
        assert_eq!(deserialized.cleavage_site_size, 4);
        assert_eq!(deserialized.enrichment.max_retries, 3);
        assert!(deserialized.fillna.is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AnnotationConfiguration = toml::from_str(
            "level = \"nterm\"\nstat = true\n\n[enrichment]\nworkers = 2\n",
        )
        .unwrap();
        assert_eq!(config.level, "nterm");
        assert!(config.stat);
        assert_eq!(config.software, "infer");
        assert_eq!(config.output_format, "csv");
        assert_eq!(config.multiple_testing_method, "fdr_bh");
        assert!(config.protease_file.is_none());
        assert_eq!(config.enrichment.workers, 2);
        assert_eq!(config.enrichment.sleep_time_ms, 500);
        assert_eq!(config.enrichment.record_source_url, UNIPROT_REST_URL);

        let empty: AnnotationConfiguration = toml::from_str("").unwrap();
        assert_eq!(empty.cleavage_site_size, 4);
    }
}
