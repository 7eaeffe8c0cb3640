// std imports
use std::path::{Path, PathBuf};
use std::str::FromStr;

// 3rd party imports
use polars::prelude::*;
use tracing::{info, warn};

// internal imports
use crate::conditions::ConditionMap;
use crate::configuration::AnnotationConfiguration;
use crate::constants::*;
use crate::enrichment::merops::MeropsDatabase;
use crate::enrichment::protease_prediction::{validate_protease_file, ProteasePredictor};
use crate::enrichment::record_source::RecordSource;
use crate::enrichment::scheduler::EnrichmentScheduler;
use crate::enrichment::structure_models::StructureModelIndex;
use crate::enrichment::uniprot_client::UniProtClient;
use crate::errors::{
    annotation_error::AnnotationError, format_error::FormatError, table_error::TableError,
};
use crate::exopeptidase;
use crate::io::delimited_table::{DelimitedTable, OutputFormat};
use crate::patterns::software::resolve;
use crate::sanitizer::{drop_missing_quantification, filter_level, sanitize, Level};
use crate::statistics::correction::CorrectionMethod;
use crate::statistics::engine::{StatisticsEngine, StatisticsSettings};
use crate::statistics::percentile::SignificanceMode;
use crate::table::{annotation_table::AnnotationTable, peptide_table::PeptideTable};

/// Suffix of the default output file name
///
const OUTPUT_SUFFIX: &str = "_annotated";

/// Annotation steps which were already applied to the input, e.g. when an output is annotated again
///
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct InputAnnotationStatus {
    /// Protein records were already fetched (`acc_length`)
    pub uniprot: bool,
    /// MEROPS proteases were already attributed (`protease_merops_code`)
    pub merops: bool,
    /// Exopeptidase activity was already detected (`exopeptidase`)
    pub exopeptidase: bool,
}

impl InputAnnotationStatus {
    /// Infers the status from the column names of the input
    ///
    /// # Arguments
    /// * `peptides` - Peptide table as read
    ///
    pub fn infer(peptides: &PeptideTable) -> Self {
        let status = Self {
            uniprot: peptides.has_column(ACCESSION_LENGTH_COL),
            merops: peptides.has_column(PROTEASE_MEROPS_CODE_COL),
            exopeptidase: peptides.has_column(EXOPEPTIDASE_COL),
        };
        if status != Self::default() {
            info!(
                "Input is already annotated (UniProt: {}, MEROPS: {}, exopeptidase: {})",
                status.uniprot, status.merops, status.exopeptidase
            );
        }
        status
    }
}

/// Annotation run from the input table to the written output.
/// The configuration is validated on creation, so invalid settings fail before any work is done.
///
pub struct AnnotationPipeline {
    configuration: AnnotationConfiguration,
    level: Level,
    output_format: OutputFormat,
    statistics: StatisticsSettings,
}

impl AnnotationPipeline {
    /// Creates a new pipeline
    ///
    /// # Arguments
    /// * `configuration` - Annotation configuration
    ///
    pub fn new(configuration: AnnotationConfiguration) -> Result<Self, AnnotationError> {
        let level = Level::from_str(&configuration.level)?;
        let output_format = OutputFormat::from_str(&configuration.output_format)?;
        let significance = configuration
            .significance
            .as_deref()
            .map(SignificanceMode::from_str)
            .transpose()?;
        let correction_method = CorrectionMethod::from_str(&configuration.multiple_testing_method)?;
        if let Some(protease_file) = configuration.protease_file.as_deref() {
            validate_protease_file(protease_file)?;
            match configuration.enrichment.merops_substrate_file.as_deref() {
                Some(substrate_file) if !substrate_file.is_file() => {
                    return Err(FormatError::MissingFile(
                        "MEROPS substrate file",
                        substrate_file.display().to_string(),
                    )
                    .into())
                }
                Some(_) => (),
                None => return Err(FormatError::MissingSubstrateFile.into()),
            }
        }
        let statistics = StatisticsSettings {
            stat: configuration.stat,
            pairwise: configuration.stat_pairwise,
            significance,
            percentile: configuration.percentile,
            correction: configuration.multiple_testing.then_some(correction_method),
            alpha: configuration.alpha,
        };
        Ok(Self {
            configuration,
            level,
            output_format,
            statistics,
        })
    }

    /// Default output path next to the input, e.g. `peptides_annotated.csv`
    ///
    /// # Arguments
    /// * `infile` - Input path
    /// * `format` - Output format
    ///
    pub fn default_outfile(infile: &Path, format: OutputFormat) -> PathBuf {
        let stem = infile
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        infile.with_file_name(format!("{stem}{OUTPUT_SUFFIX}.{}", format.extension()))
    }

    /// Reads the input, annotates it with records from UniProt and writes the output.
    /// Returns the path of the written output.
    ///
    /// # Arguments
    /// * `infile` - Delimited peptide table
    /// * `conditions_file` - Optional condition file, statistics are skipped without it
    /// * `outfile` - Optional output path, default is next to the input
    ///
    pub async fn run(
        &self,
        infile: &Path,
        conditions_file: Option<&Path>,
        outfile: Option<PathBuf>,
    ) -> Result<PathBuf, AnnotationError> {
        DelimitedTable::validate_input_path(infile)?;
        if let Some(conditions_file) = conditions_file {
            if !conditions_file.is_file() {
                return Err(FormatError::MissingFile(
                    "condition file",
                    conditions_file.display().to_string(),
                )
                .into());
            }
        }
        let conditions = conditions_file.map(ConditionMap::from_file).transpose()?;
        let peptides = PeptideTable::new(DelimitedTable::read(infile)?);
        let source = UniProtClient::new(&self.configuration.enrichment);

        let mut output = self
            .process(peptides, conditions.as_ref(), &source)
            .await?;

        let outfile = outfile.unwrap_or_else(|| Self::default_outfile(infile, self.output_format));
        DelimitedTable::write(&mut output, &outfile, self.output_format)?;
        info!("Wrote {} rows to `{}`", output.height(), outfile.display());
        Ok(outfile)
    }

    /// Annotates the peptide table and returns the output table
    ///
    /// # Arguments
    /// * `peptides` - Peptide table as read
    /// * `conditions` - Optional conditions for the statistics
    /// * `source` - Record source
    ///
    pub async fn process<S: RecordSource>(
        &self,
        mut peptides: PeptideTable,
        conditions: Option<&ConditionMap>,
        source: &S,
    ) -> Result<DataFrame, AnnotationError> {
        let configuration = &self.configuration;
        let status = InputAnnotationStatus::infer(&peptides);
        let patterns = resolve(&mut peptides, &configuration.software, configuration.fillna)?;

        filter_level(&mut peptides, &patterns, self.level)?;
        if configuration.dropna {
            drop_missing_quantification(&mut peptides, &patterns)?;
        }
        sanitize(&mut peptides, &patterns)?;

        let merops = self.load_merops()?;
        let mut annotation = if status.uniprot {
            info!("Skipping the record retrieval, reusing the annotation of the input");
            Self::seed_annotation(&peptides, configuration.cleavage_site_size)?
        } else {
            let structure_models =
                StructureModelIndex::new(configuration.enrichment.structure_models_file.clone());
            let scheduler = EnrichmentScheduler::new(
                source,
                &patterns,
                configuration.cleavage_site_size,
                configuration.enrichment.workers,
                !configuration.nomerops && !status.merops,
                merops.as_ref(),
                &structure_models,
            );
            scheduler.annotate(&peptides).await?.0
        };

        match conditions {
            Some(conditions) => {
                info!("Calculating statistics for {} conditions...", conditions.len());
                StatisticsEngine::new(&peptides, &patterns, conditions)
                    .run(&mut annotation, &self.statistics)?;
            }
            None if configuration.stat => {
                warn!("Statistics were requested, but no condition file was supplied.");
            }
            None => (),
        }

        if let Some(protease_file) = configuration.protease_file.as_deref() {
            info!("Predicting protease activity...");
            let substrate_file = configuration
                .enrichment
                .merops_substrate_file
                .as_deref()
                .ok_or(FormatError::MissingSubstrateFile)?;
            ProteasePredictor::from_files(
                protease_file,
                substrate_file,
                configuration.cleavage_site_size,
                merops.as_ref(),
            )?
            .annotate(&mut annotation)?;
        }

        if !configuration.noexo && !status.exopeptidase {
            info!("Checking for exopeptidase activity...");
            exopeptidase::annotate(&mut annotation)?;
        }

        if configuration.separate {
            return Ok(annotation.into_data_frame());
        }
        Ok(Self::join(peptides, annotation)?)
    }

    fn load_merops(&self) -> Result<Option<MeropsDatabase>, AnnotationError> {
        if self.configuration.nomerops {
            return Ok(None);
        }
        let enrichment = &self.configuration.enrichment;
        match (
            enrichment.merops_cleavage_file.as_deref(),
            enrichment.merops_name_file.as_deref(),
        ) {
            (Some(cleavage_path), Some(name_path)) => {
                Ok(Some(MeropsDatabase::from_files(cleavage_path, name_path)?))
            }
            _ => {
                warn!("No MEROPS files configured, MEROPS columns stay empty.");
                Ok(None)
            }
        }
    }

    /// Annotation table from the annotation columns which are already part of the input
    ///
    /// # Arguments
    /// * `peptides` - Sanitized, already annotated peptide table
    /// * `window_size` - Residues on each side of the cleavage site
    ///
    fn seed_annotation(peptides: &PeptideTable, window_size: usize) -> Result<AnnotationTable, TableError> {
        let window_column = cleavage_window_column(window_size);
        let mut annotation = AnnotationTable::new(peptides.height(), &[])?;
        for name in [
            QUERY_SEQUENCE_COL,
            QUERY_ACCESSION_COL,
            NAME_COL,
            FULL_SEQUENCE_COL,
            DESCRIPTION_COL,
            KEYWORDS_COL,
            GO_CODES_COL,
            GO_NAMES_COL,
            PROTEOFORM_CERTAINTY_COL,
            ACCESSION_LENGTH_COL,
            START_PEPTIDE_COL,
            END_PEPTIDE_COL,
            P1_POSITION_COL,
            CLEAVAGE_SITE_COL,
            window_column.as_str(),
            NTERM_ANNOTATION_COL,
            NTERM_MODIFICATION_COL,
            PROTEASE_UNIPROT_COL,
            PROTEASE_MEROPS_CODE_COL,
            PROTEASE_MEROPS_NAME_COL,
            EXOPEPTIDASE_COL,
        ] {
            if peptides.has_column(name) {
                annotation.append(Column::new(name.into(), peptides.str_values(name)?))?;
            }
        }
        Ok(annotation)
    }

    /// Appends the annotation columns to the input table.
    /// Annotation columns named like an input column are dropped.
    ///
    /// # Arguments
    /// * `peptides` - Sanitized peptide table
    /// * `annotation` - Row aligned annotation table
    ///
    fn join(peptides: PeptideTable, annotation: AnnotationTable) -> Result<DataFrame, TableError> {
        let input = peptides.into_data_frame();
        let additional: Vec<Column> = annotation
            .into_data_frame()
            .take_columns()
            .into_iter()
            .filter(|column| input.get_column_index(column.name().as_str()).is_none())
            .collect();
        input
            .hstack(&additional)
            .map_err(|err| TableError::PolarsError("joining annotation to input", err))
    }
}
