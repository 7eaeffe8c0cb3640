// std imports
use std::cmp::min;

// 3rd party imports
use futures::future::join_all;
use polars::prelude::*;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, info_span, Instrument, Span};
use tracing_indicatif::{span_ext::IndicatifSpanExt, style::ProgressStyle};

// internal imports
use super::entry::{Entry, EntryAnnotation};
use super::merops::MeropsDatabase;
use super::record_source::RecordSource;
use super::structure_models::StructureModelIndex;
use super::warnings::{Warning, WarningBuckets, WarningCategory, WarningCollector};
use crate::constants::*;
use crate::errors::annotation_error::AnnotationError;
use crate::functions::{count_accessions, parse_accession, parse_sequence};
use crate::patterns::pattern_map::PatternMap;
use crate::table::{annotation_table::AnnotationTable, peptide_table::PeptideTable};

/// Progress bar style for the enrichment waves
///
const PROGRESS_BAR_STYLE: &str = "        {msg} {wide_bar} {pos}/{len} {per_sec} ";

type StringField = fn(&EntryAnnotation) -> Option<&str>;
type IntegerField = fn(&EntryAnnotation) -> Option<i64>;

fn string_column_values(annotations: &[EntryAnnotation], value: StringField) -> Vec<Option<&str>> {
    annotations.iter().map(value).collect()
}

fn integer_column_values(annotations: &[EntryAnnotation], value: IntegerField) -> Vec<Option<i64>> {
    annotations.iter().map(value).collect()
}

/// Fetches the protein record of every peptide and derives its annotation.
///
/// Rows are processed in waves of at most `workers` concurrent requests.
/// A wave finishes completely before the next one starts.
///
pub struct EnrichmentScheduler<'a, S>
where
    S: RecordSource,
{
    source: &'a S,
    patterns: &'a PatternMap,
    window_size: usize,
    workers: usize,
    include_merops: bool,
    merops: Option<&'a MeropsDatabase>,
    structure_models: &'a StructureModelIndex,
}

impl<'a, S> EnrichmentScheduler<'a, S>
where
    S: RecordSource,
{
    /// Creates a new scheduler
    ///
    /// # Arguments
    /// * `source` - Record source
    /// * `patterns` - Resolved patterns
    /// * `window_size` - Residues on each side of the cleavage site
    /// * `workers` - Maximum number of concurrent requests
    /// * `include_merops` - Add the MEROPS columns
    /// * `merops` - MEROPS database
    /// * `structure_models` - Index of the available structural models
    ///
    pub fn new(
        source: &'a S,
        patterns: &'a PatternMap,
        window_size: usize,
        workers: usize,
        include_merops: bool,
        merops: Option<&'a MeropsDatabase>,
        structure_models: &'a StructureModelIndex,
    ) -> Self {
        Self {
            source,
            patterns,
            window_size,
            workers: workers.max(1),
            include_merops,
            merops,
            structure_models,
        }
    }

    /// Annotates every peptide of the table. Row `i` of the returned annotation table
    /// belongs to row `i` of the peptide table.
    ///
    /// # Arguments
    /// * `table` - Sanitized peptide table
    ///
    pub async fn annotate(
        &self,
        table: &PeptideTable,
    ) -> Result<(AnnotationTable, WarningBuckets), AnnotationError> {
        let accessions = table.str_values(&self.patterns.accession)?;
        let sequences = table.str_values(&self.patterns.sequence)?;
        let modifications = table.str_values(&self.patterns.modification)?;

        let collector = WarningCollector::start();
        let progress_span = info_span!("enrichment");
        if let Ok(style) = ProgressStyle::with_template(PROGRESS_BAR_STYLE) {
            progress_span.pb_set_style(&style);
        }
        progress_span.pb_set_length(table.height() as u64);
        progress_span.pb_set_message("Fetching protein records");

        info!("Fetching {} protein records...", table.height());
        let annotations = self
            .run_waves(&accessions, &sequences, &modifications, &collector.sender())
            .instrument(progress_span)
            .await;

        let buckets = collector.finish().await?;
        buckets.report();
        info!("Finished fetching protein records");

        let annotation_table = self.build_table(&accessions, annotations)?;
        Ok((annotation_table, buckets))
    }

    async fn run_waves(
        &self,
        accessions: &[Option<String>],
        sequences: &[Option<String>],
        modifications: &[Option<String>],
        warnings: &UnboundedSender<Warning>,
    ) -> Vec<EntryAnnotation> {
        let height = accessions.len();
        let mut annotations = vec![EntryAnnotation::default(); height];
        if height == 0 {
            return annotations;
        }
        let batch_size = min(self.workers, height);
        for wave_start in (0..height).step_by(batch_size) {
            let wave_end = min(wave_start + batch_size, height);
            debug!("Processing rows {}..{}", wave_start, wave_end);
            let wave = (wave_start..wave_end).map(|row| async move {
                let annotation = self
                    .annotate_row(
                        accessions[row].as_deref(),
                        sequences[row].as_deref(),
                        modifications[row].as_deref(),
                        warnings,
                    )
                    .await;
                (row, annotation)
            });
            for (row, annotation) in join_all(wave).await {
                annotations[row] = annotation;
            }
            Span::current().pb_inc((wave_end - wave_start) as u64);
        }
        annotations
    }

    async fn annotate_row(
        &self,
        accession_cell: Option<&str>,
        sequence_cell: Option<&str>,
        modification: Option<&str>,
        warnings: &UnboundedSender<Warning>,
    ) -> EntryAnnotation {
        let send = |warning: Warning| {
            if warnings.send(warning).is_err() {
                debug!("Warning collector closed, dropping warning");
            }
        };
        let accession = match accession_cell.and_then(parse_accession) {
            Some(accession) => accession,
            None => return EntryAnnotation::not_found(),
        };
        let sequence = match sequence_cell {
            Some(sequence) if self.patterns.sequence_is_annotated => parse_sequence(sequence),
            Some(sequence) => sequence.trim().to_uppercase(),
            None => return EntryAnnotation::not_found(),
        };

        let record = match self.source.fetch(&accession).await {
            Ok(record) => record,
            Err(err) => {
                debug!("Unable to fetch `{}`: {}", accession, err);
                send(Warning::new(WarningCategory::Retrieval, err.to_string()));
                return EntryAnnotation::not_found();
            }
        };

        let (annotation, entry_warnings) = Entry::new(&accession, &sequence, &record).annotate(
            modification,
            self.patterns,
            self.window_size,
            self.merops,
        );
        for warning in entry_warnings {
            send(warning);
        }
        if self.structure_models.has_model(&accession).await == Some(false) {
            send(Warning::new(WarningCategory::ModelNotAvailable, accession));
        }
        annotation
    }

    fn build_table(
        &self,
        accessions: &[Option<String>],
        annotations: Vec<EntryAnnotation>,
    ) -> Result<AnnotationTable, AnnotationError> {
        let height = annotations.len();
        let strings = |value: StringField| string_column_values(&annotations, value);
        let integers = |value: IntegerField| integer_column_values(&annotations, value);
        let certainty: Vec<Option<f64>> = accessions
            .iter()
            .map(|accession| {
                accession
                    .as_deref()
                    .map(count_accessions)
                    .filter(|count| *count > 0)
                    .map(|count| 100.0 / count as f64)
            })
            .collect();

        let mut columns = vec![
            Column::new(QUERY_SEQUENCE_COL.into(), strings(|a| a.query_sequence.as_deref())),
            Column::new(QUERY_ACCESSION_COL.into(), strings(|a| a.query_accession.as_deref())),
            Column::new(NAME_COL.into(), strings(|a| a.name.as_deref())),
            Column::new(FULL_SEQUENCE_COL.into(), strings(|a| a.full_sequence.as_deref())),
            Column::new(DESCRIPTION_COL.into(), strings(|a| a.description.as_deref())),
            Column::new(KEYWORDS_COL.into(), strings(|a| a.keywords.as_deref())),
            Column::new(GO_CODES_COL.into(), strings(|a| a.go_codes.as_deref())),
            Column::new(GO_NAMES_COL.into(), strings(|a| a.go_names.as_deref())),
            Column::new(PROTEOFORM_CERTAINTY_COL.into(), certainty),
            Column::new(ACCESSION_LENGTH_COL.into(), integers(|a| a.accession_length)),
            Column::new(START_PEPTIDE_COL.into(), integers(|a| a.start_pep)),
            Column::new(END_PEPTIDE_COL.into(), integers(|a| a.end_pep)),
            Column::new(P1_POSITION_COL.into(), integers(|a| a.p1_position)),
            Column::new(CLEAVAGE_SITE_COL.into(), strings(|a| a.cleavage_site.as_deref())),
            Column::new(
                cleavage_window_column(self.window_size).into(),
                strings(|a| a.cleavage_window.as_deref()),
            ),
            Column::new(NTERM_ANNOTATION_COL.into(), strings(|a| a.nterm_annotation.as_deref())),
            Column::new(NTERM_MODIFICATION_COL.into(), strings(|a| a.nterm_modification.as_deref())),
            Column::new(PROTEASE_UNIPROT_COL.into(), strings(|a| a.protease_uniprot.as_deref())),
        ];
        if self.include_merops {
            columns.push(Column::new(
                PROTEASE_MEROPS_CODE_COL.into(),
                strings(|a| a.protease_merops_code.as_deref()),
            ));
            columns.push(Column::new(
                PROTEASE_MEROPS_NAME_COL.into(),
                strings(|a| a.protease_merops_name.as_deref()),
            ));
        }

        let mut table = AnnotationTable::new(height, &[])?;
        for column in columns {
            table.append(column)?;
        }
        Ok(table)
    }
}
