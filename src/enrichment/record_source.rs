// std imports
use std::collections::HashMap;
use std::future::Future;

// internal imports
use super::protein_record::ProteinRecord;
use crate::errors::record_error::RecordError;

/// Source of protein records, queried by accession
///
pub trait RecordSource: Send + Sync {
    /// Fetches the record for the accession
    ///
    /// # Arguments
    /// * `accession` - Protein accession
    ///
    fn fetch(
        &self,
        accession: &str,
    ) -> impl Future<Output = Result<ProteinRecord, RecordError>> + Send;
}

/// Record source backed by a map of records
///
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordSource {
    records: HashMap<String, ProteinRecord>,
}

impl InMemoryRecordSource {
    /// Creates a new source keyed by the primary accessions of the records
    ///
    /// # Arguments
    /// * `records` - Protein records
    ///
    pub fn new(records: Vec<ProteinRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.primary_accession.clone(), record))
                .collect(),
        }
    }
}

impl RecordSource for InMemoryRecordSource {
    async fn fetch(&self, accession: &str) -> Result<ProteinRecord, RecordError> {
        self.records
            .get(accession)
            .cloned()
            .ok_or_else(|| RecordError::NotFound(accession.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_source() {
        let source = InMemoryRecordSource::new(vec![ProteinRecord::new("P12345", "Test", "MAGIC")]);
        assert_eq!(
            source.fetch("P12345").await.unwrap().sequence(),
            Some("MAGIC")
        );
        assert!(matches!(
            source.fetch("Q67890").await,
            Err(RecordError::NotFound(_))
        ));
    }
}
