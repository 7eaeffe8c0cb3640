// std imports
use std::collections::HashSet;
use std::path::PathBuf;

// 3rd party imports
use fancy_regex::Regex;
use lazy_static::lazy_static;
use tokio::sync::OnceCell;
use tracing::{info, warn};

lazy_static! {
    /// Accession within a model file name, e.g. `AF-P12345-F1-model_v4.pdb`
    ///
    static ref MODEL_FILE_REGEX: Regex = Regex::new(r"^AF-([A-Z0-9]+)-F\d+").unwrap();
}

/// Index of the accessions with an available structural model.
/// The index file is read once, on the first lookup.
///
pub struct StructureModelIndex {
    path: Option<PathBuf>,
    accessions: OnceCell<Option<HashSet<String>>>,
}

impl StructureModelIndex {
    /// Creates a new index which is loaded lazily
    ///
    /// # Arguments
    /// * `path` - File with one accession or model file name per line, `None` disables the lookup
    ///
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            accessions: OnceCell::new(),
        }
    }

    /// Creates an already loaded index
    ///
    /// # Arguments
    /// * `accessions` - Accessions with a structural model
    ///
    pub fn from_accessions<I: IntoIterator<Item = String>>(accessions: I) -> Self {
        Self {
            path: None,
            accessions: OnceCell::new_with(Some(Some(accessions.into_iter().collect()))),
        }
    }

    fn parse_line(line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match MODEL_FILE_REGEX.captures(line) {
            Ok(Some(captures)) => captures.get(1).map(|accession| accession.as_str().to_string()),
            _ => Some(line.to_string()),
        }
    }

    async fn load(&self) -> Option<HashSet<String>> {
        let path = self.path.as_ref()?;
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let accessions: HashSet<String> =
                    content.lines().filter_map(Self::parse_line).collect();
                info!("Read {} accessions with structural models", accessions.len());
                Some(accessions)
            }
            Err(err) => {
                warn!(
                    "Unable to read structural model index `{}`, skipping the model lookup: {}",
                    path.display(),
                    err
                );
                None
            }
        }
    }

    /// Checks if a structural model exists for the accession.
    /// Returns `None` if no index is available.
    ///
    /// # Arguments
    /// * `accession` - Protein accession
    ///
    pub async fn has_model(&self, accession: &str) -> Option<bool> {
        self.accessions
            .get_or_init(|| self.load())
            .await
            .as_ref()
            .map(|accessions| accessions.contains(accession))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs::write as write_file;

    #[tokio::test]
    async fn test_lazy_index() {
        let path = env::temp_dir().join("clipper_test_structure_models.txt");
        write_file(&path, "AF-P12345-F1-model_v4.pdb\nQ67890\n\n").unwrap();
        let index = StructureModelIndex::new(Some(path));
        assert_eq!(index.has_model("P12345").await, Some(true));
        assert_eq!(index.has_model("Q67890").await, Some(true));
        assert_eq!(index.has_model("O11111").await, Some(false));
    }

    #[tokio::test]
    async fn test_disabled_and_missing_index() {
        assert_eq!(StructureModelIndex::new(None).has_model("P12345").await, None);
        let missing = StructureModelIndex::new(Some(PathBuf::from("/nonexistent/models.txt")));
        assert_eq!(missing.has_model("P12345").await, None);
        let loaded = StructureModelIndex::from_accessions(vec!["P12345".to_string()]);
        assert_eq!(loaded.has_model("P12345").await, Some(true));
    }
}
