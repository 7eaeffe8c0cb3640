// std imports
use std::collections::HashMap;
use std::path::Path;

// 3rd party imports
use tracing::{debug, info};

// internal imports
use crate::errors::{annotation_error::AnnotationError, format_error::FormatError};
use crate::io::delimited_table::DelimitedTable;
use crate::table::peptide_table::PeptideTable;

/// Protease known to cleave at a position
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeropsProtease {
    pub code: String,
    pub name: Option<String>,
}

/// Known cleavages of the MEROPS database, keyed by accession and P1 position
///
#[derive(Debug, Clone, Default)]
pub struct MeropsDatabase {
    cleavages: HashMap<(String, usize), Vec<String>>,
    names: HashMap<String, String>,
}

impl MeropsDatabase {
    const CLEAVAGE_ACCESSION_COL: &'static str = "uniprot_acc";
    const CLEAVAGE_P1_COL: &'static str = "p1";
    const CODE_COL: &'static str = "code";
    const NAME_COL: &'static str = "name";
    const TYPE_COL: &'static str = "type";
    const REAL_TYPE: &'static str = "real";

    /// Creates a database from already parsed entries
    ///
    /// # Arguments
    /// * `cleavages` - Accession, 1-based P1 position and MEROPS code of each known cleavage
    /// * `names` - MEROPS code and protease name
    ///
    pub fn new(cleavages: Vec<(String, usize, String)>, names: Vec<(String, String)>) -> Self {
        let mut database = Self {
            cleavages: HashMap::new(),
            names: names.into_iter().collect(),
        };
        for (accession, p1, code) in cleavages {
            let codes = database.cleavages.entry((accession, p1)).or_default();
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        database
    }

    /// Reads the cleavage table (`uniprot_acc`, `p1`, `code`) and the name table
    /// (`code`, `name`, `type`), of which only the entries with type `real` are used
    ///
    /// # Arguments
    /// * `cleavage_path` - Path to the cleavage table
    /// * `name_path` - Path to the name table
    ///
    pub fn from_files(cleavage_path: &Path, name_path: &Path) -> Result<Self, AnnotationError> {
        info!("Reading MEROPS data...");
        let cleavage_table = PeptideTable::new(DelimitedTable::read(cleavage_path)?);
        let name_table = PeptideTable::new(DelimitedTable::read(name_path)?);
        for (table, column) in [
            (&cleavage_table, Self::CLEAVAGE_ACCESSION_COL),
            (&cleavage_table, Self::CLEAVAGE_P1_COL),
            (&cleavage_table, Self::CODE_COL),
            (&name_table, Self::CODE_COL),
            (&name_table, Self::NAME_COL),
            (&name_table, Self::TYPE_COL),
        ] {
            if !table.has_column(column) {
                return Err(FormatError::MissingColumn("MEROPS", column.to_string()).into());
            }
        }

        let cleavages: Vec<(String, usize, String)> = cleavage_table
            .str_values(Self::CLEAVAGE_ACCESSION_COL)?
            .into_iter()
            .zip(cleavage_table.str_values(Self::CLEAVAGE_P1_COL)?)
            .zip(cleavage_table.str_values(Self::CODE_COL)?)
            .filter_map(|((accession, p1), code)| {
                let p1 = p1?.trim().parse::<usize>().ok()?;
                Some((accession?.trim().to_string(), p1, code?.trim().to_string()))
            })
            .collect();
        let names: Vec<(String, String)> = name_table
            .str_values(Self::CODE_COL)?
            .into_iter()
            .zip(name_table.str_values(Self::NAME_COL)?)
            .zip(name_table.str_values(Self::TYPE_COL)?)
            .filter_map(|((code, name), protease_type)| {
                if protease_type?.trim() != Self::REAL_TYPE {
                    return None;
                }
                Some((code?.trim().to_string(), name?.trim().to_string()))
            })
            .collect();
        debug!(
            "Read {} MEROPS cleavages and {} protease names",
            cleavages.len(),
            names.len()
        );
        info!("Read MEROPS data");
        Ok(Self::new(cleavages, names))
    }

    /// Name of the protease with the given MEROPS code
    ///
    pub fn name(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(|name| name.as_str())
    }

    /// Proteases known to cleave the protein after the P1 position
    ///
    /// # Arguments
    /// * `accession` - Protein accession
    /// * `p1` - 1-based P1 position
    ///
    pub fn proteases(&self, accession: &str, p1: usize) -> Vec<MeropsProtease> {
        self.cleavages
            .get(&(accession.to_string(), p1))
            .map(|codes| {
                codes
                    .iter()
                    .map(|code| MeropsProtease {
                        code: code.clone(),
                        name: self.names.get(code).cloned(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs::write as write_file;

    #[test]
    fn test_from_files() {
        let cleavage_path = env::temp_dir().join("clipper_test_merops_cleavages.csv");
        let name_path = env::temp_dir().join("clipper_test_merops_names.csv");
        write_file(
            &cleavage_path,
            "uniprot_acc,p1,code\nP12345,10,S01.001\nP12345,10,S01.001\nP12345,10,C14.003\nQ67890,x,S01.001\n",
        )
        .unwrap();
        write_file(
            &name_path,
            "code,name,type\nS01.001,chymotrypsin A,real\nC14.003,caspase-3,real\nC14.003,CASP3,synonym\n",
        )
        .unwrap();
        let database = MeropsDatabase::from_files(&cleavage_path, &name_path).unwrap();
        assert_eq!(
            database.proteases("P12345", 10),
            vec![
                MeropsProtease {
                    code: "S01.001".to_string(),
                    name: Some("chymotrypsin A".to_string())
                },
                MeropsProtease {
                    code: "C14.003".to_string(),
                    name: Some("caspase-3".to_string())
                },
            ]
        );
        assert!(database.proteases("P12345", 11).is_empty());
        assert!(database.proteases("Q67890", 10).is_empty());
        assert_eq!(database.name("C14.003"), Some("caspase-3"));
        assert_eq!(database.name("M10.001"), None);
    }
}
