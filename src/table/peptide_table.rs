// 3rd party imports
use fancy_regex::Regex;
use polars::prelude::*;

// internal imports
use crate::errors::table_error::TableError;
use crate::functions::is_match;

/// Table of detected peptides as delivered by the upstream quantification software.
/// Every column is a string column until the quantification columns are coerced to floats.
///
#[derive(Debug, Clone)]
pub struct PeptideTable {
    df: DataFrame,
}

impl PeptideTable {
    /// Creates a new peptide table
    ///
    /// # Arguments
    /// * `df` - Dataframe with one row per peptide
    ///
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    /// Creates a peptide table from string columns, mostly useful for tests and converters
    ///
    /// # Arguments
    /// * `columns` - Column name and values
    ///
    pub fn from_string_columns(columns: Vec<(&str, Vec<Option<&str>>)>) -> Result<Self, TableError> {
        let columns = columns
            .into_iter()
            .map(|(name, values)| Column::new(name.into(), values))
            .collect::<Vec<Column>>();
        let df = DataFrame::new(columns)
            .map_err(|err| TableError::PolarsError("creating peptide table", err))?;
        Ok(Self { df })
    }

    /// Returns the number of peptides
    ///
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Returns the column names in order
    ///
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect()
    }

    /// Checks if a column with the given name exists
    ///
    /// # Arguments
    /// * `name` - Column name
    ///
    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_index(name).is_some()
    }

    /// Returns the names of all columns matching the given regex
    ///
    /// # Arguments
    /// * `regex` - Regex searched in each column name
    ///
    pub fn columns_matching(&self, regex: &Regex) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|name| is_match(regex, name))
            .collect()
    }

    /// Returns the values of a column as strings. Non-string columns are casted.
    ///
    /// # Arguments
    /// * `name` - Column name
    ///
    pub fn str_values(&self, name: &str) -> Result<Vec<Option<String>>, TableError> {
        let column = self
            .df
            .column(name)
            .map_err(|_| TableError::MissingColumn(name.to_string()))?
            .cast(&DataType::String)
            .map_err(|err| TableError::PolarsError("casting column to string", err))?;
        let values = column
            .as_materialized_series()
            .str()
            .map_err(|err| TableError::PolarsError("reading string column", err))?
            .into_iter()
            .map(|value| value.map(|value| value.to_string()))
            .collect();
        Ok(values)
    }

    /// Returns the values of a column as floats. Non-float columns are casted,
    /// values which are not castable become `None`.
    ///
    /// # Arguments
    /// * `name` - Column name
    ///
    pub fn f64_values(&self, name: &str) -> Result<Vec<Option<f64>>, TableError> {
        let column = self
            .df
            .column(name)
            .map_err(|_| TableError::MissingColumn(name.to_string()))?
            .cast(&DataType::Float64)
            .map_err(|err| TableError::PolarsError("casting column to float", err))?;
        let values = column
            .as_materialized_series()
            .f64()
            .map_err(|err| TableError::PolarsError("reading float column", err))?
            .into_iter()
            .collect();
        Ok(values)
    }

    /// Replaces the column with the same name
    ///
    /// # Arguments
    /// * `column` - New column
    ///
    pub fn replace_column(&mut self, column: Column) -> Result<(), TableError> {
        if !self.has_column(column.name().as_str()) {
            return Err(TableError::MissingColumn(column.name().to_string()));
        }
        self.df
            .with_column(column)
            .map_err(|err| TableError::PolarsError("replacing column", err))?;
        Ok(())
    }

    /// Keeps only the rows where the mask is true. Rows are re-indexed densely.
    ///
    /// # Arguments
    /// * `mask` - One entry per row
    ///
    pub fn retain(&mut self, mask: &[bool]) -> Result<(), TableError> {
        if mask.len() != self.height() {
            return Err(TableError::HeightMismatch(
                "mask".to_string(),
                mask.len(),
                self.height(),
            ));
        }
        let mask = BooleanChunked::from_slice("mask".into(), mask);
        self.df = self
            .df
            .filter(&mask)
            .map_err(|err| TableError::PolarsError("filtering rows", err))?;
        Ok(())
    }

    /// Removes the first `n` rows
    ///
    /// # Arguments
    /// * `n` - Number of rows to remove
    ///
    pub fn drop_head(&mut self, n: usize) {
        let remaining = self.height().saturating_sub(n);
        self.df = self.df.slice(n as i64, remaining);
    }

    /// Returns the inner dataframe
    ///
    pub fn data_frame(&self) -> &DataFrame {
        &self.df
    }

    /// Consumes the table and returns the inner dataframe
    ///
    pub fn into_data_frame(self) -> DataFrame {
        self.df
    }
}
