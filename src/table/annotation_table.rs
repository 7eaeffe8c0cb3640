// 3rd party imports
use polars::prelude::*;

// internal imports
use crate::errors::table_error::TableError;

/// Append-only column store with one row per retained peptide.
///
/// Row `i` always belongs to peptide `i` of the sanitized peptide table. The height is fixed
/// on creation, columns can only be set, appended or inserted after an existing column.
///
#[derive(Debug, Clone)]
pub struct AnnotationTable {
    height: usize,
    df: DataFrame,
}

impl AnnotationTable {
    /// Creates a new table where every given column is allocated empty (all null)
    ///
    /// # Arguments
    /// * `height` - Number of rows
    /// * `column_names` - Names of the empty string columns
    ///
    pub fn new(height: usize, column_names: &[String]) -> Result<Self, TableError> {
        let mut table = Self {
            height,
            df: DataFrame::empty(),
        };
        for name in column_names {
            table.append(Series::full_null(name.as_str().into(), height, &DataType::String).into_column())?;
        }
        Ok(table)
    }

    /// Returns the number of rows
    ///
    pub fn height(&self) -> usize {
        self.height
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

    /// Returns the position of the column
    ///
    /// # Arguments
    /// * `name` - Column name
    ///
    pub fn position(&self, name: &str) -> Option<usize> {
        self.df.get_column_index(name)
    }

    fn check_height(&self, column: &Column) -> Result<(), TableError> {
        if column.len() != self.height {
            return Err(TableError::HeightMismatch(
                column.name().to_string(),
                column.len(),
                self.height,
            ));
        }
        Ok(())
    }

    fn check_new(&self, column: &Column) -> Result<(), TableError> {
        self.check_height(column)?;
        if self.has_column(column.name().as_str()) {
            return Err(TableError::DuplicateColumn(column.name().to_string()));
        }
        Ok(())
    }

    /// Appends a new column at the end
    ///
    /// # Arguments
    /// * `column` - New column
    ///
    pub fn append(&mut self, column: Column) -> Result<(), TableError> {
        self.check_new(&column)?;
        self.df
            .with_column(column)
            .map_err(|err| TableError::PolarsError("appending column", err))?;
        Ok(())
    }

    /// Inserts a new column directly after the anchor column
    ///
    /// # Arguments
    /// * `anchor` - Name of the column after which the new column is inserted
    /// * `column` - New column
    ///
    pub fn insert_after(&mut self, anchor: &str, column: Column) -> Result<(), TableError> {
        self.check_new(&column)?;
        let position = self
            .position(anchor)
            .ok_or_else(|| TableError::MissingAnchor(anchor.to_string()))?;
        self.df
            .insert_column(position + 1, column)
            .map_err(|err| TableError::PolarsError("inserting column", err))?;
        Ok(())
    }

    /// Sets the values of an existing column or appends it if it does not exist yet.
    /// The position of an existing column is kept.
    ///
    /// # Arguments
    /// * `column` - Column
    ///
    pub fn set(&mut self, column: Column) -> Result<(), TableError> {
        self.check_height(&column)?;
        self.df
            .with_column(column)
            .map_err(|err| TableError::PolarsError("setting column", err))?;
        Ok(())
    }

    /// Returns the values of a column as floats
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

    /// Returns the values of a column as strings
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

    /// Consumes the table and returns the inner dataframe
    ///
    pub fn into_data_frame(self) -> DataFrame {
        self.df
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AnnotationTable {
        AnnotationTable::new(3, &["name".to_string(), "p1_position".to_string()]).unwrap()
    }

    #[test]
    fn test_new_is_all_null() {
        let table = table();
        assert_eq!(table.height(), 3);
        assert_eq!(table.column_names(), vec!["name", "p1_position"]);
        assert_eq!(table.str_values("name").unwrap(), vec![None, None, None]);
    }

    #[test]
    fn test_insert_after() {
        let mut table = table();
        table
            .append(Column::new("p-value".into(), vec![0.1, 0.2, 0.3]))
            .unwrap();
        table
            .insert_after("name", Column::new("between".into(), vec![1.0, 2.0, 3.0]))
            .unwrap();
        assert_eq!(
            table.column_names(),
            vec!["name", "between", "p1_position", "p-value"]
        );
    }

    #[test]
    fn test_rejects_wrong_height_and_duplicates() {
        let mut table = table();
        assert!(matches!(
            table.append(Column::new("short".into(), vec![1.0])),
            Err(TableError::HeightMismatch(_, 1, 3))
        ));
        assert!(matches!(
            table.append(Column::new("name".into(), vec![1.0, 2.0, 3.0])),
            Err(TableError::DuplicateColumn(_))
        ));
        assert!(matches!(
            table.insert_after("missing", Column::new("x".into(), vec![1.0, 2.0, 3.0])),
            Err(TableError::MissingAnchor(_))
        ));
    }

    #[test]
    fn test_set_keeps_position() {
        let mut table = table();
        table
            .set(Column::new("name".into(), vec!["a", "b", "c"]))
            .unwrap();
        assert_eq!(table.column_names(), vec!["name", "p1_position"]);
        assert_eq!(
            table.str_values("name").unwrap(),
            vec![
                Some("a".to_string()),
                Some("b".to_string()),
                Some("c".to_string())
            ]
        );
    }
}
