// 3rd party imports
use polars::prelude::*;
use tracing::{debug, warn};

// internal imports
use crate::errors::table_error::TableError;
use crate::table::peptide_table::PeptideTable;

/// Parses a quantification cell. Decimal commas are replaced by points.
/// Returns `Ok(None)` for empty cells and `Err(())` for values which are no float.
///
fn parse_quantification_value(value: &str) -> Result<Option<f64>, ()> {
    let value = value.trim().replace(',', ".");
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_nan() => Ok(None),
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(()),
    }
}

/// Converts the given quantification columns to floats in place.
/// Values which can not be parsed become missing and are reported with a warning,
/// the row itself is kept.
///
/// # Arguments
/// * `table` - Peptide table
/// * `columns` - Names of the quantification columns
/// * `fillna` - Optional value for missing values
///
pub fn coerce_quantification_columns(
    table: &mut PeptideTable,
    columns: &[String],
    fillna: Option<f64>,
) -> Result<(), TableError> {
    for name in columns {
        let mut unparsable: Vec<String> = Vec::new();
        let values: Vec<Option<f64>> = table
            .str_values(name)?
            .into_iter()
            .map(|value| {
                let parsed = match value {
                    Some(value) => parse_quantification_value(&value).unwrap_or_else(|_| {
                        unparsable.push(value);
                        None
                    }),
                    None => None,
                };
                parsed.or(fillna)
            })
            .collect();
        if let Some(first) = unparsable.first() {
            warn!(
                "{} values of quantification column `{}` are no numbers, e.g. `{}`. They are treated as missing.",
                unparsable.len(),
                name,
                first
            );
        }
        debug!("Converted quantification column `{}`", name);
        table.replace_column(Column::new(name.as_str().into(), values))?;
    }
    Ok(())
}
