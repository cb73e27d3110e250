//! Shared read path for the persisted dataset file.
//!
//! Every column is loaded as a string: site and agency codes keep their
//! leading zeros, and the occasional qualifier sentinel in the value
//! column ends up as a null only where a caller explicitly coerces to
//! numbers.

use crate::dataset::error::DatasetError;
use polars::prelude::*;
use std::path::Path;

/// Semantic name given to the 5th column (the observed value).
pub(crate) const LEVEL_COLUMN: &str = "level";

/// Name of the timestamp column as written by the upstream service.
pub(crate) const DATETIME_COLUMN: &str = "datetime";

pub(crate) const VALUE_COLUMN_INDEX: usize = 4;

pub(crate) const MIN_COLUMNS: usize = 5;

/// Reads the raw dataset: tab-delimited, `#`-comments skipped, first
/// non-comment line as header, all columns typed as strings.
pub(crate) fn read_raw(path: &Path) -> PolarsResult<DataFrame> {
    let parse_options = CsvParseOptions::default()
        .with_separator(b'\t')
        .with_comment_prefix(Some("#"));
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

/// Loads the dataset for analysis: raw read, column-count check, 5th
/// column renamed to [`LEVEL_COLUMN`].
pub(crate) fn load_dataset(path: &Path) -> Result<DataFrame, DatasetError> {
    let mut df =
        read_raw(path).map_err(|e| DatasetError::FileRead(path.to_path_buf(), e))?;

    if df.width() < MIN_COLUMNS {
        return Err(DatasetError::TooFewColumns {
            found: df.width(),
            expected: MIN_COLUMNS,
        });
    }

    let value_column = df.get_column_names()[VALUE_COLUMN_INDEX].to_string();
    df.rename(&value_column, LEVEL_COLUMN.into())
        .map_err(|e| DatasetError::ColumnRename {
            column: value_column.clone(),
            source: e,
        })?;

    // `rename` swaps the column's name in place but leaves the DataFrame's
    // cached schema (populated by the CSV reader) pointing at the old name,
    // so a later `.lazy()` resolves against the stale schema and fails to
    // find `level`. Rebuilding from the columns refreshes the schema.
    let df = DataFrame::new(df.get_columns().to_vec()).map_err(|e| DatasetError::ColumnRename {
        column: value_column.clone(),
        source: e,
    })?;
    Ok(df)
}


#[cfg(test)]
mod tests {
    use super::test_support::{row, write_dataset};
    use super::*;

    #[test]
    fn loads_with_level_rename_and_string_types() {
        let dir = tempfile::tempdir().unwrap();
        let rows = [row("2026-03-01 00:00", "5.12"), row("2026-03-01 01:00", "5.15")];
        let path = write_dataset(&dir, &[&rows[0], &rows[1]]);

        let df = load_dataset(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert!(df.get_column_names().iter().any(|c| c.as_str() == LEVEL_COLUMN));
        // Leading zeros survive because nothing is parsed as a number.
        let site = df.column("site_no").unwrap().str().unwrap().get(0).unwrap();
        assert_eq!(site, "04119070");
    }

    #[test]
    fn narrow_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("river_level_data.rdb");
        std::fs::write(&path, "a\tb\tc\n1\t2\t3\n").unwrap();

        let err = load_dataset(&path).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::TooFewColumns { found: 3, expected: 5 }
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.rdb");
        assert!(matches!(
            load_dataset(&path).unwrap_err(),
            DatasetError::FileRead(..)
        ));
    }
}
