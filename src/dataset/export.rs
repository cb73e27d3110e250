//! On-demand export of the dataset to a comma-delimited file.

use crate::dataset::error::DatasetError;
use crate::dataset::loader::read_raw;
use log::info;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Writes the dataset (comments dropped, original column names kept) as
/// CSV to `dest` and returns the number of data rows written.
///
/// Values are written exactly as stored, so site numbers keep their
/// leading zeros and a re-read yields the same rows.
pub fn export_csv(dataset_path: &Path, dest: &Path) -> Result<usize, DatasetError> {
    let mut df = read_raw(dataset_path)
        .map_err(|e| DatasetError::FileRead(dataset_path.to_path_buf(), e))?;

    let mut file =
        File::create(dest).map_err(|e| DatasetError::ExportCreate(dest.to_path_buf(), e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)
        .map_err(|e| DatasetError::ExportWrite(dest.to_path_buf(), e))?;

    info!(
        "Exported {} rows to '{}'",
        df.height(),
        dest.display()
    );
    Ok(df.height())
}
