//! Subsets the dataset to fixed clock-hour rows for charting.

use crate::dataset::error::DatasetError;
use crate::dataset::loader::{load_dataset, DATETIME_COLUMN, LEVEL_COLUMN};
use log::{error, warn};
use polars::prelude::*;
use std::path::Path;

/// Offset of the `HH:MM` substring inside a `YYYY-MM-DD HH:MM` timestamp.
const TIME_OF_DAY_OFFSET: i64 = 11;
const TIME_OF_DAY_LEN: i64 = 5;

/// Keeps only rows falling exactly on the `interval_hours` grid
/// (`00:00`, `interval:00`, ... below 24:00) and returns them with the
/// level column coerced to floats.
///
/// An empty result is the distinct [`DatasetError::NoDataForInterval`]
/// condition: the dataset has rows, just none on this grid, which callers
/// present differently from a missing dataset.
pub fn sample_at_interval(path: &Path, interval_hours: u32) -> Result<DataFrame, DatasetError> {
    if !(1..24).contains(&interval_hours) {
        return Err(DatasetError::InvalidInterval(interval_hours));
    }

    let df = load_dataset(path).map_err(|e| {
        error!("Cannot sample dataset: {e}");
        e
    })?;

    let grid: Vec<String> = (0..24)
        .step_by(interval_hours as usize)
        .map(|hour| format!("{hour:02}:00"))
        .collect();

    let sampled = df
        .lazy()
        .filter(
            col(DATETIME_COLUMN)
                .str()
                .slice(lit(TIME_OF_DAY_OFFSET), lit(TIME_OF_DAY_LEN))
                .is_in(lit(Series::new("grid".into(), grid))),
        )
        .collect()
        .map_err(|e| {
            error!("Sampling filter failed: {e}");
            DatasetError::Aggregation {
                operation: "interval sampling",
                source: e,
            }
        })?;

    if sampled.height() == 0 {
        warn!("No rows fall on the {interval_hours}-hour sampling grid");
        return Err(DatasetError::NoDataForInterval(interval_hours));
    }

    let patched = patch_first_value(sampled)?;
    patched
        .lazy()
        .with_columns([col(LEVEL_COLUMN).cast(DataType::Float64)])
        .collect()
        .map_err(|e| DatasetError::ColumnOperation {
            operation: "numeric coercion",
            source: e,
        })
}

/// Overwrites the first retained row's value with the second row's.
///
/// Some station response shapes bleed a qualifier sentinel (e.g. `14n`)
/// into the first row's value field. Copying the neighbouring reading is
/// the long-observed workaround; it is applied unconditionally and is a
/// known limitation for stations that do not exhibit the quirk.
fn patch_first_value(mut df: DataFrame) -> Result<DataFrame, DatasetError> {
    if df.height() < 2 {
        return Ok(df);
    }
    let values = df
        .column(LEVEL_COLUMN)
        .map_err(|e| DatasetError::ColumnNotFound(LEVEL_COLUMN.to_string(), e))?
        .str()
        .map_err(|e| DatasetError::ColumnOperation {
            operation: "reading values for the first-row patch",
            source: e,
        })?;
    let mut patched: Vec<Option<String>> = values
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    patched[0] = patched[1].clone();

    df.replace(LEVEL_COLUMN, Series::new(LEVEL_COLUMN.into(), patched))
        .map_err(|e| DatasetError::ColumnOperation {
            operation: "applying the first-row patch",
            source: e,
        })?;
    Ok(df)
}
