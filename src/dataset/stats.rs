//! Read-only aggregates over the persisted dataset.

use crate::dataset::error::DatasetError;
use crate::dataset::loader::{load_dataset, DATETIME_COLUMN, LEVEL_COLUMN};
use crate::download::normalize::TIMESTAMP_FORMAT;
use log::error;
use polars::prelude::*;
use std::fmt;
use std::path::Path;

const MONTH_COLUMN: &str = "month";

/// Whole-dataset summary of the level column.
///
/// Fields are `None` when no numeric observation survived coercion
/// (non-numeric entries become missing rather than failing the column).
/// The standard deviation is the sample standard deviation, matching what
/// the station dashboards historically displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

fn feet(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2} feet"),
        None => "n/a".to_string(),
    }
}

impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mean:   {}", feet(self.mean))?;
        writeln!(f, "median: {}", feet(self.median))?;
        writeln!(f, "std:    {}", feet(self.std_dev))?;
        writeln!(f, "min:    {}", feet(self.min))?;
        write!(f, "max:    {}", feet(self.max))
    }
}

/// Per-calendar-month aggregate of the level column.
///
/// Months are bucketed by number (1-12) regardless of year, so a dataset
/// spanning several years folds same-named months together. Months with
/// no observations are absent rather than zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyLevelStats {
    pub month: u32,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

fn stat_at(df: &DataFrame, name: &str, idx: usize) -> Result<Option<f64>, DatasetError> {
    Ok(df
        .column(name)
        .map_err(|e| DatasetError::ColumnNotFound(name.to_string(), e))?
        .f64()
        .map_err(|e| DatasetError::ColumnOperation {
            operation: "extracting a statistic",
            source: e,
        })?
        .get(idx))
}

/// Computes mean/median/std/min/max of the level column.
pub fn summary_stats(path: &Path) -> Result<SummaryStats, DatasetError> {
    let df = load_dataset(path).map_err(|e| {
        error!("Cannot compute summary statistics: {e}");
        e
    })?;

    let stats = df
        .lazy()
        .with_columns([col(LEVEL_COLUMN).cast(DataType::Float64)])
        .select([
            col(LEVEL_COLUMN).mean().alias("mean"),
            col(LEVEL_COLUMN).median().alias("median"),
            col(LEVEL_COLUMN).std(1).alias("std"),
            col(LEVEL_COLUMN).min().alias("min"),
            col(LEVEL_COLUMN).max().alias("max"),
        ])
        .collect()
        .map_err(|e| {
            error!("Summary aggregation failed: {e}");
            DatasetError::Aggregation {
                operation: "summary statistics",
                source: e,
            }
        })?;

    Ok(SummaryStats {
        mean: stat_at(&stats, "mean", 0)?,
        median: stat_at(&stats, "median", 0)?,
        std_dev: stat_at(&stats, "std", 0)?,
        min: stat_at(&stats, "min", 0)?,
        max: stat_at(&stats, "max", 0)?,
    })
}

/// Computes per-calendar-month mean/min/max of the level column, ordered
/// by month number.
pub fn monthly_stats(path: &Path) -> Result<Vec<MonthlyLevelStats>, DatasetError> {
    let df = load_dataset(path).map_err(|e| {
        error!("Cannot compute monthly statistics: {e}");
        e
    })?;

    let frame = df
        .lazy()
        .select([
            col(DATETIME_COLUMN)
                .str()
                .to_datetime(
                    Some(TimeUnit::Milliseconds),
                    None,
                    StrptimeOptions {
                        format: Some(TIMESTAMP_FORMAT.into()),
                        strict: false,
                        exact: true,
                        cache: true,
                    },
                    lit("raise"),
                )
                .dt()
                .month()
                .cast(DataType::Int32)
                .alias(MONTH_COLUMN),
            col(LEVEL_COLUMN).cast(DataType::Float64),
        ])
        // Rows whose timestamp did not parse carry no month to bucket by.
        .filter(col(MONTH_COLUMN).is_not_null())
        .group_by([col(MONTH_COLUMN)])
        .agg([
            col(LEVEL_COLUMN).mean().alias("mean"),
            col(LEVEL_COLUMN).min().alias("min"),
            col(LEVEL_COLUMN).max().alias("max"),
        ])
        .sort([MONTH_COLUMN], Default::default())
        .collect()
        .map_err(|e| {
            error!("Monthly aggregation failed: {e}");
            DatasetError::Aggregation {
                operation: "monthly statistics",
                source: e,
            }
        })?;

    let months = frame
        .column(MONTH_COLUMN)
        .map_err(|e| DatasetError::ColumnNotFound(MONTH_COLUMN.to_string(), e))?
        .i32()
        .map_err(|e| DatasetError::ColumnOperation {
            operation: "extracting month numbers",
            source: e,
        })?;

    let mut result = Vec::with_capacity(frame.height());
    for idx in 0..frame.height() {
        let month = match months.get(idx) {
            Some(m) => m as u32,
            None => continue,
        };
        result.push(MonthlyLevelStats {
            month,
            mean: stat_at(&frame, "mean", idx)?,
            min: stat_at(&frame, "min", idx)?,
            max: stat_at(&frame, "max", idx)?,
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::loader::test_support::{row, write_dataset};

    #[test]
    fn constant_values_give_flat_summary() {
        let dir = tempfile::tempdir().unwrap();
        let rows: Vec<String> = (0..10)
            .map(|h| row(&format!("2026-03-01 {h:02}:00"), "5.00"))
            .collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let path = write_dataset(&dir, &refs);

        let stats = summary_stats(&path).unwrap();
        assert_eq!(stats.mean, Some(5.0));
        assert_eq!(stats.median, Some(5.0));
        assert_eq!(stats.std_dev, Some(0.0));
        assert_eq!(stats.min, Some(5.0));
        assert_eq!(stats.max, Some(5.0));
    }

    #[test]
    fn summary_formats_to_two_decimals_with_unit() {
        let stats = SummaryStats {
            mean: Some(5.126),
            median: Some(5.0),
            std_dev: Some(0.0),
            min: Some(4.0),
            max: None,
        };
        let rendered = stats.to_string();
        assert!(rendered.contains("mean:   5.13 feet"));
        assert!(rendered.contains("max:    n/a"));
    }

    #[test]
    fn non_numeric_values_become_missing() {
        let dir = tempfile::tempdir().unwrap();
        let r1 = row("2026-03-01 00:00", "14n");
        let r2 = row("2026-03-01 01:00", "4.00");
        let r3 = row("2026-03-01 02:00", "6.00");
        let path = write_dataset(&dir, &[&r1, &r2, &r3]);

        let stats = summary_stats(&path).unwrap();
        assert_eq!(stats.mean, Some(5.0));
        assert_eq!(stats.min, Some(4.0));
        assert_eq!(stats.max, Some(6.0));
    }

    #[test]
    fn two_calendar_months_give_two_buckets() {
        let dir = tempfile::tempdir().unwrap();
        let r1 = row("2026-02-10 00:00", "3.0");
        let r2 = row("2026-02-20 00:00", "5.0");
        let r3 = row("2026-03-01 00:00", "7.0");
        let r4 = row("2026-03-02 00:00", "4.0");
        let path = write_dataset(&dir, &[&r1, &r2, &r3, &r4]);

        let months = monthly_stats(&path).unwrap();
        assert_eq!(months.len(), 2);

        assert_eq!(months[0].month, 2);
        assert_eq!(months[0].min, Some(3.0));
        assert_eq!(months[0].max, Some(5.0));
        assert_eq!(months[0].mean, Some(4.0));

        assert_eq!(months[1].month, 3);
        assert_eq!(months[1].min, Some(4.0));
        assert_eq!(months[1].max, Some(7.0));
        assert_eq!(months[1].mean, Some(5.5));
    }

    #[test]
    fn months_collapse_across_years() {
        let dir = tempfile::tempdir().unwrap();
        let r1 = row("2025-06-01 00:00", "2.0");
        let r2 = row("2026-06-01 00:00", "4.0");
        let path = write_dataset(&dir, &[&r1, &r2]);

        let months = monthly_stats(&path).unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].month, 6);
        assert_eq!(months[0].mean, Some(3.0));
    }

    #[test]
    fn narrow_dataset_is_reported_as_shape_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("river_level_data.rdb");
        std::fs::write(&path, "datetime\tlevel\n2026-03-01 00:00\t5.0\n").unwrap();

        assert!(matches!(
            summary_stats(&path).unwrap_err(),
            DatasetError::TooFewColumns { .. }
        ));
        assert!(matches!(
            monthly_stats(&path).unwrap_err(),
            DatasetError::TooFewColumns { .. }
        ));
    }
}
