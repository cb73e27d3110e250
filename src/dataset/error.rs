use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset file '{0}'")]
    FileRead(PathBuf, #[source] PolarsError),

    #[error("Dataset has too few columns ({found}, expected at least {expected})")]
    TooFewColumns { found: usize, expected: usize },

    #[error("Failed to rename value column '{column}'")]
    ColumnRename {
        column: String,
        #[source]
        source: PolarsError,
    },

    #[error("Required column '{0}' not found in dataset")]
    ColumnNotFound(String, #[source] PolarsError),

    #[error("Failed computing {operation} over the dataset")]
    Aggregation {
        operation: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("Failed {operation} on the level column")]
    ColumnOperation {
        operation: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("Sampling interval must be between 1 and 23 hours, got {0}")]
    InvalidInterval(u32),

    #[error("No data available for the {0}-hour sampling interval")]
    NoDataForInterval(u32),

    #[error("Failed to create export file '{0}'")]
    ExportCreate(PathBuf, #[source] std::io::Error),

    #[error("Failed to write export file '{0}'")]
    ExportWrite(PathBuf, #[source] PolarsError),
}
