//! The station catalog: the read-only list of monitoring stations a user
//! can pick from, and the maintenance path that rebuilds it from a raw
//! WaterWatch export.

use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default marker a station name must carry to survive a catalog refresh;
/// the raw export mixes in out-of-state sites.
pub const DEFAULT_STATE_MARKER: &str = "MI";

/// One catalog entry. The id stays a string to preserve leading zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to open station catalog '{0}'")]
    Open(PathBuf, #[source] csv::Error),

    #[error("Failed to parse station catalog '{0}'")]
    Parse(PathBuf, #[source] csv::Error),

    #[error("Station catalog '{0}' is missing the '{1}' column")]
    MissingColumn(PathBuf, &'static str),

    #[error("Station catalog '{0}' contains no stations")]
    Empty(PathBuf),

    #[error("Failed to write station catalog '{0}'")]
    Write(PathBuf, #[source] csv::Error),

    #[error("Failed to flush station catalog '{0}'")]
    Flush(PathBuf, #[source] std::io::Error),
}

fn check_columns(
    reader: &mut csv::Reader<std::fs::File>,
    path: &Path,
) -> Result<(), CatalogError> {
    let headers = reader
        .headers()
        .map_err(|e| CatalogError::Parse(path.to_path_buf(), e))?;
    for required in ["name", "id"] {
        if !headers.iter().any(|h| h == required) {
            return Err(CatalogError::MissingColumn(path.to_path_buf(), required));
        }
    }
    Ok(())
}

/// Loads the `name,id` catalog file.
pub fn load_catalog(path: &Path) -> Result<Vec<Station>, CatalogError> {
    let mut reader =
        csv::Reader::from_path(path).map_err(|e| CatalogError::Open(path.to_path_buf(), e))?;
    check_columns(&mut reader, path)?;

    let mut stations = Vec::new();
    for record in reader.deserialize() {
        let station: Station = record.map_err(|e| CatalogError::Parse(path.to_path_buf(), e))?;
        stations.push(station);
    }
    if stations.is_empty() {
        return Err(CatalogError::Empty(path.to_path_buf()));
    }
    Ok(stations)
}

/// Case-insensitive substring filter on station name, verbatim on id.
/// An empty query returns everything.
pub fn search<'a>(stations: &'a [Station], query: &str) -> Vec<&'a Station> {
    if query.is_empty() {
        return stations.iter().collect();
    }
    let needle = query.to_lowercase();
    stations
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&needle) || s.id.contains(query))
        .collect()
}

/// Counts from a catalog refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Rebuilds the catalog from a raw WaterWatch station export.
///
/// Rows with a non-numeric id, or whose name lacks `state_marker`, are
/// skipped with a warning. The output always gets a `name,id` header,
/// even when every row is skipped.
pub fn refresh_catalog(
    input: &Path,
    output: &Path,
    state_marker: &str,
) -> Result<RefreshSummary, CatalogError> {
    let mut reader =
        csv::Reader::from_path(input).map_err(|e| CatalogError::Open(input.to_path_buf(), e))?;
    check_columns(&mut reader, input)?;

    let mut writer = csv::Writer::from_path(output)
        .map_err(|e| CatalogError::Open(output.to_path_buf(), e))?;
    writer
        .write_record(["name", "id"])
        .map_err(|e| CatalogError::Write(output.to_path_buf(), e))?;

    let mut summary = RefreshSummary {
        written: 0,
        skipped: 0,
    };
    for (row, record) in reader.deserialize().enumerate() {
        let station: Station = record.map_err(|e| CatalogError::Parse(input.to_path_buf(), e))?;
        let name = station.name.trim();
        let id = station.id.trim();

        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            warn!("Row {}: station id '{}' is not numeric, skipping", row + 1, id);
            summary.skipped += 1;
            continue;
        }
        if !name.contains(state_marker) {
            warn!(
                "Row {}: station name '{}' lacks the '{}' marker, skipping",
                row + 1,
                name,
                state_marker
            );
            summary.skipped += 1;
            continue;
        }

        writer
            .write_record([name, id])
            .map_err(|e| CatalogError::Write(output.to_path_buf(), e))?;
        summary.written += 1;
    }

    writer
        .flush()
        .map_err(|e| CatalogError::Flush(output.to_path_buf(), e))?;
    if summary.written == 0 {
        warn!("No stations survived the refresh of '{}'", input.display());
    }
    Ok(summary)
}
