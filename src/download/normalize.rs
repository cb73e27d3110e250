//! Re-orders the assembled dataset by observation timestamp.
//!
//! Blocks are fetched most-recent-first and failed blocks leave gaps, so
//! the file on disk is out of order after assembly. Header lines keep
//! their original order at the top; data rows are stably sorted ascending.

use crate::download::error::DownloadError;
use crate::download::fetcher::AGENCY_CODE;
use chrono::NaiveDateTime;
use log::info;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Timestamp layout of the third tab-separated field of every data row.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

const TIMESTAMP_FIELD: usize = 2;

/// Rewrites `path` with header lines first and data rows sorted ascending
/// by timestamp (stable for equal stamps).
///
/// A data row whose timestamp does not parse fails the whole operation;
/// the file is rewritten atomically, so it is only replaced once every
/// row has parsed.
pub fn normalize_dataset(path: &Path) -> Result<(), DownloadError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| DownloadError::DatasetRead(path.to_path_buf(), e))?;

    let mut header_lines = Vec::new();
    let mut data_lines: Vec<(NaiveDateTime, &str)> = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(AGENCY_CODE) {
            let stamp = line.split('\t').nth(TIMESTAMP_FIELD).unwrap_or("");
            let parsed = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).map_err(|e| {
                DownloadError::MalformedTimestamp {
                    line: index + 1,
                    value: stamp.to_string(),
                    source: e,
                }
            })?;
            data_lines.push((parsed, line));
        } else {
            header_lines.push(line);
        }
    }

    data_lines.sort_by_key(|(stamp, _)| *stamp);

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| DownloadError::DatasetWrite(path.to_path_buf(), e))?;
    for line in &header_lines {
        writeln!(tmp, "{line}")
            .map_err(|e| DownloadError::DatasetWrite(path.to_path_buf(), e))?;
    }
    for (_, line) in &data_lines {
        writeln!(tmp, "{line}")
            .map_err(|e| DownloadError::DatasetWrite(path.to_path_buf(), e))?;
    }
    tmp.persist(path)
        .map_err(|e| DownloadError::DatasetWrite(path.to_path_buf(), e.error))?;

    info!(
        "Normalized dataset '{}' ({} data rows)",
        path.display(),
        data_lines.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_fixture(dir: &tempfile::TempDir, lines: &[&str]) -> PathBuf {
        let path = dir.path().join("river_level_data.rdb");
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn sorts_data_rows_ascending_keeping_headers_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            &[
                "# comment one",
                "# comment two",
                "agency_cd\tsite_no\tdatetime\ttz_cd\tlevel\tcd",
                "USGS\t04119070\t2026-03-14 12:00\tEST\t5.3\tP",
                "USGS\t04119070\t2026-03-01 06:00\tEST\t4.8\tP",
                "USGS\t04119070\t2026-03-08 09:00\tEST\t5.0\tP",
            ],
        );

        normalize_dataset(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert!(lines[0].starts_with('#'));
        assert!(lines[1].starts_with('#'));
        assert!(lines[2].starts_with("agency_cd"));
        let stamps: Vec<&str> = lines[3..]
            .iter()
            .map(|l| l.split('\t').nth(2).unwrap())
            .collect();
        assert_eq!(
            stamps,
            ["2026-03-01 06:00", "2026-03-08 09:00", "2026-03-14 12:00"]
        );
    }

    #[test]
    fn equal_timestamps_keep_original_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            &[
                "# header",
                "USGS\t01\t2026-03-01 06:00\tEST\tfirst\tP",
                "USGS\t01\t2026-03-01 06:00\tEST\tsecond\tP",
            ],
        );

        normalize_dataset(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let values: Vec<&str> = contents
            .lines()
            .filter(|l| l.starts_with("USGS"))
            .map(|l| l.split('\t').nth(4).unwrap())
            .collect();
        assert_eq!(values, ["first", "second"]);
    }

    #[test]
    fn malformed_timestamp_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            &[
                "# header",
                "USGS\t01\t2026-03-01 06:00\tEST\t5.0\tP",
                "USGS\t01\tnot-a-date\tEST\t5.1\tP",
            ],
        );

        let err = normalize_dataset(&path).unwrap_err();
        match err {
            DownloadError::MalformedTimestamp { line, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(value, "not-a-date");
            }
            other => panic!("unexpected error: {other}"),
        }
        // The original file must be untouched after a failed rewrite.
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("not-a-date"));
    }

    #[test]
    fn blank_lines_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            &[
                "# header",
                "",
                "USGS\t01\t2026-03-01 06:00\tEST\t5.0\tP",
                "",
            ],
        );

        normalize_dataset(&path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.lines().all(|l| !l.trim().is_empty()));
    }
}
