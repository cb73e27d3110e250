//! Structural gate over the persisted dataset.

use crate::dataset::loader::{read_raw, DATETIME_COLUMN, MIN_COLUMNS};
use log::error;
use std::path::Path;

/// Checks that the dataset file is structurally usable: it exists, parses
/// as tab-delimited with comments skipped, is non-empty, has a timestamp
/// column and at least five columns overall.
///
/// Never panics or propagates; every rejection logs its reason and
/// returns `false`. Callers use the result to gate display, export and
/// statistics.
pub fn validate(path: &Path) -> bool {
    if !path.exists() {
        error!("Dataset file '{}' not found", path.display());
        return false;
    }

    let df = match read_raw(path) {
        Ok(df) => df,
        Err(e) => {
            error!("Error parsing dataset file '{}': {}", path.display(), e);
            return false;
        }
    };

    if df.height() == 0 {
        error!("Dataset file '{}' contains no data rows", path.display());
        return false;
    }

    if !df
        .get_column_names()
        .iter()
        .any(|c| c.as_str() == DATETIME_COLUMN)
    {
        error!(
            "Dataset file '{}' is missing the '{}' column",
            path.display(),
            DATETIME_COLUMN
        );
        return false;
    }

    if df.width() < MIN_COLUMNS {
        error!(
            "Dataset file '{}' has only {} columns",
            path.display(),
            df.width()
        );
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::loader::test_support::{row, write_dataset};

    #[test]
    fn well_formed_dataset_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dataset(&dir, &[&row("2026-03-01 00:00", "5.12")]);
        assert!(validate(&path));
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!validate(&dir.path().join("absent.rdb")));
    }

    #[test]
    fn header_only_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dataset(&dir, &[]);
        assert!(!validate(&path));
    }

    #[test]
    fn comment_only_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("river_level_data.rdb");
        std::fs::write(&path, "# only comments\n# nothing else\n").unwrap();
        assert!(!validate(&path));
    }

    #[test]
    fn missing_datetime_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("river_level_data.rdb");
        std::fs::write(
            &path,
            "agency_cd\tsite_no\twhen\ttz_cd\tlevel\tcd\nUSGS\t01\tx\tEST\t5.0\tP\n",
        )
        .unwrap();
        assert!(!validate(&path));
    }

    #[test]
    fn narrow_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("river_level_data.rdb");
        std::fs::write(&path, "datetime\tlevel\n2026-03-01 00:00\t5.0\n").unwrap();
        assert!(!validate(&path));
    }
}
