//! The main client for downloading and analyzing station data.
//!
//! A [`Riverwatch`] owns the data directory and the dataset file inside
//! it. Downloads overwrite that file wholesale; validation, statistics,
//! sampling and export are independent re-reads of it and can be called
//! repeatedly in any order.

use crate::buoy::{fetch_latest_water_temp, DEFAULT_BUOY_URL};
use crate::dataset;
use crate::dataset::stats::{MonthlyLevelStats, SummaryStats};
use crate::download::assembler::{
    DatasetAssembler, DownloadMode, DownloadOutcome, DATASET_FILE_NAME,
};
use crate::download::fetcher::PARAM_GAUGE_HEIGHT;
use crate::download::normalize::normalize_dataset;
use crate::download::windows::{plan_blocks, single_block, Span};
use crate::error::RiverwatchError;
use crate::utils::{ensure_data_dir_exists, get_data_dir};
use bon::bon;
use chrono::Local;
use log::warn;
use polars::frame::DataFrame;
use std::path::{Path, PathBuf};

/// Client for one station dataset at a time.
///
/// Create one with [`Riverwatch::new`] (data directory resolved through
/// the platform conventions) or [`Riverwatch::with_data_folder`] for an
/// explicit location.
pub struct Riverwatch {
    data_dir: PathBuf,
    dataset_path: PathBuf,
    assembler: DatasetAssembler,
}

#[bon]
impl Riverwatch {
    /// Creates a client storing its dataset under `data_dir`, creating
    /// the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RiverwatchError::DataDirCreation`] when the directory
    /// cannot be created, and [`RiverwatchError::Download`] when the HTTP
    /// client cannot be built.
    pub fn with_data_folder(data_dir: PathBuf) -> Result<Self, RiverwatchError> {
        ensure_data_dir_exists(&data_dir)
            .map_err(|e| RiverwatchError::DataDirCreation(data_dir.clone(), e))?;
        let dataset_path = data_dir.join(DATASET_FILE_NAME);
        Ok(Self {
            assembler: DatasetAssembler::new(dataset_path.clone())?,
            data_dir,
            dataset_path,
        })
    }

    /// Creates a client using the default per-user data directory.
    ///
    /// # Errors
    ///
    /// Returns [`RiverwatchError::DataDirResolution`] when no data
    /// directory can be determined for this platform, otherwise the same
    /// errors as [`Riverwatch::with_data_folder`].
    pub fn new() -> Result<Self, RiverwatchError> {
        let data_dir = get_data_dir().map_err(RiverwatchError::DataDirResolution)?;
        Self::with_data_folder(data_dir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Location of the dataset file all other operations read.
    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    /// Downloads observations for one station into the dataset file,
    /// overwriting whatever was there.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.station(&str)`: **Required.** The site number, e.g. `"04119070"`.
    /// * `.span(Span)`: **Required.** How much history to request.
    /// * `.mode(DownloadMode)`: Optional. Defaults to
    ///   [`DownloadMode::MultiBlock`], which fetches one seven-day block
    ///   per request, tolerates per-block failures and re-sorts the
    ///   assembled file by timestamp. [`DownloadMode::SingleBlock`]
    ///   issues one request for the whole span and writes the response
    ///   verbatim; any failure fails the run.
    /// * `.parameter_code(&str)`: Optional. Upstream parameter code,
    ///   defaulting to gauge height (`00065`).
    ///
    /// # Returns
    ///
    /// A [`DownloadOutcome`] listing the blocks that failed (empty on a
    /// clean run). Failed blocks are reported, not raised: only an
    /// unwritable dataset file or (in multi-block mode) a corrupt
    /// timestamp during normalization is an error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use riverwatch::{Riverwatch, RiverwatchError, Span};
    ///
    /// fn run() -> Result<(), RiverwatchError> {
    ///     let client = Riverwatch::new()?;
    ///     let outcome = client
    ///         .download()
    ///         .station("04119070")
    ///         .span(Span::Weeks(3))
    ///         .call()?;
    ///     if !outcome.is_complete() {
    ///         eprintln!("{} of {} blocks failed",
    ///             outcome.failed_blocks.len(), outcome.blocks_attempted);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    #[builder]
    pub fn download(
        &self,
        station: &str,
        span: Span,
        mode: Option<DownloadMode>,
        parameter_code: Option<&str>,
    ) -> Result<DownloadOutcome, RiverwatchError> {
        let mode = mode.unwrap_or_default();
        let parameter = parameter_code.unwrap_or(PARAM_GAUGE_HEIGHT);
        let now = Local::now().naive_local();

        let outcome = match mode {
            DownloadMode::MultiBlock => {
                let blocks = plan_blocks(now, span);
                let outcome = self.assembler.download_blocks(station, parameter, &blocks)?;
                normalize_dataset(&self.dataset_path)?;
                outcome
            }
            DownloadMode::SingleBlock => {
                let block = single_block(now, span);
                self.assembler.download_single(station, parameter, &block)?
            }
        };

        if !outcome.is_complete() {
            warn!(
                "Download for station {} finished with {}/{} failed blocks",
                station,
                outcome.failed_blocks.len(),
                outcome.blocks_attempted
            );
        }
        Ok(outcome)
    }

    /// Structural check of the dataset file; `false` means downstream
    /// display/statistics/export should stay disabled. Never errors.
    pub fn validate(&self) -> bool {
        dataset::validate::validate(&self.dataset_path)
    }

    /// Mean/median/std/min/max of the level column.
    pub fn summary_stats(&self) -> Result<SummaryStats, RiverwatchError> {
        Ok(dataset::stats::summary_stats(&self.dataset_path)?)
    }

    /// Per-calendar-month mean/min/max of the level column. Months are
    /// bucketed by number, so multi-year datasets fold same-named months
    /// together.
    pub fn monthly_stats(&self) -> Result<Vec<MonthlyLevelStats>, RiverwatchError> {
        Ok(dataset::stats::monthly_stats(&self.dataset_path)?)
    }

    /// Rows falling exactly on the `interval_hours` clock grid, with the
    /// level column coerced to floats, ready for charting.
    pub fn sample_at_interval(&self, interval_hours: u32) -> Result<DataFrame, RiverwatchError> {
        Ok(dataset::sample::sample_at_interval(
            &self.dataset_path,
            interval_hours,
        )?)
    }

    /// Exports the dataset as CSV to `dest`, returning rows written. A
    /// caller that offers a save dialog simply skips this call when the
    /// user cancels.
    pub fn export_csv(&self, dest: &Path) -> Result<usize, RiverwatchError> {
        Ok(dataset::export::export_csv(&self.dataset_path, dest)?)
    }

    /// Most recent water temperature (Celsius) from a buoy feed, `None`
    /// when the buoy is not reporting one.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.url(&str)`: Optional. Feed to read instead of the default
    ///   nearshore buoy ([`DEFAULT_BUOY_URL`]).
    #[builder]
    pub fn latest_water_temp(&self, url: Option<&str>) -> Result<Option<f64>, RiverwatchError> {
        Ok(fetch_latest_water_temp(
            self.assembler.client(),
            url.unwrap_or(DEFAULT_BUOY_URL),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::error::DatasetError;

    #[test]
    fn with_data_folder_creates_directory_and_paths() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("riverwatch");
        let client = Riverwatch::with_data_folder(data_dir.clone()).unwrap();

        assert!(data_dir.is_dir());
        assert_eq!(client.data_dir(), data_dir.as_path());
        assert_eq!(
            client.dataset_path(),
            data_dir.join(DATASET_FILE_NAME).as_path()
        );
    }

    #[test]
    fn fresh_client_has_no_valid_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let client = Riverwatch::with_data_folder(dir.path().join("data")).unwrap();
        assert!(!client.validate());
    }

    #[test]
    fn statistics_on_a_missing_dataset_error_out() {
        let dir = tempfile::tempdir().unwrap();
        let client = Riverwatch::with_data_folder(dir.path().join("data")).unwrap();
        assert!(matches!(
            client.summary_stats().unwrap_err(),
            RiverwatchError::Dataset(DatasetError::FileRead(..))
        ));
    }
}
