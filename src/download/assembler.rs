//! Accumulates the retained lines of every block into the single dataset
//! file, tolerating per-block failures.

use crate::download::error::DownloadError;
use crate::download::fetcher::{retain_observation_lines, BlockFetcher, ParsedBlock};
use crate::download::windows::TimeBlock;
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Name of the dataset file inside the data directory.
pub const DATASET_FILE_NAME: &str = "river_level_data.rdb";

/// Pause between consecutive upstream requests.
const INTER_REQUEST_PAUSE: Duration = Duration::from_millis(500);

/// How a requested span is turned into upstream requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadMode {
    /// One request for the whole span, response body written verbatim.
    SingleBlock,
    /// One request per seven-day block, failures tolerated per block.
    #[default]
    MultiBlock,
}

/// What a download run produced.
///
/// Failed blocks never abort the run; they are collected here so the
/// caller can tell the user which stretches of history are missing.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub failed_blocks: Vec<TimeBlock>,
    pub blocks_attempted: usize,
    pub rows_written: usize,
}

impl DownloadOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed_blocks.is_empty()
    }
}

pub(crate) struct DatasetAssembler {
    fetcher: BlockFetcher,
    dataset_path: PathBuf,
}

impl DatasetAssembler {
    pub fn new(dataset_path: PathBuf) -> Result<Self, DownloadError> {
        Ok(Self {
            fetcher: BlockFetcher::new()?,
            dataset_path,
        })
    }

    #[cfg(test)]
    fn with_fetcher(dataset_path: PathBuf, fetcher: BlockFetcher) -> Self {
        Self {
            fetcher,
            dataset_path,
        }
    }

    pub fn client(&self) -> &reqwest::blocking::Client {
        self.fetcher.client()
    }

    /// Fetches every block in order (most recent first), appending each
    /// block's retained lines as it completes.
    ///
    /// Only an unwritable dataset file is a hard error; a block that fails
    /// to download is logged, recorded in the outcome and skipped.
    pub fn download_blocks(
        &self,
        station: &str,
        parameter: &str,
        blocks: &[TimeBlock],
    ) -> Result<DownloadOutcome, DownloadError> {
        let mut writer = self.create_dataset(station)?;
        let mut failed_blocks = Vec::new();
        let mut header_written = false;
        let mut rows_written = 0;

        for (index, block) in blocks.iter().enumerate() {
            if index > 0 {
                thread::sleep(INTER_REQUEST_PAUSE);
            }
            match self.fetcher.fetch_block(station, parameter, block) {
                Ok(body) => {
                    let parsed = retain_observation_lines(&body);
                    rows_written +=
                        self.append_block(&mut writer, &parsed, &mut header_written)?;
                }
                Err(e) => {
                    warn!(
                        "Block {} .. {} failed for station {}: {}",
                        block.start, block.end, station, e
                    );
                    failed_blocks.push(*block);
                }
            }
        }

        writer
            .flush()
            .map_err(|e| DownloadError::DatasetWrite(self.dataset_path.clone(), e))?;
        info!(
            "Assembled {} rows for station {} ({}/{} blocks ok)",
            rows_written,
            station,
            blocks.len() - failed_blocks.len(),
            blocks.len()
        );
        Ok(DownloadOutcome {
            failed_blocks,
            blocks_attempted: blocks.len(),
            rows_written,
        })
    }

    /// Issues one request for the whole span and writes the raw response
    /// body verbatim. Unlike multi-block mode there is no per-block
    /// recovery: a transport failure fails the run.
    pub fn download_single(
        &self,
        station: &str,
        parameter: &str,
        block: &TimeBlock,
    ) -> Result<DownloadOutcome, DownloadError> {
        let body = self.fetcher.fetch_block(station, parameter, block)?;
        std::fs::write(&self.dataset_path, &body)
            .map_err(|e| DownloadError::DatasetWrite(self.dataset_path.clone(), e))?;
        let rows_written = retain_observation_lines(&body).rows.len();
        info!(
            "Wrote single-block dataset for station {} ({} rows)",
            station, rows_written
        );
        Ok(DownloadOutcome {
            failed_blocks: Vec::new(),
            blocks_attempted: 1,
            rows_written,
        })
    }

    /// Truncates the dataset file and writes the fixed comment header.
    fn create_dataset(&self, station: &str) -> Result<BufWriter<File>, DownloadError> {
        let file = File::create(&self.dataset_path)
            .map_err(|e| DownloadError::DatasetCreate(self.dataset_path.clone(), e))?;
        let mut writer = BufWriter::new(file);
        for line in [
            "# Water level observations (tab-delimited rdb records)".to_string(),
            "# Retrieved from the USGS instantaneous values service".to_string(),
            format!("# Station: {station}"),
        ] {
            self.write_line(&mut writer, &line)?;
        }
        Ok(writer)
    }

    fn append_block(
        &self,
        writer: &mut BufWriter<File>,
        parsed: &ParsedBlock,
        header_written: &mut bool,
    ) -> Result<usize, DownloadError> {
        if !*header_written {
            if let Some(header) = &parsed.header {
                self.write_line(writer, header)?;
                *header_written = true;
            }
        }
        for row in &parsed.rows {
            self.write_line(writer, row)?;
        }
        Ok(parsed.rows.len())
    }

    fn write_line(
        &self,
        writer: &mut BufWriter<File>,
        line: &str,
    ) -> Result<(), DownloadError> {
        writeln!(writer, "{line}")
            .map_err(|e| DownloadError::DatasetWrite(self.dataset_path.clone(), e))
    }
}
