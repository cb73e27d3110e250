mod buoy;
mod dataset;
mod download;
mod error;
mod riverwatch;
mod stations;
mod utils;

pub use error::RiverwatchError;
pub use riverwatch::Riverwatch;

pub use download::assembler::{DownloadMode, DownloadOutcome, DATASET_FILE_NAME};
pub use download::error::DownloadError;
pub use download::fetcher::PARAM_GAUGE_HEIGHT;
pub use download::normalize::normalize_dataset;
pub use download::windows::{
    plan_blocks, single_block, Span, TimeBlock, BLOCK_WIDTH_DAYS, SINGLE_BLOCK_MAX_DAYS,
};

pub use dataset::error::DatasetError;
pub use dataset::export::export_csv;
pub use dataset::sample::sample_at_interval;
pub use dataset::stats::{monthly_stats, summary_stats, MonthlyLevelStats, SummaryStats};
pub use dataset::validate::validate;

pub use stations::{
    load_catalog, refresh_catalog, search, CatalogError, RefreshSummary, Station,
    DEFAULT_STATE_MARKER,
};

pub use buoy::{celsius_to_fahrenheit, latest_water_temp, DEFAULT_BUOY_URL};
