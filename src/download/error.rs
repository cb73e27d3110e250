use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Failed to build request for station {0}")]
    RequestBuild(String, #[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body for {0}")]
    BodyRead(String, #[source] reqwest::Error),

    #[error("Failed to create dataset file '{0}'")]
    DatasetCreate(PathBuf, #[source] std::io::Error),

    #[error("Failed to write dataset file '{0}'")]
    DatasetWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to read dataset file '{0}'")]
    DatasetRead(PathBuf, #[source] std::io::Error),

    // A data row whose timestamp field does not parse means the download
    // itself is corrupt; the file is left as-is for inspection.
    #[error("Malformed timestamp '{value}' on line {line} of the dataset")]
    MalformedTimestamp {
        line: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Feed at {0} contained no data lines")]
    EmptyFeed(String),

    #[error("Feed at {url} has too few columns ({found})")]
    FeedShape { url: String, found: usize },

    #[error("Feed at {url} has a non-numeric reading '{value}'")]
    FeedValue {
        url: String,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
}
