//! Latest water temperature from an NDBC realtime buoy feed.
//!
//! The feed is plain text: two header lines, then whitespace-separated
//! observation rows, most recent first. Column 14 is the water
//! temperature in degrees Celsius; `MM` marks a missing reading.

use crate::download::error::DownloadError;
use crate::download::fetcher::REQUEST_TIMEOUT;
use log::info;

/// Holland, MI nearshore buoy.
pub const DEFAULT_BUOY_URL: &str = "https://www.ndbc.noaa.gov/data/realtime2/45029.txt";

const HEADER_LINES: usize = 2;
const WATER_TEMP_COLUMN: usize = 14;
const MISSING_MARKER: &str = "MM";

/// Fetches the feed and returns the most recent water temperature in
/// Celsius, or `None` when the buoy is not reporting one.
pub fn latest_water_temp(url: &str) -> Result<Option<f64>, DownloadError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(DownloadError::ClientBuild)?;
    fetch_latest_water_temp(&client, url)
}

pub(crate) fn fetch_latest_water_temp(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<Option<f64>, DownloadError> {
    info!("Fetching buoy feed from {url}");
    let response = client
        .get(url)
        .send()
        .map_err(|e| DownloadError::NetworkRequest(url.to_string(), e))?;
    let response = match response.error_for_status() {
        Ok(resp) => resp,
        Err(e) => {
            return Err(if let Some(status) = e.status() {
                DownloadError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                }
            } else {
                DownloadError::NetworkRequest(url.to_string(), e)
            });
        }
    };
    let body = response
        .text()
        .map_err(|e| DownloadError::BodyRead(url.to_string(), e))?;
    parse_water_temp(&body, url)
}

fn parse_water_temp(body: &str, url: &str) -> Result<Option<f64>, DownloadError> {
    let line = body
        .lines()
        .skip(HEADER_LINES)
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| DownloadError::EmptyFeed(url.to_string()))?;

    let fields: Vec<&str> = line.split_whitespace().collect();
    let field = fields
        .get(WATER_TEMP_COLUMN)
        .ok_or_else(|| DownloadError::FeedShape {
            url: url.to_string(),
            found: fields.len(),
        })?;

    if *field == MISSING_MARKER {
        return Ok(None);
    }
    field
        .parse::<f64>()
        .map(Some)
        .map_err(|e| DownloadError::FeedValue {
            url: url.to_string(),
            value: field.to_string(),
            source: e,
        })
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}
