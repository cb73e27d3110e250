//! One HTTP request per time block against the USGS instantaneous-values
//! service, plus the line filter that keeps only observation rows from the
//! tab-delimited (rdb) response body.

use crate::download::error::DownloadError;
use crate::download::windows::TimeBlock;
use chrono::NaiveDateTime;
use log::{info, warn};
use std::time::Duration;

pub(crate) const NWIS_IV_URL: &str = "https://waterservices.usgs.gov/nwis/iv/";

/// Agency code sent with every request; doubles as the data-row marker in
/// rdb responses.
pub(crate) const AGENCY_CODE: &str = "USGS";

/// Parameter code for gauge height, the default measured quantity.
pub const PARAM_GAUGE_HEIGHT: &str = "00065";

/// The service reports local time with a fixed eastern offset.
const UTC_OFFSET_SUFFIX: &str = "-04:00";

/// First field of the single column-header line in an rdb body.
const COLUMN_HEADER_PREFIX: &str = "agency_cd";

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The lines of one block's response worth keeping: the column header (if
/// the block carried one) and the observation rows, in response order.
#[derive(Debug)]
pub(crate) struct ParsedBlock {
    pub header: Option<String>,
    pub rows: Vec<String>,
}

pub(crate) struct BlockFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BlockFetcher {
    pub fn new() -> Result<Self, DownloadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(DownloadError::ClientBuild)?;
        Ok(Self {
            client,
            base_url: NWIS_IV_URL.to_string(),
        })
    }

    #[cfg(test)]
    pub fn with_base_url(base_url: &str) -> Result<Self, DownloadError> {
        let mut fetcher = Self::new()?;
        fetcher.base_url = base_url.to_string();
        Ok(fetcher)
    }

    pub fn client(&self) -> &reqwest::blocking::Client {
        &self.client
    }

    /// Issues the request for one block and returns the raw response body.
    ///
    /// Every transport-level failure (connect error, timeout, non-2xx
    /// status) comes back as a `DownloadError`; the caller decides whether
    /// that fails the run or just the block.
    pub fn fetch_block(
        &self,
        station: &str,
        parameter: &str,
        block: &TimeBlock,
    ) -> Result<String, DownloadError> {
        let start = request_stamp(block.start);
        let end = request_stamp(block.end);
        let request = self
            .client
            .get(&self.base_url)
            .query(&[
                ("sites", station),
                ("agencyCd", AGENCY_CODE),
                ("parameterCd", parameter),
                ("startDT", start.as_str()),
                ("endDT", end.as_str()),
                ("format", "rdb"),
            ])
            .build()
            .map_err(|e| DownloadError::RequestBuild(station.to_string(), e))?;
        let url = request.url().to_string();
        info!("Requesting block {} .. {} from {}", block.start, block.end, url);

        let response = self
            .client
            .execute(request)
            .map_err(|e| DownloadError::NetworkRequest(url.clone(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    DownloadError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    DownloadError::NetworkRequest(url, e)
                });
            }
        };
        response.text().map_err(|e| DownloadError::BodyRead(url, e))
    }
}

/// ISO-8601 stamp with millisecond precision and the fixed offset the
/// service expects, e.g. `2026-03-15T14:30:00.000-04:00`.
fn request_stamp(t: NaiveDateTime) -> String {
    format!("{}{}", t.format("%Y-%m-%dT%H:%M:%S%.3f"), UTC_OFFSET_SUFFIX)
}

/// Filters a raw rdb body down to the lines worth persisting.
///
/// Blank lines, comment lines and the field-format line are dropped; the
/// column-header line is captured separately so the assembler can write it
/// at most once per run.
pub(crate) fn retain_observation_lines(body: &str) -> ParsedBlock {
    let mut header = None;
    let mut rows = Vec::new();
    for line in body.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if header.is_none() && line.starts_with(COLUMN_HEADER_PREFIX) {
            header = Some(line.to_string());
        } else if line.starts_with(AGENCY_CODE) {
            rows.push(line.to_string());
        }
    }
    ParsedBlock { header, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const RDB_BODY: &str = "\
# ---------------------------------- WARNING ----------------------------------------\n\
# Some of the data that you have obtained from this U.S. Geological Survey database\n\
# may not have received Director's approval.\n\
#\n\
agency_cd\tsite_no\tdatetime\ttz_cd\t69928_00065\t69928_00065_cd\n\
5s\t15s\t20d\t6s\t14n\t10s\n\
USGS\t04119070\t2026-03-14 00:00\tEST\t5.12\tP\n\
\n\
USGS\t04119070\t2026-03-14 00:15\tEST\t5.13\tP\n";

    #[test]
    fn retains_header_and_data_rows_only() {
        let parsed = retain_observation_lines(RDB_BODY);
        assert_eq!(
            parsed.header.as_deref(),
            Some("agency_cd\tsite_no\tdatetime\ttz_cd\t69928_00065\t69928_00065_cd")
        );
        assert_eq!(parsed.rows.len(), 2);
        assert!(parsed.rows.iter().all(|r| r.starts_with("USGS")));
    }

    #[test]
    fn field_format_and_comment_lines_are_dropped() {
        let parsed = retain_observation_lines(RDB_BODY);
        assert!(!parsed.rows.iter().any(|r| r.starts_with("5s")));
        assert!(!parsed.rows.iter().any(|r| r.starts_with('#')));
    }

    #[test]
    fn body_without_header_yields_none() {
        let parsed = retain_observation_lines("USGS\t01\t2026-01-01 00:00\tEST\t1.0\tP\n");
        assert!(parsed.header.is_none());
        assert_eq!(parsed.rows.len(), 1);
    }

    #[test]
    fn request_stamp_carries_fixed_offset() {
        let t = NaiveDate::from_ymd_opt(2026, 3, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(request_stamp(t), "2026-03-15T14:30:00.000-04:00");
    }
}
