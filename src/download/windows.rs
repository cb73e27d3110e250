//! Splits a requested historical span into bounded request windows.
//!
//! The upstream instantaneous-values service degrades badly on very wide
//! queries, so multi-block downloads walk backward from "now" in fixed
//! seven-day steps. Single-block mode trades robustness for a single
//! request covering the whole span.

use chrono::{Duration, NaiveDateTime};

/// Width of one request window in multi-block mode.
pub const BLOCK_WIDTH_DAYS: i64 = 7;

/// Upper bound on the width of a single-block request.
pub const SINGLE_BLOCK_MAX_DAYS: i64 = 365;

/// A requested amount of history, anchored at "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Days(u32),
    Weeks(u32),
}

impl Span {
    pub fn as_days(self) -> i64 {
        match self {
            Span::Days(days) => i64::from(days),
            Span::Weeks(weeks) => i64::from(weeks) * 7,
        }
    }
}

/// One half-open request window `[start, end)` of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBlock {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeBlock {
    pub fn width(&self) -> Duration {
        self.end - self.start
    }
}

/// Plans the request windows for a multi-block download.
///
/// Blocks are returned most-recent-first and together cover the span
/// exactly: consecutive blocks share an endpoint
/// (`blocks[i].start == blocks[i + 1].end`) and the oldest block is
/// truncated when the span is not a multiple of [`BLOCK_WIDTH_DAYS`].
/// A zero-length span yields no blocks.
pub fn plan_blocks(now: NaiveDateTime, span: Span) -> Vec<TimeBlock> {
    let oldest = now - Duration::days(span.as_days());
    let mut blocks = Vec::new();
    let mut end = now;
    while end > oldest {
        let start = std::cmp::max(end - Duration::days(BLOCK_WIDTH_DAYS), oldest);
        blocks.push(TimeBlock { start, end });
        end = start;
    }
    blocks
}

/// Plans the one window of a single-block download.
///
/// The span is clamped to [`SINGLE_BLOCK_MAX_DAYS`]; anything wider is
/// beyond what the upstream service will answer in one request.
pub fn single_block(now: NaiveDateTime, span: Span) -> TimeBlock {
    let days = span.as_days().min(SINGLE_BLOCK_MAX_DAYS);
    TimeBlock {
        start: now - Duration::days(days),
        end: now,
    }
}
