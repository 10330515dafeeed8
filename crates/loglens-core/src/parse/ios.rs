//! Simulator `log stream` line grammar:
//! `YYYY-MM-DD HH:MM:SS.ffffff+ZZZZ  [HOST] PROCESS[PID:TID] [CATEGORY] MESSAGE`
//!
//! The syslog style puts a hostname token before the process; it is skipped.
//!
//! Lines that do not fit degrade to an [`UNKNOWN_PROCESS`] entry instead of
//! being dropped.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Local};
use regex::Regex;

use crate::domain::{IosEntry, UNKNOWN_PROCESS};

const TIMESTAMP: &str = r"\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d+[+-]\d{4}";

static FULL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^({TIMESTAMP})\s+(?:[^\s\[]+\s+)?(.+?)\[(\d+)(?::([0-9A-Za-z]+))?\]\s*(?:\[([^\]]*)\]\s*)?(.*)$"
    ))
    .expect("log stream line pattern is valid")
});

static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({TIMESTAMP})\s*(.*)$")).expect("log stream timestamp pattern is valid")
});

/// Parse a `log stream` line. Never fails; see [`parse_ios_line_at`].
pub fn parse_ios_line(line: &str) -> IosEntry {
    parse_ios_line_at(line, Local::now().fixed_offset())
}

/// Parse a `log stream` line, using `now` as the timestamp when the line has
/// none.
pub fn parse_ios_line_at(line: &str, now: DateTime<FixedOffset>) -> IosEntry {
    if let Some(caps) = FULL_PATTERN.captures(line) {
        if let Some(timestamp) = parse_timestamp(&caps[1]) {
            let message = caps[6].trim();
            let message = message.strip_prefix(':').unwrap_or(message).trim();
            return IosEntry {
                timestamp,
                process: caps[2].trim().to_string(),
                pid: caps[3].parse().ok(),
                tid: caps.get(4).map(|tid| tid.as_str().to_string()),
                category: caps
                    .get(5)
                    .map(|category| category.as_str().trim())
                    .filter(|category| !category.is_empty())
                    .map(str::to_string),
                message: message.to_string(),
            };
        }
    }

    if let Some(caps) = TIMESTAMP_PATTERN.captures(line) {
        if let Some(timestamp) = parse_timestamp(&caps[1]) {
            return unknown(timestamp, caps[2].trim());
        }
    }

    unknown(now, line)
}

fn unknown(timestamp: DateTime<FixedOffset>, message: &str) -> IosEntry {
    IosEntry {
        timestamp,
        process: UNKNOWN_PROCESS.to_string(),
        pid: None,
        tid: None,
        category: None,
        message: message.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let mut parts = raw.split_whitespace();
    let date = parts.next()?;
    let time = parts.next()?;
    DateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S%.f%z").ok()
}
