//! Per-platform line parsers.
//!
//! Android parsing is strict: a line that does not match the `-v time`
//! grammar is dropped. iOS parsing degrades instead and always produces an
//! entry, because `log stream` output changes shape with its style flags.

mod android;
mod ios;

use chrono::{Datelike, Local};
use tracing::debug;

use crate::domain::{LogEntry, Platform};

pub use android::{parse_android_line, parse_android_line_in_year};
pub use ios::{parse_ios_line, parse_ios_line_at};

/// Parse a single raw line for `platform`.
pub fn parse_line(platform: Platform, line: &str) -> Option<LogEntry> {
    match platform {
        Platform::Android => parse_android_line(line).map(LogEntry::Android),
        Platform::Ios => Some(LogEntry::Ios(parse_ios_line(line))),
    }
}

/// Parse a batch of raw lines, preserving order and dropping unparseable
/// Android lines. The clock is read once per batch.
pub fn parse_lines<I, S>(platform: Platform, lines: I) -> Vec<LogEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let now = Local::now();
    let mut dropped = 0usize;
    let mut entries = Vec::new();

    for line in lines {
        let line = line.as_ref();
        match platform {
            Platform::Android => match parse_android_line_in_year(line, now.year()) {
                Some(entry) => entries.push(LogEntry::Android(entry)),
                None => dropped += 1,
            },
            Platform::Ios => {
                entries.push(LogEntry::Ios(parse_ios_line_at(line, now.fixed_offset())));
            }
        }
    }

    if dropped > 0 {
        debug!(%platform, dropped, kept = entries.len(), "Dropped unparseable lines");
    }
    entries
}
