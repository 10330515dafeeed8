//! `adb logcat -v time` line grammar:
//! `MM-DD HH:MM:SS.mmm LEVEL/TAG(PID[ TID]): MESSAGE`

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDateTime};
use regex::Regex;

use crate::domain::{AndroidEntry, Severity};

static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d+)\s+([A-Z])/([^(]+)\(\s*(\d+)(?:\s+(\d+))?\):\s+(.*)$",
    )
    .expect("logcat line pattern is valid")
});

/// Parse a logcat line, using the current local year for the timestamp.
///
/// Old logs replayed across a year boundary get the wrong year; logcat does
/// not print one, so there is nothing better to infer it from.
pub fn parse_android_line(line: &str) -> Option<AndroidEntry> {
    parse_android_line_in_year(line, Local::now().year())
}

/// Parse a logcat line with an explicit year.
pub fn parse_android_line_in_year(line: &str, year: i32) -> Option<AndroidEntry> {
    let caps = LINE_PATTERN.captures(line)?;

    let timestamp = parse_timestamp(&caps[1], year)?;
    let severity = caps[2].chars().next().and_then(Severity::from_letter)?;
    let pid = caps[4].parse().ok()?;
    let tid = match caps.get(5) {
        Some(tid) => Some(tid.as_str().parse().ok()?),
        None => None,
    };

    Some(AndroidEntry {
        timestamp,
        pid,
        tid,
        severity,
        tag: caps[3].trim().to_string(),
        message: caps[6].trim().to_string(),
    })
}

fn parse_timestamp(raw: &str, year: i32) -> Option<NaiveDateTime> {
    let mut parts = raw.split_whitespace();
    let date = parts.next()?;
    let time = parts.next()?;
    // Feb 29 in a non-leap year is rejected here and the line is dropped.
    NaiveDateTime::parse_from_str(&format!("{year}-{date} {time}"), "%Y-%m-%d %H:%M:%S%.f").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_documented_example() {
        let entry =
            parse_android_line_in_year("01-15 10:30:45.123  I/MyApp( 1234): Hello World", 2024)
                .unwrap();
        assert_eq!(
            entry.timestamp.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            "2024-01-15T10:30:45.123"
        );
        assert_eq!(entry.severity, Severity::Info);
        assert_eq!(entry.tag, "MyApp");
        assert_eq!(entry.pid, 1234);
        assert_eq!(entry.tid, None);
        assert_eq!(entry.message, "Hello World");
    }

    #[test]
    fn test_uses_current_year() {
        let entry = parse_android_line("01-15 10:30:45.123  I/MyApp( 1234): Hello World").unwrap();
        assert_eq!(entry.timestamp.year(), Local::now().year());
    }

    #[test]
    fn test_parses_thread_id() {
        let entry = parse_android_line_in_year(
            "03-02 08:00:01.500 W/ActivityManager(  512  530): Slow operation",
            2024,
        )
        .unwrap();
        assert_eq!(entry.pid, 512);
        assert_eq!(entry.tid, Some(530));
        assert_eq!(entry.severity, Severity::Warn);
        assert_eq!(entry.tag, "ActivityManager");
    }

    #[test]
    fn test_assert_priority_maps_to_fatal() {
        let entry = parse_android_line_in_year("01-15 10:30:45.123 A/libc( 99): abort", 2024).unwrap();
        assert_eq!(entry.severity, Severity::Fatal);
    }

    #[test]
    fn test_rejects_unknown_priority_letter() {
        assert!(parse_android_line_in_year("01-15 10:30:45.123 X/Tag( 1): msg", 2024).is_none());
    }

    #[test]
    fn test_rejects_other_formats() {
        // threadtime format
        assert!(
            parse_android_line_in_year("01-15 10:30:45.123  1234  5678 I MyApp: Hello", 2024)
                .is_none()
        );
        assert!(parse_android_line_in_year("--------- beginning of crash", 2024).is_none());
        assert!(parse_android_line_in_year("", 2024).is_none());
    }

    #[test]
    fn test_leap_day_outside_leap_year_is_dropped() {
        let line = "02-29 12:00:00.000 I/Tag( 1): leap";
        assert!(parse_android_line_in_year(line, 2024).is_some());
        assert!(parse_android_line_in_year(line, 2023).is_none());
    }

    #[test]
    fn test_formatted_fields_round_trip() {
        let tags = ["MyApp", "ActivityManager", "chromium", "a.b.c", "Tag With Space"];
        let messages = ["Hello World", "x", "key=value: nested (parens)", "tab\tinside"];
        let severities = ['V', 'D', 'I', 'W', 'E', 'F', 'S'];

        for (i, tag) in tags.iter().enumerate() {
            for (j, message) in messages.iter().enumerate() {
                for (k, letter) in severities.iter().enumerate() {
                    let pid = 1 + (i * 1000 + j * 100 + k) as u32;
                    let tid = (k % 2 == 0).then_some(pid + 7);
                    let ids = match tid {
                        Some(tid) => format!("{pid:>5} {tid:>5}"),
                        None => format!("{pid:>5}"),
                    };
                    let line = format!("12-31 23:59:59.999 {letter}/{tag}({ids}): {message}");

                    let entry = parse_android_line_in_year(&line, 2024).unwrap();
                    assert_eq!(entry.pid, pid);
                    assert_eq!(entry.tid, tid);
                    assert_eq!(entry.tag, *tag);
                    assert_eq!(entry.severity.letter(), *letter);
                    assert_eq!(entry.message, *message);
                }
            }
        }
    }
}
