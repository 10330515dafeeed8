//! Structured log entries.
//!
//! The two producers have different schemas, so entries are a tagged variant
//! rather than one record full of optional fields.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::platform::Platform;
use super::severity::Severity;

/// Process name used when an iOS line carries no recognizable process.
pub const UNKNOWN_PROCESS: &str = "Unknown";

/// One `adb logcat -v time` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidEntry {
    /// Local wall-clock time. logcat omits the year, so it is synthesized
    /// from the current system year at parse time.
    #[serde(with = "android_timestamp")]
    pub timestamp: NaiveDateTime,
    pub pid: u32,
    pub tid: Option<u32>,
    pub severity: Severity,
    pub tag: String,
    pub message: String,
}

/// One simulator `log stream` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IosEntry {
    pub timestamp: DateTime<FixedOffset>,
    /// Process name, or [`UNKNOWN_PROCESS`] for fallback entries.
    pub process: String,
    pub pid: Option<u32>,
    /// Thread id as printed (usually hex, e.g. `0x1a2b`).
    pub tid: Option<String>,
    pub category: Option<String>,
    pub message: String,
}

/// A parsed log line from either platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum LogEntry {
    Android(AndroidEntry),
    Ios(IosEntry),
}

impl LogEntry {
    pub const fn platform(&self) -> Platform {
        match self {
            Self::Android(_) => Platform::Android,
            Self::Ios(_) => Platform::Ios,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Android(entry) => &entry.message,
            Self::Ios(entry) => &entry.message,
        }
    }

    /// Source identifier for display: `pid` or `pid/tid` on Android, the
    /// process name on iOS.
    pub fn source(&self) -> String {
        match self {
            Self::Android(entry) => match entry.tid {
                Some(tid) => format!("{}/{}", entry.pid, tid),
                None => entry.pid.to_string(),
            },
            Self::Ios(entry) => entry.process.clone(),
        }
    }

    /// Tag (Android) or category (iOS).
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Android(entry) => Some(&entry.tag),
            Self::Ios(entry) => entry.category.as_deref(),
        }
    }

    pub const fn severity(&self) -> Option<Severity> {
        match self {
            Self::Android(entry) => Some(entry.severity),
            Self::Ios(_) => None,
        }
    }

    /// Sortable timestamp text.
    pub fn timestamp_label(&self) -> String {
        match self {
            Self::Android(entry) => entry.timestamp.format(android_timestamp::FORMAT).to_string(),
            Self::Ios(entry) => entry.timestamp.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
        }
    }

    /// Whether `next` comes from the same origin as `self` and should be
    /// folded into it rather than stored as a new entry.
    ///
    /// Android compares pid, tid, tag and severity; iOS compares process, pid
    /// and category. Fallback iOS entries ([`UNKNOWN_PROCESS`]) have no
    /// origin and never merge. Entries from different platforms never merge.
    pub fn merges_with(&self, next: &Self) -> bool {
        match (self, next) {
            (Self::Android(last), Self::Android(next)) => {
                last.pid == next.pid
                    && last.tid == next.tid
                    && last.tag == next.tag
                    && last.severity == next.severity
            }
            (Self::Ios(last), Self::Ios(next)) => {
                last.process != UNKNOWN_PROCESS
                    && last.process == next.process
                    && last.pid == next.pid
                    && last.category == next.category
            }
            _ => false,
        }
    }

    /// Append another entry's message on a new line.
    pub fn append_message(&mut self, message: &str) {
        let target = match self {
            Self::Android(entry) => &mut entry.message,
            Self::Ios(entry) => &mut entry.message,
        };
        target.push('\n');
        target.push_str(message);
    }
}

impl From<AndroidEntry> for LogEntry {
    fn from(entry: AndroidEntry) -> Self {
        Self::Android(entry)
    }
}

impl From<IosEntry> for LogEntry {
    fn from(entry: IosEntry) -> Self {
        Self::Ios(entry)
    }
}

mod android_timestamp {
    use chrono::NaiveDateTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
    }
}
