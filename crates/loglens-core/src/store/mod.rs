//! Client-side ring storage for parsed entries.
//!
//! A store holds one platform's entries in arrival order, folds consecutive
//! same-origin lines into one entry (multi-line stack traces arrive as
//! separate logcat lines) and evicts the oldest entries past its capacity.

mod filter;
mod panel;

use std::collections::VecDeque;

use tracing::debug;

use crate::domain::LogEntry;
use crate::settings::DEFAULT_MAX_RETAINED_ENTRIES;

pub use filter::KeywordFilter;
pub use panel::LogPanel;

/// Outcome of one [`LogStore::ingest`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Entries stored as new rows.
    pub appended: usize,
    /// Entries folded into the previous row.
    pub merged: usize,
    /// Oldest rows dropped to stay within capacity.
    pub evicted: usize,
}

/// Bounded, ordered entry store with FIFO eviction.
#[derive(Debug, Clone)]
pub struct LogStore {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETAINED_ENTRIES)
    }
}

impl LogStore {
    /// Create a store retaining at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a batch, merging each entry into the current last entry when
    /// they share an origin, then evict down to capacity.
    pub fn ingest<I>(&mut self, batch: I) -> IngestSummary
    where
        I: IntoIterator<Item = LogEntry>,
    {
        let mut summary = IngestSummary::default();

        for entry in batch {
            match self.entries.back_mut() {
                Some(last) if last.merges_with(&entry) => {
                    last.append_message(entry.message());
                    summary.merged += 1;
                }
                _ => {
                    self.entries.push_back(entry);
                    summary.appended += 1;
                }
            }
        }

        let overflow = self.entries.len().saturating_sub(self.capacity);
        if overflow > 0 {
            self.entries.drain(..overflow);
            summary.evicted = overflow;
            debug!(evicted = overflow, retained = self.entries.len(), "Evicted oldest entries");
        }

        summary
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries oldest first.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Most recent entry, if any.
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Entries matching `keyword`, oldest first. A blank keyword matches all.
    pub fn filter(&self, keyword: &str) -> Vec<&LogEntry> {
        let filter = KeywordFilter::new(keyword);
        self.entries.iter().filter(|entry| filter.matches(entry)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AndroidEntry, Severity};
    use chrono::NaiveDate;

    fn entry(pid: u32, tag: &str, message: &str) -> LogEntry {
        LogEntry::Android(AndroidEntry {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_milli_opt(10, 30, 45, 123)
                .unwrap(),
            pid,
            tid: None,
            severity: Severity::Info,
            tag: tag.to_string(),
            message: message.to_string(),
        })
    }

    fn messages(store: &LogStore) -> Vec<&str> {
        store.entries().map(LogEntry::message).collect()
    }

    #[test]
    fn test_merges_consecutive_same_origin() {
        let mut store = LogStore::new(100);
        let summary = store.ingest(vec![entry(1, "A", "x"), entry(1, "A", "y"), entry(2, "B", "z")]);

        assert_eq!(store.len(), 2);
        assert_eq!(messages(&store), vec!["x\ny", "z"]);
        assert_eq!(
            summary,
            IngestSummary {
                appended: 2,
                merged: 1,
                evicted: 0
            }
        );
    }

    #[test]
    fn test_merges_across_batches() {
        let mut store = LogStore::new(100);
        store.ingest(vec![entry(1, "A", "x")]);
        store.ingest(vec![entry(1, "A", "y")]);
        assert_eq!(messages(&store), vec!["x\ny"]);
    }

    #[test]
    fn test_interleaved_origins_do_not_merge() {
        let mut store = LogStore::new(100);
        store.ingest(vec![entry(1, "A", "x"), entry(2, "B", "y"), entry(1, "A", "z")]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_evicts_oldest_beyond_capacity() {
        let capacity = 10;
        let extra = 7;
        let mut store = LogStore::new(capacity);

        // Distinct pids so nothing merges.
        let batch: Vec<_> = (0..capacity + extra)
            .map(|i| entry(i as u32, "T", &i.to_string()))
            .collect();
        let summary = store.ingest(batch);

        assert_eq!(store.len(), capacity);
        assert_eq!(summary.evicted, extra);
        let expected: Vec<String> = (extra..capacity + extra).map(|i| i.to_string()).collect();
        assert_eq!(messages(&store), expected);
    }

    #[test]
    fn test_eviction_over_many_batches() {
        let mut store = LogStore::new(3);
        for i in 0..10u32 {
            store.ingest(vec![entry(i, "T", &i.to_string())]);
        }
        assert_eq!(messages(&store), vec!["7", "8", "9"]);
    }

    #[test]
    fn test_clear() {
        let mut store = LogStore::new(10);
        store.ingest(vec![entry(1, "A", "x")]);
        store.clear();
        assert!(store.is_empty());
        assert!(store.last().is_none());
    }

    #[test]
    fn test_filter_by_keyword() {
        let mut store = LogStore::new(10);
        store.ingest(vec![
            entry(1, "Network", "connected"),
            entry(2, "UI", "frame dropped"),
            entry(3, "Db", "network timeout"),
        ]);
        let hits: Vec<_> = store.filter("NETWORK").into_iter().map(LogEntry::message).collect();
        assert_eq!(hits, vec!["connected", "network timeout"]);
        assert_eq!(store.filter("  ").len(), 3);
    }

    #[test]
    fn test_unparsed_ios_lines_stay_separate() {
        let now = chrono::DateTime::parse_from_rfc3339("2024-01-15T10:30:45+00:00").unwrap();
        let mut store = LogStore::new(8);
        // Default-style rows have no `process[pid]` and degrade to fallbacks.
        for i in 0..20 {
            let line = format!("2024-01-15 10:30:45.123456+0000 0x1f Default 0x0 58 0 SpringBoard: row {i}");
            store.ingest(vec![LogEntry::Ios(crate::parse::parse_ios_line_at(&line, now))]);
        }

        assert_eq!(store.len(), 8);
        assert!(store.entries().all(|entry| !entry.message().contains('\n')));
        assert!(store.last().is_some_and(|entry| entry.message().ends_with("row 19")));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let store = LogStore::new(0);
        assert_eq!(store.capacity(), 1);
    }
}
