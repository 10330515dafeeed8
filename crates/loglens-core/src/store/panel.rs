use crate::domain::Platform;
use crate::events::StreamEvent;

use super::{IngestSummary, LogStore};

/// A consumer view of one platform's stream: its store plus running state.
///
/// Batches are ingested only while the stream is running, so a late batch
/// from a detached session cannot leak in after `stopped`. Stopping keeps the
/// entries; only [`LogPanel::clear`] removes them.
#[derive(Debug, Clone)]
pub struct LogPanel {
    platform: Platform,
    store: LogStore,
    running: bool,
}

impl LogPanel {
    pub fn new(platform: Platform, capacity: usize) -> Self {
        Self {
            platform,
            store: LogStore::new(capacity),
            running: false,
        }
    }

    pub const fn platform(&self) -> Platform {
        self.platform
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub const fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Apply a controller event. Events for other platforms are ignored.
    ///
    /// Returns the ingest summary when the event was a batch that got stored.
    pub fn apply(&mut self, event: &StreamEvent) -> Option<IngestSummary> {
        if event.platform() != self.platform {
            return None;
        }

        match event {
            StreamEvent::Started { .. } => {
                self.running = true;
                None
            }
            StreamEvent::Batch { entries, .. } if self.running => {
                Some(self.store.ingest(entries.iter().cloned()))
            }
            StreamEvent::Stopped { .. } | StreamEvent::Exit { .. } => {
                self.running = false;
                None
            }
            StreamEvent::Batch { .. } | StreamEvent::Error { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LogEntry, Severity};
    use crate::events::StartedParams;
    use crate::parse::parse_android_line_in_year;

    fn started() -> StreamEvent {
        StreamEvent::Started {
            platform: Platform::Android,
            device: None,
            pid: Some(1),
            params: StartedParams::Android {
                buffers: vec!["main".to_string()],
                level: Severity::Verbose,
            },
        }
    }

    fn batch(lines: &[&str]) -> StreamEvent {
        StreamEvent::Batch {
            platform: Platform::Android,
            entries: lines
                .iter()
                .filter_map(|line| parse_android_line_in_year(line, 2024))
                .map(LogEntry::Android)
                .collect(),
        }
    }

    #[test]
    fn test_ignores_batches_while_stopped() {
        let mut panel = LogPanel::new(Platform::Android, 100);
        assert!(panel.apply(&batch(&["01-15 10:30:45.123 I/A( 1): early"])).is_none());
        assert!(panel.store().is_empty());
    }

    #[test]
    fn test_lifecycle_keeps_entries_until_clear() {
        let mut panel = LogPanel::new(Platform::Android, 100);
        panel.apply(&started());
        assert!(panel.is_running());

        let summary = panel
            .apply(&batch(&[
                "01-15 10:30:45.123 E/Crash( 7): java.lang.NullPointerException",
                "01-15 10:30:45.123 E/Crash( 7):     at com.example.Main.run(Main.java:10)",
            ]))
            .unwrap();
        assert_eq!(summary.merged, 1);
        assert_eq!(panel.store().len(), 1);

        panel.apply(&StreamEvent::stopped(Platform::Android));
        assert!(!panel.is_running());
        assert_eq!(panel.store().len(), 1);

        panel.clear();
        assert!(panel.store().is_empty());
    }

    #[test]
    fn test_exit_stops_ingestion() {
        let mut panel = LogPanel::new(Platform::Android, 100);
        panel.apply(&started());
        panel.apply(&StreamEvent::Exit {
            platform: Platform::Android,
            code: Some(1),
            signal: None,
        });
        assert!(!panel.is_running());
        assert!(panel.apply(&batch(&["01-15 10:30:45.123 I/A( 1): late"])).is_none());
    }

    #[test]
    fn test_ignores_other_platform() {
        let mut panel = LogPanel::new(Platform::Ios, 100);
        panel.apply(&started());
        assert!(!panel.is_running());
    }
}
