//! Rendering streamed entries and lifecycle events.

use std::io::{self, Write};

use crossterm::style::{Color, Stylize};
use loglens_core::{KeywordFilter, LogEntry, LogPanel, Severity, StreamEvent};

/// How one batch entry is shown relative to what came before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Starts a new stored entry.
    Head(&'a LogEntry),
    /// Folded into the previous entry by the store; shown indented.
    Continuation(&'a LogEntry),
}

/// Classify `entries` the way the store will fold them, given the store's
/// current last entry.
pub fn classify_batch<'a>(previous: Option<&LogEntry>, entries: &'a [LogEntry]) -> Vec<Line<'a>> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let merged = match i {
                0 => previous.is_some_and(|prev| prev.merges_with(entry)),
                _ => entries[i - 1].merges_with(entry),
            };
            if merged {
                Line::Continuation(entry)
            } else {
                Line::Head(entry)
            }
        })
        .collect()
}

/// One-line text form of an entry.
pub fn format_entry(entry: &LogEntry) -> String {
    match entry {
        LogEntry::Android(e) => format!(
            "{} {} {}({}): {}",
            entry.timestamp_label(),
            e.severity,
            e.tag,
            entry.source(),
            e.message
        ),
        LogEntry::Ios(e) => {
            let pid = e.pid.map(|pid| format!("[{pid}]")).unwrap_or_default();
            match &e.category {
                Some(category) => format!(
                    "{} {}{} [{}] {}",
                    entry.timestamp_label(),
                    e.process,
                    pid,
                    category,
                    e.message
                ),
                None => format!("{} {}{} {}", entry.timestamp_label(), e.process, pid, e.message),
            }
        }
    }
}

const fn severity_color(severity: Severity) -> Option<Color> {
    match severity {
        Severity::Fatal | Severity::Error => Some(Color::Red),
        Severity::Warn => Some(Color::Yellow),
        Severity::Info => Some(Color::Green),
        Severity::Debug => Some(Color::Blue),
        Severity::Verbose => Some(Color::DarkGrey),
        Severity::Silent => None,
    }
}

/// Human-readable status for lifecycle events, or `None` for batches.
pub fn status_line(event: &StreamEvent) -> Option<String> {
    let platform = event.platform();
    let tool = platform.tool();
    match event {
        StreamEvent::Started { device, pid, .. } => {
            let device = device.as_deref().unwrap_or("default device");
            Some(match pid {
                Some(pid) => format!("Streaming {platform} logs from {device} ({tool} pid {pid}), Ctrl-C to stop"),
                None => format!("Streaming {platform} logs from {device}, Ctrl-C to stop"),
            })
        }
        StreamEvent::Error { error, .. } => Some(format!("{tool}: {error}")),
        StreamEvent::Exit { code, signal, .. } => Some(format!(
            "{tool} exited ({})",
            exit_status_label(*code, *signal)
        )),
        StreamEvent::Stopped { .. } => Some(format!("{platform} stream stopped")),
        StreamEvent::Batch { .. } => None,
    }
}

/// "code 3", "signal 9" or "unknown status".
pub fn exit_status_label(code: Option<i32>, signal: Option<i32>) -> String {
    match (code, signal) {
        (Some(code), _) => format!("code {code}"),
        (None, Some(signal)) => format!("signal {signal}"),
        (None, None) => "unknown status".to_string(),
    }
}

/// Prints batches to `out`, keeping the panel's store in sync.
#[derive(Debug)]
pub struct EntryPrinter<W> {
    out: W,
    panel: LogPanel,
    filter: KeywordFilter,
    json: bool,
    color: bool,
    head_visible: bool,
}

impl<W: Write> EntryPrinter<W> {
    pub const fn new(out: W, panel: LogPanel, filter: KeywordFilter, json: bool, color: bool) -> Self {
        Self {
            out,
            panel,
            filter,
            json,
            color,
            head_visible: false,
        }
    }

    pub const fn panel(&self) -> &LogPanel {
        &self.panel
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Apply `event` to the panel and print what the user should see on
    /// stdout. In JSON mode every event is printed; otherwise only entries.
    pub fn handle(&mut self, event: &StreamEvent) -> io::Result<()> {
        let previous = self.panel.store().last().cloned();
        let was_running = self.panel.is_running();
        self.panel.apply(event);

        if self.json {
            return self.print_json(event);
        }

        if let StreamEvent::Batch { entries, .. } = event {
            if was_running {
                self.print_batch(previous.as_ref(), entries)?;
            }
        }
        Ok(())
    }

    fn print_batch(&mut self, previous: Option<&LogEntry>, entries: &[LogEntry]) -> io::Result<()> {
        for line in classify_batch(previous, entries) {
            match line {
                Line::Head(entry) => {
                    self.head_visible = self.filter.matches(entry);
                    if self.head_visible {
                        let text = format_entry(entry);
                        self.write_colored(&text, entry.severity())?;
                    }
                }
                Line::Continuation(entry) => {
                    if self.head_visible {
                        let text = format!("    {}", entry.message());
                        self.write_colored(&text, entry.severity())?;
                    }
                }
            }
        }
        self.out.flush()
    }

    fn write_colored(&mut self, text: &str, severity: Option<Severity>) -> io::Result<()> {
        match severity.and_then(severity_color) {
            Some(color) if self.color => writeln!(self.out, "{}", text.with(color)),
            _ => writeln!(self.out, "{text}"),
        }
    }

    fn print_json(&mut self, event: &StreamEvent) -> io::Result<()> {
        let json = match event {
            StreamEvent::Batch { platform, entries } => {
                let entries: Vec<LogEntry> = entries
                    .iter()
                    .filter(|entry| self.filter.matches(entry))
                    .cloned()
                    .collect();
                if entries.is_empty() {
                    return Ok(());
                }
                serde_json::to_string(&StreamEvent::Batch {
                    platform: *platform,
                    entries,
                })
            }
            other => serde_json::to_string(other),
        }
        .map_err(io::Error::other)?;
        writeln!(self.out, "{json}")?;
        self.out.flush()
    }
}
