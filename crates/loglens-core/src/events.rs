//! Events emitted by a stream controller.
//!
//! Transport adapters (terminal printer, channel bridge) serialize these
//! directly; the serde shape is part of the public interface.

use serde::{Deserialize, Serialize};

use crate::domain::{LogEntry, Platform, Severity};

/// Normalized parameters echoed back when a stream starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum StartedParams {
    Android {
        buffers: Vec<String>,
        level: Severity,
    },
    Ios {
        #[serde(rename = "processFilter")]
        process_filter: Option<String>,
    },
}

/// Lifecycle and data events for one platform's stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// The producer was spawned.
    Started {
        platform: Platform,
        device: Option<String>,
        pid: Option<u32>,
        params: StartedParams,
    },

    /// Parsed entries from one buffer flush. Never empty.
    Batch {
        platform: Platform,
        entries: Vec<LogEntry>,
    },

    /// Spawn failure, tool resolution failure, or producer stderr.
    Error { platform: Platform, error: String },

    /// The producer exited without being asked to.
    Exit {
        platform: Platform,
        code: Option<i32>,
        signal: Option<i32>,
    },

    /// The stream is fully stopped. Emitted exactly once per stop.
    Stopped { platform: Platform },
}

impl StreamEvent {
    pub const fn platform(&self) -> Platform {
        match self {
            Self::Started { platform, .. }
            | Self::Batch { platform, .. }
            | Self::Error { platform, .. }
            | Self::Exit { platform, .. }
            | Self::Stopped { platform } => *platform,
        }
    }

    /// Get the event type name as a string.
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Batch { .. } => "batch",
            Self::Error { .. } => "error",
            Self::Exit { .. } => "exit",
            Self::Stopped { .. } => "stopped",
        }
    }

    pub const fn stopped(platform: Platform) -> Self {
        Self::Stopped { platform }
    }

    pub fn error(platform: Platform, error: impl Into<String>) -> Self {
        Self::Error {
            platform,
            error: error.into(),
        }
    }
}
