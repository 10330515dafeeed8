//! Core domain for loglens.
//!
//! Everything in this crate is pure: no processes, no filesystem, no timers.
//! The runtime crate drives these types from live producer output, and
//! consumers (CLI, UI bridges) use the store and event types directly.

#![deny(unsafe_code)]

pub mod domain;
pub mod events;
pub mod options;
pub mod parse;
pub mod ports;
pub mod settings;
pub mod splitter;
pub mod store;

// Re-export commonly used types for convenience
pub use domain::{
    AdbDevice, AndroidEntry, DeviceDescriptor, DeviceProcess, IosEntry, LogEntry, Platform,
    PlatformTool, Severity, SimulatorDevice, UNKNOWN_PROCESS,
};
pub use events::{StartedParams, StreamEvent};
pub use options::{AndroidOptions, IosOptions, StreamOptions};
pub use parse::{parse_android_line, parse_ios_line, parse_line, parse_lines};
pub use ports::{
    ChannelEmitter, DeviceEnumerator, NoopEmitter, StaticToolResolver, StreamEventEmitter,
    ToolError, ToolResolver,
};
pub use settings::{SettingsError, StreamSettings, TerminationSettings, validate_settings};
pub use splitter::LineSplitter;
pub use store::{IngestSummary, KeywordFilter, LogPanel, LogStore};
