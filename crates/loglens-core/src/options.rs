//! Start options for a stream session.
//!
//! Raw user input (level names, buffer lists, process names) is normalized
//! once at construction so the controller and the `started` event always see
//! the same canonical values.

use serde::{Deserialize, Serialize};

use crate::domain::{Platform, Severity};
use crate::events::StartedParams;

/// logcat buffers accepted by `-b`.
pub const KNOWN_BUFFERS: &[&str] = &["main", "system", "events", "radio", "crash", "all", "default"];

/// Buffer used when nothing valid was requested.
pub const DEFAULT_BUFFER: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndroidOptions {
    /// Device serial for `adb -s`. `None` lets adb pick the only device.
    pub device: Option<String>,
    /// Minimum priority, applied as the `*:<P>` filter spec.
    pub level: Severity,
    /// Normalized, non-empty buffer list.
    pub buffers: Vec<String>,
}

impl AndroidOptions {
    pub fn new(device: Option<&str>, level: &str, buffers: &str) -> Self {
        Self {
            device: normalize_device(device),
            level: Severity::from_level_name(level),
            buffers: normalize_buffers(buffers),
        }
    }
}

impl Default for AndroidOptions {
    fn default() -> Self {
        Self::new(None, "verbose", DEFAULT_BUFFER)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IosOptions {
    /// Simulator UDID. `None` targets the booted simulator.
    pub device: Option<String>,
    /// Process name substring, quotes already escaped for the predicate.
    pub process_filter: Option<String>,
}

impl IosOptions {
    pub fn new(device: Option<&str>, process: Option<&str>) -> Self {
        Self {
            device: normalize_device(device),
            process_filter: process.and_then(normalize_process_filter),
        }
    }
}

/// Options for one start request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum StreamOptions {
    Android(AndroidOptions),
    Ios(IosOptions),
}

impl StreamOptions {
    pub const fn platform(&self) -> Platform {
        match self {
            Self::Android(_) => Platform::Android,
            Self::Ios(_) => Platform::Ios,
        }
    }

    pub fn device(&self) -> Option<&str> {
        match self {
            Self::Android(options) => options.device.as_deref(),
            Self::Ios(options) => options.device.as_deref(),
        }
    }

    /// Parameters reported in the `started` event.
    pub fn started_params(&self) -> StartedParams {
        match self {
            Self::Android(options) => StartedParams::Android {
                buffers: options.buffers.clone(),
                level: options.level,
            },
            Self::Ios(options) => StartedParams::Ios {
                process_filter: options.process_filter.clone(),
            },
        }
    }
}

impl From<AndroidOptions> for StreamOptions {
    fn from(options: AndroidOptions) -> Self {
        Self::Android(options)
    }
}

impl From<IosOptions> for StreamOptions {
    fn from(options: IosOptions) -> Self {
        Self::Ios(options)
    }
}

/// Split a buffer list on commas and whitespace and keep the known buffers.
///
/// `all` anywhere in the input wins outright. An empty or entirely unknown
/// list becomes `["main"]`.
pub fn normalize_buffers(raw: &str) -> Vec<String> {
    let requested: Vec<&str> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|name| !name.is_empty())
        .collect();

    if requested.contains(&"all") {
        return vec!["all".to_string()];
    }

    let mut buffers: Vec<String> = Vec::new();
    for name in requested {
        if KNOWN_BUFFERS.contains(&name) && !buffers.iter().any(|b| b == name) {
            buffers.push(name.to_string());
        }
    }

    if buffers.is_empty() {
        buffers.push(DEFAULT_BUFFER.to_string());
    }
    buffers
}

/// Trim a process filter and escape double quotes. Blank means no filter.
pub fn normalize_process_filter(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.replace('"', "\\\""))
}

fn normalize_device(device: Option<&str>) -> Option<String> {
    device.map(str::trim).filter(|d| !d.is_empty()).map(str::to_string)
}
