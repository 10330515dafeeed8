//! Stream settings and validation.
//!
//! Pure domain types; the CLI layers `LOGLENS_*` environment variables and
//! flags on top of [`StreamSettings::with_defaults`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default batch flush interval in milliseconds.
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 100;

/// Default number of lines that forces an early flush.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// Default ring store capacity.
pub const DEFAULT_MAX_RETAINED_ENTRIES: usize = 50_000;

/// Default capacity of the reader-to-controller channel.
pub const DEFAULT_CHUNK_CHANNEL_CAPACITY: usize = 256;

/// Offsets of the escalating termination stages, measured from the stop
/// request. Detaching and the handle kill always run immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminationSettings {
    pub group_kill_after_ms: u64,
    pub sweep_after_ms: u64,
    pub pid_kill_after_ms: u64,
    /// Deadline after which `stopped` is emitted whether or not the process
    /// has been seen to exit.
    pub ceiling_ms: u64,
}

impl Default for TerminationSettings {
    fn default() -> Self {
        Self {
            group_kill_after_ms: 100,
            sweep_after_ms: 200,
            pid_kill_after_ms: 400,
            ceiling_ms: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    pub flush_interval_ms: u64,
    pub max_batch_size: usize,
    pub max_retained_entries: usize,
    pub chunk_channel_capacity: usize,
    pub termination: TerminationSettings,
    /// Explicit `adb` binary, bypassing PATH and SDK lookup.
    pub adb_path: Option<PathBuf>,
    /// Explicit `xcrun` binary.
    pub xcrun_path: Option<PathBuf>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl StreamSettings {
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_retained_entries: DEFAULT_MAX_RETAINED_ENTRIES,
            chunk_channel_capacity: DEFAULT_CHUNK_CHANNEL_CAPACITY,
            termination: TerminationSettings::default(),
            adb_path: None,
            xcrun_path: None,
        }
    }

    /// Defaults overlaid with `LOGLENS_*` variables from the process
    /// environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with variables from `lookup`.
    ///
    /// Unset or blank variables keep their default; malformed numbers are
    /// an error rather than silently ignored.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::with_defaults();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(raw) = get("LOGLENS_FLUSH_INTERVAL_MS") {
            settings.flush_interval_ms = parse_number("LOGLENS_FLUSH_INTERVAL_MS", &raw)?;
        }
        if let Some(raw) = get("LOGLENS_MAX_BATCH_SIZE") {
            settings.max_batch_size = parse_number("LOGLENS_MAX_BATCH_SIZE", &raw)?;
        }
        if let Some(raw) = get("LOGLENS_MAX_RETAINED") {
            settings.max_retained_entries = parse_number("LOGLENS_MAX_RETAINED", &raw)?;
        }
        if let Some(raw) = get("LOGLENS_ADB_PATH") {
            settings.adb_path = Some(PathBuf::from(raw.trim()));
        }
        if let Some(raw) = get("LOGLENS_XCRUN_PATH") {
            settings.xcrun_path = Some(PathBuf::from(raw.trim()));
        }

        validate_settings(&settings)?;
        Ok(settings)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, SettingsError> {
    raw.trim().parse().map_err(|_| SettingsError::InvalidNumber {
        key,
        value: raw.to_string(),
    })
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Flush interval must be between 1 and 10,000 ms, got {0}")]
    InvalidFlushInterval(u64),

    #[error("Max batch size must be between 1 and 100,000, got {0}")]
    InvalidBatchSize(usize),

    #[error("Retention ceiling must be at least 1, got {0}")]
    InvalidRetention(usize),

    #[error("Chunk channel capacity must be at least 1")]
    InvalidChannelCapacity,

    #[error("Termination stage offsets must be non-decreasing (group {group}, sweep {sweep}, pid {pid}, ceiling {ceiling})")]
    UnorderedTermination {
        group: u64,
        sweep: u64,
        pid: u64,
        ceiling: u64,
    },

    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Validate settings values.
pub fn validate_settings(settings: &StreamSettings) -> Result<(), SettingsError> {
    if !(1..=10_000).contains(&settings.flush_interval_ms) {
        return Err(SettingsError::InvalidFlushInterval(settings.flush_interval_ms));
    }

    if !(1..=100_000).contains(&settings.max_batch_size) {
        return Err(SettingsError::InvalidBatchSize(settings.max_batch_size));
    }

    if settings.max_retained_entries == 0 {
        return Err(SettingsError::InvalidRetention(settings.max_retained_entries));
    }

    if settings.chunk_channel_capacity == 0 {
        return Err(SettingsError::InvalidChannelCapacity);
    }

    let t = &settings.termination;
    if !(t.group_kill_after_ms <= t.sweep_after_ms
        && t.sweep_after_ms <= t.pid_kill_after_ms
        && t.pid_kill_after_ms <= t.ceiling_ms)
    {
        return Err(SettingsError::UnorderedTermination {
            group: t.group_kill_after_ms,
            sweep: t.sweep_after_ms,
            pid: t.pid_kill_after_ms,
            ceiling: t.ceiling_ms,
        });
    }

    Ok(())
}
