//! CLI composition root.
//!
//! Settings are read from `LOGLENS_*` variables (after `.env` is loaded by
//! `main`) and then overridden by command-line flags. Everything a handler
//! needs is wired here once.

use std::sync::Arc;

use loglens_core::{StreamSettings, ToolResolver, validate_settings};
use loglens_runtime::{SystemDeviceEnumerator, SystemToolResolver};
use tracing::debug;

use crate::error::CliError;
use crate::parser::Cli;

/// Flag overrides applied on top of environment settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliConfig {
    pub flush_ms: Option<u64>,
    pub max_batch: Option<usize>,
    pub retain: Option<usize>,
    pub json: bool,
}

impl CliConfig {
    pub const fn from_cli(cli: &Cli) -> Self {
        Self {
            flush_ms: cli.flush_ms,
            max_batch: cli.max_batch,
            retain: cli.retain,
            json: cli.json,
        }
    }

    /// Overlay the flags onto `settings`.
    pub fn apply(&self, mut settings: StreamSettings) -> StreamSettings {
        if let Some(ms) = self.flush_ms {
            settings.flush_interval_ms = ms;
        }
        if let Some(max) = self.max_batch {
            settings.max_batch_size = max;
        }
        if let Some(retain) = self.retain {
            settings.max_retained_entries = retain;
        }
        settings
    }
}

/// Composed dependencies for command handlers.
pub struct CliContext {
    pub settings: StreamSettings,
    pub resolver: Arc<dyn ToolResolver>,
    pub devices: SystemDeviceEnumerator,
    pub json: bool,
}

impl std::fmt::Debug for CliContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliContext")
            .field("settings", &self.settings)
            .field("json", &self.json)
            .finish_non_exhaustive()
    }
}

/// Build the context from environment settings and flags.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let settings = config.apply(StreamSettings::from_env()?);
    build_context(settings, config.json)
}

/// Build the context from already-loaded settings.
pub fn build_context(settings: StreamSettings, json: bool) -> Result<CliContext, CliError> {
    validate_settings(&settings)?;
    debug!(?settings, "Resolved stream settings");

    let resolver: Arc<dyn ToolResolver> = Arc::new(SystemToolResolver::from_settings(&settings));
    let devices = SystemDeviceEnumerator::new(Arc::clone(&resolver));

    Ok(CliContext {
        settings,
        resolver,
        devices,
        json,
    })
}
