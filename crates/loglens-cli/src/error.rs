//! CLI error type and exit-code mapping.

use loglens_core::{SettingsError, ToolError};
use loglens_runtime::ControllerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid command-line arguments.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Invalid settings from the environment or flags.
    #[error("Configuration error: {0}")]
    Config(#[from] SettingsError),

    /// `adb` or `xcrun` could not be located.
    #[error("{0}")]
    Tool(#[from] ToolError),

    /// The log producer could not be started.
    #[error("Stream failed: {0}")]
    Stream(String),

    /// The log producer died while streaming.
    #[error("{tool} exited unexpectedly ({status})")]
    ProducerExited { tool: String, status: String },

    /// The stream controller went away.
    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Exit code following sysexits.h where a category fits.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Arguments(_) => 2,
            Self::Config(_) => 78,     // EX_CONFIG
            Self::Tool(_) => 69,       // EX_UNAVAILABLE
            Self::Stream(_) => 71,     // EX_OSERR
            Self::ProducerExited { .. } => 1,
            Self::Controller(_) => 70, // EX_SOFTWARE
            Self::Io(_) => 74,         // EX_IOERR
        }
    }
}

/// Exit code for an error bubbled up to `main`.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loglens_core::PlatformTool;

    #[test]
    fn test_exit_codes() {
        let err = CliError::Config(SettingsError::InvalidBatchSize(0));
        assert_eq!(err.exit_code(), 78);

        let err = CliError::Tool(ToolError::NotFound {
            tool: PlatformTool::Adb,
            searched: vec!["PATH".to_string()],
        });
        assert_eq!(err.exit_code(), 69);
        assert_eq!(err.to_string(), "adb not found (searched: PATH)");
    }

    #[test]
    fn test_exit_code_through_anyhow() {
        let err = anyhow::Error::from(CliError::Arguments("bad".to_string()));
        assert_eq!(exit_code_for(&err), 2);
        assert_eq!(exit_code_for(&anyhow::anyhow!("other")), 1);
    }
}
