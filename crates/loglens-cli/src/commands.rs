//! Subcommands.

use clap::{Subcommand, ValueEnum};
use loglens_core::Platform;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Stream logcat output from an Android device or emulator
    Android {
        /// Device serial (see `loglens devices android`)
        #[arg(short, long, env = "ANDROID_SERIAL")]
        device: Option<String>,
        /// Minimum priority: verbose, debug, info, warn, error, fatal
        #[arg(short, long, default_value = "verbose")]
        level: String,
        /// Comma-separated logcat buffers (main, system, crash, events, radio) or "all"
        #[arg(short, long = "buffer", default_value = "main")]
        buffer: String,
        /// Only show entries containing this keyword (case-insensitive)
        #[arg(short, long)]
        grep: Option<String>,
    },

    /// Stream the unified log of a booted iOS simulator
    Ios {
        /// Simulator UDID (defaults to the booted simulator)
        #[arg(short, long)]
        device: Option<String>,
        /// Only stream processes whose name contains this text
        #[arg(short, long)]
        process: Option<String>,
        /// Only show entries containing this keyword (case-insensitive)
        #[arg(short, long)]
        grep: Option<String>,
    },

    /// List connected Android devices and booted simulators
    Devices {
        /// Restrict the listing to one platform
        #[arg(value_enum)]
        platform: Option<PlatformArg>,
    },

    /// List processes running on an Android device
    Processes {
        /// Device serial
        device: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Android,
    Ios,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Android => Self::Android,
            PlatformArg::Ios => Self::Ios,
        }
    }
}
