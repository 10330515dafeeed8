//! Platforms and the tools that produce their logs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A log source platform. Each platform has at most one live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Android device or emulator, streamed through `adb logcat`.
    Android,
    /// iOS simulator, streamed through `xcrun simctl spawn <udid> log stream`.
    Ios,
}

impl Platform {
    /// The external tool that produces this platform's log stream.
    pub const fn tool(self) -> PlatformTool {
        match self {
            Self::Android => PlatformTool::Adb,
            Self::Ios => PlatformTool::Xcrun,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform tool binaries resolved through the `ToolResolver` port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTool {
    Adb,
    Xcrun,
}

impl PlatformTool {
    /// Executable name looked up on `PATH`.
    pub const fn binary_name(self) -> &'static str {
        match self {
            Self::Adb => "adb",
            Self::Xcrun => "xcrun",
        }
    }
}

impl fmt::Display for PlatformTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}
