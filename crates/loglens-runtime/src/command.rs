//! Producer command lines.
//!
//! Builds the argument vector for each platform tool and the command-line
//! pattern used to sweep up stray producers during termination.

use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;

use loglens_core::{AndroidOptions, IosOptions, Platform, StreamOptions};
use regex::Regex;

static ANDROID_SWEEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"adb.*logcat").expect("adb sweep pattern is valid"));

static IOS_SWEEP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"simctl.*spawn.*log.*stream").expect("simctl sweep pattern is valid")
});

/// Simulator target used when no UDID is given.
pub const BOOTED_SIMULATOR: &str = "booted";

/// A resolved program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn for_options(program: PathBuf, options: &StreamOptions) -> Self {
        let args = match options {
            StreamOptions::Android(options) => logcat_args(options),
            StreamOptions::Ios(options) => log_stream_args(options),
        };
        Self { program, args }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// `[-s DEVICE] logcat -b BUF... -v time *:P`
pub fn logcat_args(options: &AndroidOptions) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(device) = &options.device {
        args.push("-s".to_string());
        args.push(device.clone());
    }
    args.push("logcat".to_string());
    for buffer in &options.buffers {
        args.push("-b".to_string());
        args.push(buffer.clone());
    }
    args.push("-v".to_string());
    args.push("time".to_string());
    args.push(format!("*:{}", options.level.letter()));
    args
}

/// `simctl spawn UDID log stream --style syslog [--predicate ...]`
///
/// The style is fixed: the default columnar style does not carry the
/// `process[pid]` shape the parser keys on.
pub fn log_stream_args(options: &IosOptions) -> Vec<String> {
    let target = options.device.as_deref().unwrap_or(BOOTED_SIMULATOR);
    let mut args: Vec<String> = ["simctl", "spawn", target, "log", "stream", "--style", "syslog"]
        .into_iter()
        .map(str::to_string)
        .collect();

    if let Some(filter) = &options.process_filter {
        args.push("--predicate".to_string());
        args.push(format!("process CONTAINS \"{filter}\""));
    }
    args
}

/// Command-line pattern matching producers for `platform`.
pub fn sweep_pattern(platform: Platform) -> &'static Regex {
    match platform {
        Platform::Android => &ANDROID_SWEEP,
        Platform::Ios => &IOS_SWEEP,
    }
}
