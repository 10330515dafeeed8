//! Root CLI structure and global options.

use clap::Parser;

use crate::commands::Commands;

/// Stream and browse device logs from Android devices and iOS simulators.
#[derive(Debug, Parser)]
#[command(name = "loglens")]
#[command(about = "Stream Android logcat and iOS simulator logs")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Batch flush interval in milliseconds
    #[arg(long = "flush-ms", global = true, value_name = "MS")]
    pub flush_ms: Option<u64>,

    /// Flush a batch early once it holds this many lines
    #[arg(long = "max-batch", global = true, value_name = "LINES")]
    pub max_batch: Option<usize>,

    /// Maximum number of entries kept in memory
    #[arg(long = "retain", global = true, value_name = "ENTRIES")]
    pub retain: Option<usize>,

    /// Print output as JSON lines instead of formatted text
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::parse_from([
            "loglens", "devices", "--verbose", "--flush-ms", "50", "--retain", "1000", "--json",
        ]);
        assert!(cli.verbose);
        assert!(cli.json);
        assert_eq!(cli.flush_ms, Some(50));
        assert_eq!(cli.retain, Some(1000));
        assert_eq!(cli.max_batch, None);
    }

    #[test]
    fn test_no_command_is_allowed() {
        let cli = Cli::parse_from(["loglens"]);
        assert!(cli.command.is_none());
    }
}
