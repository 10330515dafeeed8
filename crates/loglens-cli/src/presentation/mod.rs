//! Terminal output helpers.
//!
//! Format-only: no stream control or domain transforms beyond choosing how
//! an entry or event is shown.

pub mod entries;
pub mod tables;

pub use entries::{EntryPrinter, Line, classify_batch, format_entry, status_line};
pub use tables::{print_separator, truncate_string};

/// Whether stdout should get ANSI colours.
pub fn use_color() -> bool {
    use crossterm::tty::IsTty;
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_tty()
}
