//! Command-line front end for loglens.
//!
//! `main.rs` parses arguments, installs logging and dispatches to the
//! handlers here; everything else lives in the library crates.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, PlatformArg};
pub use error::CliError;
pub use parser::Cli;

