//! Command handlers.
//!
//! Handlers take the composed [`CliContext`](crate::bootstrap::CliContext),
//! drive the runtime and format results for the terminal. Stream control and
//! parsing stay in the library crates.

pub mod devices;
pub mod stream;
