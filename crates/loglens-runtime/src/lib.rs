//! Process runtime for loglens.
//!
//! Spawns the platform log tools, turns their output into batches of parsed
//! entries and tears them down with a staged termination protocol. All
//! domain types live in `loglens-core`; this crate only adds processes,
//! timers and OS adapters.

#![deny(unsafe_code)]

pub mod batch;
pub mod command;
pub mod controller;
pub mod devices;
pub mod termination;
pub mod tools;

pub use batch::{BatchBuffer, BatchSink};
pub use command::{Invocation, sweep_pattern};
pub use controller::{ControllerError, ControllerPorts, ControllerState, StreamController};
pub use devices::SystemDeviceEnumerator;
pub use termination::{ProcessKiller, Stage, SystemKiller, TerminationSchedule};
pub use tools::SystemToolResolver;
