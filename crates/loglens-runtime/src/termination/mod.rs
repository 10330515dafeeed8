//! Staged producer termination.
//!
//! Platform log tools are not always well behaved: `adb` can leave a
//! forked client behind and `simctl spawn` does not always forward signals.
//! Stopping therefore escalates from the child handle, to the process group,
//! to a command-line sweep, to the raw pid, with a hard ceiling after which
//! the stop is reported regardless.

mod killer;
mod schedule;

pub use killer::{ProcessKiller, SystemKiller};
pub use schedule::{Stage, TerminationSchedule};
