//! OS process killing used by the termination stages.

use std::io;

use regex::Regex;
use sysinfo::System;
use tracing::debug;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Kills processes that are not (or no longer) reachable through a child
/// handle. Every method treats "already gone" as success.
pub trait ProcessKiller: Send + Sync {
    /// SIGKILL every process in group `pgid`.
    fn kill_group(&self, pgid: u32) -> io::Result<()>;

    /// Kill every process whose command line matches `pattern`, except the
    /// current process. Returns how many were signalled.
    fn sweep(&self, pattern: &Regex) -> io::Result<usize>;

    /// SIGKILL a single pid.
    fn kill_pid(&self, pid: u32) -> io::Result<()>;
}

/// Signals real processes with `nix` and enumerates them with `sysinfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemKiller;

impl SystemKiller {
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
fn to_nix_pid(pid: u32) -> io::Result<Pid> {
    i32::try_from(pid)
        .map(Pid::from_raw)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("pid {pid} out of range")))
}

#[cfg(unix)]
fn ignore_missing(result: nix::Result<()>) -> io::Result<()> {
    match result {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(io::Error::other(e)),
    }
}

impl ProcessKiller for SystemKiller {
    #[cfg(unix)]
    fn kill_group(&self, pgid: u32) -> io::Result<()> {
        ignore_missing(signal::killpg(to_nix_pid(pgid)?, Signal::SIGKILL))
    }

    #[cfg(not(unix))]
    fn kill_group(&self, _pgid: u32) -> io::Result<()> {
        Ok(())
    }

    fn sweep(&self, pattern: &Regex) -> io::Result<usize> {
        let own_pid = std::process::id();
        let system = System::new_all();
        let mut killed = 0;

        for (pid, process) in system.processes() {
            let pid = pid.as_u32();
            if pid == own_pid {
                continue;
            }
            let command_line = process
                .cmd()
                .iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ");
            if !pattern.is_match(&command_line) {
                continue;
            }

            debug!(pid, command = %command_line, "Sweeping stray producer");
            match self.kill_pid(pid) {
                Ok(()) => killed += 1,
                Err(e) => debug!(pid, error = %e, "Sweep kill failed"),
            }
        }

        Ok(killed)
    }

    #[cfg(unix)]
    fn kill_pid(&self, pid: u32) -> io::Result<()> {
        ignore_missing(signal::kill(to_nix_pid(pid)?, Signal::SIGKILL))
    }

    #[cfg(not(unix))]
    fn kill_pid(&self, pid: u32) -> io::Result<()> {
        let system = System::new_all();
        if let Some(process) = system.process(sysinfo::Pid::from_u32(pid)) {
            process.kill();
        }
        Ok(())
    }
}
