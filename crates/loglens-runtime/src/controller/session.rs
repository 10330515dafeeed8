//! A live producer process and its helper tasks.
//!
//! Three tasks run per session: one reader per output pipe and a
//! supervisor that owns the `Child`. All of them report to the controller
//! over one bounded channel, tagging every message with the session id so
//! the controller can drop output from a session it has detached.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::command::Invocation;

/// Bytes requested per pipe read.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// How long the supervisor waits for stdout to drain after the process
/// exits before reporting the exit anyway.
const STDOUT_DRAIN_GRACE: Duration = Duration::from_millis(500);

pub(crate) type SessionId = u64;

#[derive(Debug)]
pub(crate) enum SessionMessage {
    Stdout { session: SessionId, chunk: Vec<u8> },
    Stderr { session: SessionId, chunk: Vec<u8> },
    Exited {
        session: SessionId,
        code: Option<i32>,
        signal: Option<i32>,
    },
}

#[derive(Debug, Clone, Copy)]
enum Pipe {
    Stdout,
    Stderr,
}

impl Pipe {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }

    fn message(self, session: SessionId, chunk: Vec<u8>) -> SessionMessage {
        match self {
            Self::Stdout => SessionMessage::Stdout { session, chunk },
            Self::Stderr => SessionMessage::Stderr { session, chunk },
        }
    }
}

#[derive(Debug)]
pub(crate) struct LiveSession {
    pub id: SessionId,
    pub pid: Option<u32>,
    kill: Option<oneshot::Sender<()>>,
    readers: Vec<AbortHandle>,
}

impl LiveSession {
    /// Spawn `invocation` in its own process group with piped output.
    pub fn spawn(
        id: SessionId,
        invocation: &Invocation,
        messages: &mpsc::Sender<SessionMessage>,
    ) -> io::Result<Self> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn()?;
        let pid = child.id();

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("producer stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("producer stderr was not captured"))?;

        let stdout_reader = tokio::spawn(forward_output(stdout, id, Pipe::Stdout, messages.clone()));
        let stderr_reader = tokio::spawn(forward_output(stderr, id, Pipe::Stderr, messages.clone()));
        let readers = vec![stdout_reader.abort_handle(), stderr_reader.abort_handle()];

        let (kill_tx, kill_rx) = oneshot::channel();
        tokio::spawn(supervise(child, id, stdout_reader, kill_rx, messages.clone()));

        debug!(session = id, ?pid, "Producer spawned");
        Ok(Self {
            id,
            pid,
            kill: Some(kill_tx),
            readers,
        })
    }

    /// Stop reading output. The supervisor keeps running so the exit is
    /// still observed and the process reaped.
    pub fn detach(&mut self) {
        for reader in self.readers.drain(..) {
            reader.abort();
        }
    }

    /// Ask the supervisor to kill through the child handle. Idempotent.
    pub fn kill(&mut self) {
        if let Some(kill) = self.kill.take() {
            let _ = kill.send(());
        }
    }
}

#[cfg(test)]
impl LiveSession {
    /// A session with no process or tasks behind it.
    pub fn without_process(id: SessionId, pid: u32) -> Self {
        let (kill, _) = oneshot::channel();
        Self {
            id,
            pid: Some(pid),
            kill: Some(kill),
            readers: Vec::new(),
        }
    }
}

async fn forward_output<R>(
    mut stream: R,
    session: SessionId,
    pipe: Pipe,
    messages: mpsc::Sender<SessionMessage>,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK_SIZE];

    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break, // EOF
            Ok(n) => {
                if messages.send(pipe.message(session, buf[..n].to_vec())).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!(session, stream = pipe.as_str(), error = %e, "Output reader exiting due to read error");
                break;
            }
        }
    }

    debug!(session, stream = pipe.as_str(), "Output reader task exiting");
}

async fn supervise(
    mut child: Child,
    session: SessionId,
    mut stdout_reader: JoinHandle<()>,
    kill: oneshot::Receiver<()>,
    messages: mpsc::Sender<SessionMessage>,
) {
    let exited = tokio::select! {
        status = child.wait() => Some(status),
        Ok(()) = kill => None,
    };

    let status = match exited {
        Some(status) => status,
        None => {
            if let Err(e) = child.start_kill() {
                debug!(session, error = %e, "Handle kill failed");
            }
            child.wait().await
        }
    };

    let (code, signal) = match status {
        Ok(status) => exit_parts(status),
        Err(e) => {
            warn!(session, error = %e, "Failed to wait for producer");
            (None, None)
        }
    };

    // Deliver remaining output ahead of the exit report.
    if timeout(STDOUT_DRAIN_GRACE, &mut stdout_reader).await.is_err() {
        debug!(session, "Stdout did not drain in time");
        stdout_reader.abort();
    }

    debug!(session, ?code, ?signal, "Producer exited");
    let _ = messages
        .send(SessionMessage::Exited {
            session,
            code,
            signal,
        })
        .await;
}

fn exit_parts(status: ExitStatus) -> (Option<i32>, Option<i32>) {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        (status.code(), status.signal())
    }

    #[cfg(not(unix))]
    {
        (status.code(), None)
    }
}
