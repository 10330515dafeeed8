//! Per-platform stream session controller.
//!
//! [`StreamController`] is a cheap handle to an actor task that owns the
//! platform's single producer session, its line splitter and batch buffer,
//! and any termination in progress. Requests are queued to the actor; their
//! outcomes are reported through the [`StreamEventEmitter`] port.

mod actor;
mod session;

use std::fmt;
use std::sync::Arc;

use loglens_core::{Platform, StreamEventEmitter, StreamOptions, StreamSettings, ToolResolver};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::termination::{ProcessKiller, SystemKiller};
use crate::tools::SystemToolResolver;

use actor::{Command, ControllerActor};

/// Externally visible controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    /// No producer and nothing queued.
    Idle,
    /// A previous producer is being terminated and a start is queued
    /// behind it.
    Starting,
    /// A producer is live.
    Running,
    /// A producer is being terminated.
    Stopping,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{0} stream controller has shut down")]
    Closed(Platform),

    #[error("{options} options sent to the {controller} stream controller")]
    PlatformMismatch {
        controller: Platform,
        options: Platform,
    },
}

/// Collaborators injected into a controller.
#[derive(Clone)]
pub struct ControllerPorts {
    pub resolver: Arc<dyn ToolResolver>,
    pub emitter: Arc<dyn StreamEventEmitter>,
    pub killer: Arc<dyn ProcessKiller>,
}

impl ControllerPorts {
    /// Real tool lookup and process killing, events to `emitter`.
    pub fn system(settings: &StreamSettings, emitter: Arc<dyn StreamEventEmitter>) -> Self {
        Self {
            resolver: Arc::new(SystemToolResolver::from_settings(settings)),
            emitter,
            killer: Arc::new(SystemKiller::new()),
        }
    }
}

impl fmt::Debug for ControllerPorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerPorts").finish_non_exhaustive()
    }
}

/// Handle to one platform's controller task.
#[derive(Debug, Clone)]
pub struct StreamController {
    platform: Platform,
    commands: mpsc::UnboundedSender<Command>,
}

impl StreamController {
    /// Spawn the controller task on the current tokio runtime.
    pub fn spawn(platform: Platform, settings: StreamSettings, ports: ControllerPorts) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let actor = ControllerActor::new(platform, settings, ports, receiver);
        tokio::spawn(actor.run());
        Self { platform, commands }
    }

    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Request a stream with `options`. A live producer is terminated first;
    /// if several starts queue up behind a termination, the last one wins.
    pub fn start(&self, options: impl Into<StreamOptions>) -> Result<(), ControllerError> {
        let options = options.into();
        if options.platform() != self.platform {
            return Err(ControllerError::PlatformMismatch {
                controller: self.platform,
                options: options.platform(),
            });
        }
        self.send(Command::Start(options))
    }

    /// Request a stop. Always answered by exactly one `stopped` event unless
    /// a stop is already in progress.
    pub fn stop(&self) -> Result<(), ControllerError> {
        self.send(Command::Stop)
    }

    pub async fn state(&self) -> Result<ControllerState, ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::State(reply))?;
        rx.await.map_err(|_| ControllerError::Closed(self.platform))
    }

    /// Terminate any live producer, wait for the termination to finish and
    /// end the controller task.
    pub async fn shutdown(&self) -> Result<(), ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown(reply))?;
        rx.await.map_err(|_| ControllerError::Closed(self.platform))
    }

    fn send(&self, command: Command) -> Result<(), ControllerError> {
        self.commands
            .send(command)
            .map_err(|_| ControllerError::Closed(self.platform))
    }
}
