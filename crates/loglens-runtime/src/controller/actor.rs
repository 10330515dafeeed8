use std::sync::Arc;
use std::time::Duration;

use loglens_core::{
    LineSplitter, Platform, StreamEvent, StreamEventEmitter, StreamOptions, StreamSettings,
    ToolResolver, parse_lines,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use super::session::{LiveSession, SessionId, SessionMessage};
use super::{ControllerPorts, ControllerState};
use crate::batch::BatchBuffer;
use crate::command::{Invocation, sweep_pattern};
use crate::termination::{ProcessKiller, Stage, TerminationSchedule};

pub(super) enum Command {
    Start(StreamOptions),
    Stop,
    State(oneshot::Sender<ControllerState>),
    Shutdown(oneshot::Sender<()>),
}

enum Phase {
    Idle,
    Running(LiveSession),
    Stopping(Termination),
}

struct Termination {
    session: LiveSession,
    schedule: TerminationSchedule,
}

pub(super) struct ControllerActor {
    platform: Platform,
    settings: StreamSettings,
    resolver: Arc<dyn ToolResolver>,
    emitter: Arc<dyn StreamEventEmitter>,
    killer: Arc<dyn ProcessKiller>,
    commands: mpsc::UnboundedReceiver<Command>,
    messages_tx: mpsc::Sender<SessionMessage>,
    messages_rx: mpsc::Receiver<SessionMessage>,
    phase: Phase,
    queued: Option<StreamOptions>,
    next_session: SessionId,
    splitter: LineSplitter,
    stderr_splitter: LineSplitter,
    batch: BatchBuffer<String>,
}

/// Sleep until `deadline`, or forever when there is none.
async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl ControllerActor {
    pub(super) fn new(
        platform: Platform,
        settings: StreamSettings,
        ports: ControllerPorts,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        let (messages_tx, messages_rx) = mpsc::channel(settings.chunk_channel_capacity.max(1));

        let emitter = Arc::clone(&ports.emitter);
        let batch = BatchBuffer::new(
            Duration::from_millis(settings.flush_interval_ms),
            settings.max_batch_size,
            Box::new(move |lines: Vec<String>| {
                let line_count = lines.len();
                let entries = parse_lines(platform, lines);
                debug!(%platform, lines = line_count, entries = entries.len(), "Flushing batch");
                if !entries.is_empty() {
                    emitter.emit(StreamEvent::Batch { platform, entries });
                }
            }),
        );

        Self {
            platform,
            settings,
            resolver: ports.resolver,
            emitter: ports.emitter,
            killer: ports.killer,
            commands,
            messages_tx,
            messages_rx,
            phase: Phase::Idle,
            queued: None,
            next_session: 0,
            splitter: LineSplitter::new(),
            stderr_splitter: LineSplitter::new(),
            batch,
        }
    }

    pub(super) async fn run(mut self) {
        debug!(platform = %self.platform, "Stream controller started");

        loop {
            let batch_deadline = self.batch.deadline();
            let stage_deadline = self.stage_deadline();

            tokio::select! {
                command = self.commands.recv() => {
                    // All handles dropped: shut down as if asked to.
                    let Some(command) = command else {
                        self.finish_all().await;
                        break;
                    };
                    if let Some(reply) = self.handle_command(command) {
                        self.finish_all().await;
                        let _ = reply.send(());
                        break;
                    }
                }
                Some(message) = self.messages_rx.recv() => self.handle_message(message),
                () = sleep_until_opt(batch_deadline) => self.batch.flush_if_due(Instant::now()),
                () = sleep_until_opt(stage_deadline) => self.advance_termination(Instant::now()),
            }
        }

        debug!(platform = %self.platform, "Stream controller stopped");
    }

    fn state(&self) -> ControllerState {
        match (&self.phase, &self.queued) {
            (Phase::Idle, _) => ControllerState::Idle,
            (Phase::Running(_), _) => ControllerState::Running,
            (Phase::Stopping(_), Some(_)) => ControllerState::Starting,
            (Phase::Stopping(_), None) => ControllerState::Stopping,
        }
    }

    fn stage_deadline(&self) -> Option<Instant> {
        match &self.phase {
            Phase::Stopping(termination) => termination.schedule.next_deadline(),
            _ => None,
        }
    }

    /// Apply a command. Returns the reply channel when shutdown was requested.
    fn handle_command(&mut self, command: Command) -> Option<oneshot::Sender<()>> {
        match command {
            Command::Start(options) => match self.phase {
                Phase::Idle => self.start_session(options),
                Phase::Running(_) => {
                    debug!(platform = %self.platform, "Restart requested, stopping current producer first");
                    self.queued = Some(options);
                    self.begin_stop();
                }
                Phase::Stopping(_) => {
                    debug!(platform = %self.platform, "Start queued behind termination");
                    self.queued = Some(options);
                }
            },
            Command::Stop => match self.phase {
                Phase::Idle => self.emitter.emit(StreamEvent::stopped(self.platform)),
                Phase::Running(_) => {
                    self.queued = None;
                    self.begin_stop();
                }
                Phase::Stopping(_) => {
                    if self.queued.take().is_some() {
                        debug!(platform = %self.platform, "Queued start cancelled by stop");
                    }
                }
            },
            Command::State(reply) => {
                let _ = reply.send(self.state());
            }
            Command::Shutdown(reply) => return Some(reply),
        }
        None
    }

    fn start_session(&mut self, options: StreamOptions) {
        let platform = self.platform;
        let tool = platform.tool();

        let program = match self.resolver.resolve(tool) {
            Ok(program) => program,
            Err(e) => {
                warn!(%platform, error = %e, "Cannot start stream");
                self.emitter.emit(StreamEvent::error(platform, e.to_string()));
                return;
            }
        };

        let invocation = Invocation::for_options(program, &options);
        self.next_session += 1;
        let id = self.next_session;

        match LiveSession::spawn(id, &invocation, &self.messages_tx) {
            Ok(session) => {
                info!(%platform, pid = ?session.pid, command = %invocation, "Stream started");
                self.emitter.emit(StreamEvent::Started {
                    platform,
                    device: options.device().map(str::to_string),
                    pid: session.pid,
                    params: options.started_params(),
                });
                self.phase = Phase::Running(session);
            }
            Err(e) => {
                warn!(%platform, command = %invocation, error = %e, "Failed to spawn producer");
                self.emitter
                    .emit(StreamEvent::error(platform, format!("Failed to start {tool}: {e}")));
            }
        }
    }

    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Stdout { session, chunk } if self.is_live(session) => {
                for line in self.splitter.feed(&chunk) {
                    if !line.trim().is_empty() {
                        self.batch.add(line);
                    }
                }
            }
            SessionMessage::Stderr { session, chunk } if self.is_live(session) => {
                for line in self.stderr_splitter.feed(&chunk) {
                    let text = line.trim();
                    if !text.is_empty() {
                        debug!(platform = %self.platform, stderr = text, "Producer stderr");
                        self.emitter.emit(StreamEvent::error(self.platform, text));
                    }
                }
            }
            SessionMessage::Exited {
                session,
                code,
                signal,
            } => self.handle_exit(session, code, signal),
            SessionMessage::Stdout { session, .. } | SessionMessage::Stderr { session, .. } => {
                debug!(platform = %self.platform, session, "Dropping output from detached session");
            }
        }
    }

    fn is_live(&self, session: SessionId) -> bool {
        matches!(&self.phase, Phase::Running(live) if live.id == session)
    }

    fn handle_exit(&mut self, session: SessionId, code: Option<i32>, signal: Option<i32>) {
        match &mut self.phase {
            Phase::Running(live) if live.id == session => {
                info!(platform = %self.platform, ?code, ?signal, "Producer exited unexpectedly");
                self.batch.flush();
                self.splitter.clear();
                self.stderr_splitter.clear();
                self.phase = Phase::Idle;
                self.emitter.emit(StreamEvent::Exit {
                    platform: self.platform,
                    code,
                    signal,
                });
            }
            Phase::Stopping(termination) if termination.session.id == session => {
                debug!(platform = %self.platform, ?code, ?signal, "Producer confirmed closed");
                for stage in termination.schedule.close() {
                    self.run_stage(stage);
                }
                self.notify_stopped();
                self.finish_termination_if_done();
            }
            _ => debug!(platform = %self.platform, session, "Ignoring exit of a finished session"),
        }
    }

    fn begin_stop(&mut self) {
        let Phase::Running(session) = std::mem::replace(&mut self.phase, Phase::Idle) else {
            return;
        };
        info!(platform = %self.platform, pid = ?session.pid, "Stopping stream");

        let now = Instant::now();
        self.phase = Phase::Stopping(Termination {
            session,
            schedule: TerminationSchedule::new(now, &self.settings.termination),
        });
        self.advance_termination(now);
    }

    fn advance_termination(&mut self, now: Instant) {
        let due = match &mut self.phase {
            Phase::Stopping(termination) => termination.schedule.take_due(now),
            _ => return,
        };
        for stage in due {
            self.run_stage(stage);
        }
        self.finish_termination_if_done();
    }

    fn run_stage(&mut self, stage: Stage) {
        let Phase::Stopping(termination) = &mut self.phase else {
            return;
        };
        let platform = self.platform;
        let pid = termination.session.pid;
        debug!(%platform, %stage, ?pid, "Termination stage");

        match stage {
            Stage::Detach => {
                termination.session.detach();
                self.splitter.clear();
                self.stderr_splitter.clear();
                self.batch.clear();
            }
            Stage::SignalHandle => termination.session.kill(),
            Stage::KillGroup => {
                if let Some(pid) = pid {
                    if let Err(e) = self.killer.kill_group(pid) {
                        warn!(%platform, %stage, pid, error = %e, "Termination stage failed");
                    }
                }
            }
            Stage::Sweep => match self.killer.sweep(sweep_pattern(platform)) {
                Ok(0) => {}
                Ok(killed) => info!(%platform, killed, "Swept stray producers"),
                Err(e) => warn!(%platform, %stage, error = %e, "Termination stage failed"),
            },
            Stage::KillPid => {
                if let Some(pid) = pid {
                    if let Err(e) = self.killer.kill_pid(pid) {
                        warn!(%platform, %stage, pid, error = %e, "Termination stage failed");
                    }
                }
            }
            Stage::Ceiling => {
                if !termination.schedule.is_closed() {
                    warn!(%platform, ?pid, "Producer not confirmed closed before the ceiling");
                }
                self.notify_stopped();
            }
        }
    }

    fn notify_stopped(&mut self) {
        if let Phase::Stopping(termination) = &mut self.phase {
            if termination.schedule.claim_notification() {
                info!(platform = %self.platform, "Stream stopped");
                self.emitter.emit(StreamEvent::stopped(self.platform));
            }
        }
    }

    fn finish_termination_if_done(&mut self) {
        if !matches!(&self.phase, Phase::Stopping(t) if t.schedule.is_finished()) {
            return;
        }
        self.phase = Phase::Idle;
        if let Some(options) = self.queued.take() {
            self.start_session(options);
        }
    }

    /// Stop whatever is live and drive the termination to completion,
    /// ignoring further commands.
    async fn finish_all(&mut self) {
        self.queued = None;
        self.begin_stop();

        while matches!(self.phase, Phase::Stopping(_)) {
            let stage_deadline = self.stage_deadline();
            tokio::select! {
                Some(message) = self.messages_rx.recv() => self.handle_message(message),
                () = sleep_until_opt(stage_deadline) => self.advance_termination(Instant::now()),
            }
        }
    }
}
