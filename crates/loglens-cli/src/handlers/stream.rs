//! `android` and `ios` streaming handlers.
//!
//! Runs one controller until the producer exits or the user presses Ctrl-C,
//! printing batches as they arrive.

use std::io;
use std::sync::Arc;

use anyhow::Result;
use loglens_core::{ChannelEmitter, KeywordFilter, LogPanel, StreamEvent, StreamOptions};
use loglens_runtime::{ControllerError, ControllerPorts, StreamController, SystemKiller};
use tracing::{debug, info};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::entries::exit_status_label;
use crate::presentation::{EntryPrinter, status_line, use_color};

/// How a streaming session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Stopped on request.
    Stopped,
    /// The producer exited by itself.
    Exited {
        code: Option<i32>,
        signal: Option<i32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Done(StreamOutcome),
    /// The producer never started.
    Failed(String),
}

/// What the event loop does after `event`.
pub(crate) fn next_flow(event: &StreamEvent, started: bool) -> Flow {
    match event {
        StreamEvent::Error { error, .. } if !started => Flow::Failed(error.clone()),
        StreamEvent::Exit { code, signal, .. } => Flow::Done(StreamOutcome::Exited {
            code: *code,
            signal: *signal,
        }),
        StreamEvent::Stopped { .. } => Flow::Done(StreamOutcome::Stopped),
        StreamEvent::Started { .. } | StreamEvent::Batch { .. } | StreamEvent::Error { .. } => {
            Flow::Continue
        }
    }
}

/// Map the outcome to the command result. A clean producer exit is not an
/// error.
pub(crate) fn outcome_result(options: &StreamOptions, outcome: StreamOutcome) -> Result<(), CliError> {
    match outcome {
        StreamOutcome::Stopped | StreamOutcome::Exited { code: Some(0), .. } => Ok(()),
        StreamOutcome::Exited { code, signal } => Err(CliError::ProducerExited {
            tool: options.platform().tool().to_string(),
            status: exit_status_label(code, signal),
        }),
    }
}

/// Stream logs for `options` until stopped.
pub async fn execute(ctx: &CliContext, options: StreamOptions, grep: Option<&str>) -> Result<()> {
    let platform = options.platform();
    ctx.resolver
        .resolve(platform.tool())
        .map_err(CliError::from)?;

    let (emitter, mut events) = ChannelEmitter::new();
    let ports = ControllerPorts {
        resolver: Arc::clone(&ctx.resolver),
        emitter: Arc::new(emitter),
        killer: Arc::new(SystemKiller::new()),
    };
    let controller = StreamController::spawn(platform, ctx.settings.clone(), ports);

    let mut printer = EntryPrinter::new(
        io::stdout(),
        LogPanel::new(platform, ctx.settings.max_retained_entries),
        KeywordFilter::new(grep.unwrap_or_default()),
        ctx.json,
        use_color(),
    );

    controller.start(options.clone()).map_err(CliError::from)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut started = false;
    let mut interrupted = false;

    let result = loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break Err(CliError::Controller(ControllerError::Closed(platform)));
                };
                printer.handle(&event)?;
                if !ctx.json {
                    if let Some(status) = status_line(&event) {
                        eprintln!("{status}");
                    }
                }

                match next_flow(&event, started) {
                    Flow::Continue => started |= matches!(event, StreamEvent::Started { .. }),
                    Flow::Done(outcome) => break outcome_result(&options, outcome),
                    Flow::Failed(error) => break Err(CliError::Stream(error)),
                }
            }
            signal = &mut ctrl_c, if !interrupted => {
                signal?;
                info!(%platform, "Interrupted, stopping stream");
                interrupted = true;
                controller.stop().map_err(CliError::from)?;
            }
        }
    };

    debug!(
        %platform,
        retained = printer.panel().store().len(),
        "Stream session finished"
    );
    controller.shutdown().await.map_err(CliError::from)?;
    Ok(result?)
}
