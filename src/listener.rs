//! Background task that owns a manager's rotation state.
//!
//! # State machine
//! ```text
//! Listening ──trigger / rotate request──▶ rotate ──▶ Listening
//! Listening ──shutdown (or manager dropped)──▶ Stopped
//! ```
//!
//! Rotations run inline on this task, so at most one is ever in flight.
//! A shutdown request that arrives mid-rotation waits in its oneshot until
//! the rotation finishes.

use crate::error::RotateError;
use crate::sink::{MessageSink, OutputRedirector};
use crate::state::{RotationOutcome, RotationState};
use crate::trigger::{Trigger, TriggerSubscription};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Counters published after every rotation attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RotationStats {
    pub rotations: u64,
    pub failed_rotations: u64,
    pub sink_failures: u64,
    pub last_rotated_at: Option<DateTime<Utc>>,
}

/// Administrative requests from the manager handle.
pub(crate) enum Command {
    Rotate {
        reply: oneshot::Sender<Result<RotationOutcome, RotateError>>,
    },
    AddSink {
        sink: Arc<dyn OutputRedirector>,
        reply: oneshot::Sender<std::io::Result<()>>,
    },
}

pub(crate) struct Listener {
    pub(crate) state: RotationState,
    pub(crate) trigger: TriggerSubscription,
    pub(crate) commands: mpsc::Receiver<Command>,
    pub(crate) shutdown: oneshot::Receiver<()>,
    pub(crate) announcer: Arc<dyn MessageSink>,
    pub(crate) stats: watch::Sender<RotationStats>,
}

impl Listener {
    /// Returns the error from flushing the final handle, if any.
    pub(crate) async fn run(mut self) -> Option<std::io::Error> {
        let mut trigger_live = true;
        loop {
            tokio::select! {
                biased;
                requested = &mut self.shutdown => {
                    match requested {
                        Ok(()) => tracing::debug!("rotation listener shutdown requested"),
                        Err(_) => tracing::debug!("rotation manager dropped without close"),
                    }
                    break;
                }
                delivered = self.trigger.recv(), if trigger_live => match delivered {
                    Some(()) => {
                        let cause = self.trigger.trigger().name();
                        let _ = self.rotate(cause);
                    }
                    None => {
                        tracing::warn!(
                            trigger = self.trigger.trigger().name(),
                            "rotation trigger stream ended, only explicit requests will rotate"
                        );
                        trigger_live = false;
                    }
                },
                Some(command) = self.commands.recv() => self.handle(command),
                else => break,
            }
        }

        let path = self.state.path().to_path_buf();
        let flushed = self.state.close();
        tracing::info!(path = %path.display(), "rotation listener stopped");
        flushed
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Rotate { reply } => {
                let result = self.rotate(Trigger::Manual.name());
                let _ = reply.send(result);
            }
            Command::AddSink { sink, reply } => {
                let _ = reply.send(self.state.add_sink(sink));
            }
        }
    }

    fn rotate(&mut self, cause: &str) -> Result<RotationOutcome, RotateError> {
        self.announcer.emit(&format!(
            "{} received - rotating log file handle on {}",
            cause,
            self.state.path().display()
        ));

        match self.state.rotate() {
            Ok(outcome) => {
                tracing::info!(
                    path = %self.state.path().display(),
                    cause,
                    sinks_rebound = outcome.sinks_rebound,
                    sink_failures = outcome.sink_failures,
                    "log file rotated"
                );
                let sink_failures = outcome.sink_failures as u64;
                self.stats.send_modify(|stats| {
                    stats.rotations += 1;
                    stats.sink_failures += sink_failures;
                    stats.last_rotated_at = Some(Utc::now());
                });
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    cause,
                    "log rotation failed, continuing on previous handle"
                );
                self.stats.send_modify(|stats| stats.failed_rotations += 1);
                Err(e)
            }
        }
    }
}
