//! The rotated file's current handle and the sinks bound to it.
//!
//! Owned by the constructing caller until the listener starts, then
//! exclusively by the listener task.

use crate::error::RotateError;
use crate::opener::{open_for_append, LogHandle};
use crate::sink::OutputRedirector;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of pointing every sink at one handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindReport {
    pub rebound: usize,
    pub failed: usize,
}

/// What a completed rotation did.
#[derive(Debug)]
pub struct RotationOutcome {
    /// Sinks now writing to the new handle.
    pub sinks_rebound: usize,
    /// Sinks that rejected the new handle and kept their previous target.
    pub sink_failures: usize,
    /// Error from closing the superseded handle. The rotation stands regardless.
    pub close_error: Option<std::io::Error>,
}

pub struct RotationState {
    path: PathBuf,
    current: LogHandle,
    sinks: Vec<Arc<dyn OutputRedirector>>,
}

impl RotationState {
    /// Open `path` and bind every sink to it.
    pub fn open(
        path: impl Into<PathBuf>,
        sinks: Vec<Arc<dyn OutputRedirector>>,
    ) -> Result<Self, RotateError> {
        let path = path.into();
        let current = open_for_append(&path)?;
        let state = Self {
            path,
            current,
            sinks,
        };
        state.bind_all(&state.current);
        Ok(state)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> &LogHandle {
        &self.current
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Point every sink at `handle`, continuing past sinks that refuse.
    pub fn bind_all(&self, handle: &LogHandle) -> BindReport {
        let mut report = BindReport::default();
        for (index, sink) in self.sinks.iter().enumerate() {
            match sink.set_output(handle) {
                Ok(()) => report.rebound += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        error = %e,
                        sink = index,
                        path = %self.path.display(),
                        "sink rejected new log handle, keeping its previous target"
                    );
                }
            }
        }
        report
    }

    /// Register another sink and bind it to the current handle.
    ///
    /// The sink is kept even if binding fails so the next rotation retries it.
    pub fn add_sink(&mut self, sink: Arc<dyn OutputRedirector>) -> std::io::Result<()> {
        let bound = sink.set_output(&self.current);
        if let Err(e) = &bound {
            tracing::warn!(
                error = %e,
                sink = self.sinks.len(),
                path = %self.path.display(),
                "new sink rejected log handle"
            );
        }
        self.sinks.push(sink);
        bound
    }

    /// Reopen the file at `path` and move every sink onto the new handle.
    ///
    /// If the open fails nothing changes: the old handle stays current and
    /// bound. Otherwise sinks are rebound before the old handle is closed.
    pub fn rotate(&mut self) -> Result<RotationOutcome, RotateError> {
        let fresh = open_for_append(&self.path)?;
        let report = self.bind_all(&fresh);
        let previous = std::mem::replace(&mut self.current, fresh);
        let close_error = close_handle(&self.path, previous);
        Ok(RotationOutcome {
            sinks_rebound: report.rebound,
            sink_failures: report.failed,
            close_error,
        })
    }

    /// Flush and release the current handle.
    pub fn close(self) -> Option<std::io::Error> {
        close_handle(&self.path, self.current)
    }
}

/// Flush `handle` to disk and drop the manager's reference to it.
///
/// Writers still holding a snapshot keep the descriptor open until they
/// finish; the manager never writes through it again.
fn close_handle(path: &Path, handle: LogHandle) -> Option<std::io::Error> {
    let result = handle.sync_data();
    drop(handle);
    match result {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "failed to flush superseded log handle"
            );
            Some(e)
        }
    }
}
