//! Errors surfaced by the rotation manager and its listener.

use std::path::PathBuf;
use std::time::Duration;

/// Everything that can go wrong while opening, rotating, or closing a log file.
#[derive(Debug)]
pub enum RotateError {
    /// The log file could not be opened for appending.
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Subscribing to the rotation trigger failed.
    Subscribe {
        trigger: String,
        source: std::io::Error,
    },
    /// A sink registered after start rejected the current handle.
    Redirect { source: std::io::Error },
    /// The manager was closed, or its listener is no longer running.
    Closed,
    /// The final handle could not be flushed when the manager closed.
    Flush {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The listener did not stop within the configured close timeout.
    ShutdownTimeout { after: Duration },
    /// The listener task panicked or was cancelled.
    Listener { source: tokio::task::JoinError },
}

impl std::fmt::Display for RotateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RotateError::Open { path, source } => {
                write!(
                    f,
                    "failed to open log file {} for append: {}",
                    path.display(),
                    source
                )
            }
            RotateError::Subscribe { trigger, source } => {
                write!(f, "failed to subscribe to {}: {}", trigger, source)
            }
            RotateError::Redirect { source } => {
                write!(f, "sink rejected the current log handle: {}", source)
            }
            RotateError::Closed => write!(f, "rotation manager is closed"),
            RotateError::Flush { path, source } => {
                write!(f, "failed to flush log file {}: {}", path.display(), source)
            }
            RotateError::ShutdownTimeout { after } => {
                write!(
                    f,
                    "rotation listener did not stop within {}ms",
                    after.as_millis()
                )
            }
            RotateError::Listener { source } => {
                write!(f, "rotation listener failed: {}", source)
            }
        }
    }
}

impl std::error::Error for RotateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RotateError::Open { source, .. } => Some(source),
            RotateError::Subscribe { source, .. } => Some(source),
            RotateError::Redirect { source } => Some(source),
            RotateError::Flush { source, .. } => Some(source),
            RotateError::Listener { source } => Some(source),
            RotateError::Closed | RotateError::ShutdownTimeout { .. } => None,
        }
    }
}
