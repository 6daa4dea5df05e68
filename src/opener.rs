//! Opening log files for append-only writing.
//!
//! Every handle the manager hands to a sink comes from [`open_for_append`],
//! so all sinks share one descriptor per generation of the file.

use crate::error::RotateError;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::sync::Arc;

/// Shared, open, append-mode handle to a log file.
///
/// The descriptor closes once the manager and every writer that snapshotted
/// it have dropped their reference.
pub type LogHandle = Arc<File>;

/// Permission bits for newly created log files (before umask).
pub const LOG_FILE_MODE: u32 = 0o644;

/// Open `path` for appending, creating it with mode 0644 if missing.
pub fn open_for_append(path: &Path) -> Result<LogHandle, RotateError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(LOG_FILE_MODE)
        .open(path)
        .map_err(|e| RotateError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
    tracing::debug!(path = %path.display(), "opened log file for append");
    Ok(Arc::new(file))
}
