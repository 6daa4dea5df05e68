//! Sink capabilities the rotation manager drives, plus the adapters that
//! implement them.
//!
//! A sink only needs [`OutputRedirector`]: something whose output target can
//! be pointed at a new [`LogHandle`]. [`MessageSink`] is the optional channel
//! for the rotation notice.

use crate::opener::LogHandle;
use arc_swap::ArcSwapOption;
use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// A consumer whose output target can be redirected to a log handle.
///
/// Called from the manager's background task while other threads may be
/// writing through the same sink, so implementations must make the swap
/// atomic with respect to their own writes.
pub trait OutputRedirector: Send + Sync {
    fn set_output(&self, handle: &LogHandle) -> io::Result<()>;
}

/// Accepts one formatted diagnostic line. Best-effort: no error is returned.
pub trait MessageSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Redirectable writer shared by any number of producers.
///
/// Clones share the same target. Each write snapshots the current handle and
/// writes the whole buffer to it, so one `write_all` or `write!` call lands
/// entirely in either the old or the new file. Unbound writers fall back to stderr.
#[derive(Clone, Default)]
pub struct LogWriter {
    target: Arc<ArcSwapOption<File>>,
}

impl LogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a log handle has been attached yet.
    pub fn is_bound(&self) -> bool {
        self.target.load().is_some()
    }

    /// Capture the current target for a sequence of writes.
    pub fn snapshot(&self) -> TargetWriter {
        TargetWriter {
            target: self.target.load_full(),
        }
    }

    /// Write `line` followed by a newline as a single append.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        if !line.ends_with('\n') {
            buf.push(b'\n');
        }
        self.snapshot().write_all(&buf)
    }
}

impl std::fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogWriter")
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl OutputRedirector for LogWriter {
    fn set_output(&self, handle: &LogHandle) -> io::Result<()> {
        self.target.store(Some(Arc::clone(handle)));
        Ok(())
    }
}

impl MessageSink for LogWriter {
    fn emit(&self, line: &str) {
        let _ = self.write_line(line);
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.snapshot().write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.snapshot().write_all(buf)
    }

    // Format first, then snapshot, so one `writeln!` is one append.
    fn write_fmt(&mut self, args: std::fmt::Arguments<'_>) -> io::Result<()> {
        let buf = render(args)?;
        self.snapshot().write_all(buf.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.snapshot().flush()
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = TargetWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.snapshot()
    }
}

/// A [`LogWriter`] target pinned at the moment it was taken.
///
/// Holding one keeps the underlying descriptor open even if the manager has
/// since rotated away from it.
pub struct TargetWriter {
    target: Option<LogHandle>,
}

impl Write for TargetWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.target {
            Some(file) => (&**file).write(buf),
            None => io::stderr().write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match &self.target {
            Some(file) => (&**file).write_all(buf),
            None => io::stderr().write_all(buf),
        }
    }

    fn write_fmt(&mut self, args: std::fmt::Arguments<'_>) -> io::Result<()> {
        let buf = render(args)?;
        self.write_all(buf.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.target {
            Some(file) => (&**file).flush(),
            None => io::stderr().flush(),
        }
    }
}

/// Render formatting arguments into one buffer ahead of a single write.
fn render(args: std::fmt::Arguments<'_>) -> io::Result<String> {
    let mut buf = String::new();
    std::fmt::Write::write_fmt(&mut buf, args)
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "formatter error"))?;
    Ok(buf)
}

/// Passthrough to the process's `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl MessageSink for TracingSink {
    fn emit(&self, line: &str) {
        tracing::info!("{line}");
    }
}

/// Discards everything; accepts every redirect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl MessageSink for NoopSink {
    fn emit(&self, _line: &str) {}
}

impl OutputRedirector for NoopSink {
    fn set_output(&self, _handle: &LogHandle) -> io::Result<()> {
        Ok(())
    }
}

/// Whether rotation diagnostics are reported or suppressed.
///
/// Chosen once when a manager is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Active,
    Suppressed,
}

impl Verbosity {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Verbosity::Active
        } else {
            Verbosity::Suppressed
        }
    }

    /// The diagnostics sink for this verbosity.
    pub fn message_sink(self) -> Arc<dyn MessageSink> {
        match self {
            Verbosity::Active => Arc::new(TracingSink),
            Verbosity::Suppressed => Arc::new(NoopSink),
        }
    }
}
