//! Capturing the process's own stdout and stderr into the rotated file.
//!
//! The standard streams are redirected at the descriptor level, so output
//! from child processes and from code that writes to fd 1/2 directly follows
//! the log file across rotations too.

use crate::opener::LogHandle;
use crate::sink::OutputRedirector;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, RawFd};

/// One of the process's standard output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdStream {
    Stdout,
    Stderr,
}

impl StdStream {
    fn raw_fd(self) -> RawFd {
        match self {
            StdStream::Stdout => io::stdout().as_raw_fd(),
            StdStream::Stderr => io::stderr().as_raw_fd(),
        }
    }

    fn flush(self) -> io::Result<()> {
        match self {
            StdStream::Stdout => io::stdout().flush(),
            StdStream::Stderr => io::stderr().flush(),
        }
    }
}

impl std::fmt::Display for StdStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StdStream::Stdout => write!(f, "stdout"),
            StdStream::Stderr => write!(f, "stderr"),
        }
    }
}

impl OutputRedirector for StdStream {
    fn set_output(&self, handle: &LogHandle) -> io::Result<()> {
        // Buffered stdout bytes belong to the previous target.
        self.flush()?;
        nix::unistd::dup2(handle.as_raw_fd(), self.raw_fd())?;
        Ok(())
    }
}
