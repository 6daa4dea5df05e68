//! Keep log sinks writing to a named file and reopen it when an external
//! rotation trigger fires, without losing writes made during the swap.
//!
//! ```text
//!  producers ──write──▶ LogWriter / StdStream / custom sinks
//!                              ▲ set_output (rebind)
//!  SIGHUP ─▶ listener task ─▶ RotationState: open new → rebind all → close old
//! ```
//!
//! The usual pattern is an external archiver renaming the file and then
//! signalling the process; the manager opens a fresh file at the same path.
//!
//! ```no_run
//! use logrot::{LogWriter, RotationManager};
//!
//! # async fn demo() -> Result<(), logrot::RotateError> {
//! let writer = LogWriter::new();
//! let mut manager = RotationManager::builder("/var/log/app.log")
//!     .sink(writer.clone())
//!     .start()?;
//! writer.write_line("hello").ok();
//! manager.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
mod listener;
pub mod manager;
pub mod opener;
pub mod sink;
pub mod state;
pub mod stdio;
pub mod trigger;

pub use error::RotateError;
pub use listener::RotationStats;
pub use manager::{write_all_to, write_to, RotationBuilder, RotationManager};
pub use opener::{open_for_append, LogHandle};
pub use sink::{LogWriter, MessageSink, NoopSink, OutputRedirector, TracingSink, Verbosity};
pub use state::RotationOutcome;
pub use stdio::StdStream;
pub use trigger::Trigger;
