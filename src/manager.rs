//! Public entry point: keep sinks writing to a file that is reopened on demand.
//!
//! ```text
//! start:  subscribe trigger → open file → bind sinks → spawn listener
//! rotate: open new handle → rebind sinks → close old handle
//! close:  signal listener → listener closes current handle → join
//! ```

use crate::error::RotateError;
use crate::listener::{Command, Listener, RotationStats};
use crate::sink::{MessageSink, OutputRedirector, Verbosity};
use crate::state::{RotationOutcome, RotationState};
use crate::stdio::StdStream;
use crate::trigger::Trigger;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// Queue depth for administrative requests.
const COMMAND_QUEUE: usize = 16;

/// Configures and starts a [`RotationManager`].
pub struct RotationBuilder {
    path: PathBuf,
    sinks: Vec<Arc<dyn OutputRedirector>>,
    trigger: Trigger,
    capture_stdout: bool,
    capture_stderr: bool,
    message_sink: Option<Arc<dyn MessageSink>>,
    close_timeout: Option<Duration>,
}

impl RotationBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sinks: Vec::new(),
            trigger: Trigger::default(),
            capture_stdout: false,
            capture_stderr: false,
            message_sink: None,
            close_timeout: None,
        }
    }

    pub fn sink(mut self, sink: impl OutputRedirector + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    pub fn sinks(mut self, sinks: impl IntoIterator<Item = Arc<dyn OutputRedirector>>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Redirect the process's stdout to the log file as well.
    pub fn capture_stdout(mut self, enabled: bool) -> Self {
        self.capture_stdout = enabled;
        self
    }

    /// Redirect the process's stderr to the log file as well.
    pub fn capture_stderr(mut self, enabled: bool) -> Self {
        self.capture_stderr = enabled;
        self
    }

    /// Where rotation notices go. Defaults to the `tracing` passthrough.
    pub fn message_sink(mut self, sink: Arc<dyn MessageSink>) -> Self {
        self.message_sink = Some(sink);
        self
    }

    pub fn verbosity(self, verbosity: Verbosity) -> Self {
        self.message_sink(verbosity.message_sink())
    }

    /// Upper bound on how long [`RotationManager::close`] waits for the listener.
    pub fn close_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// Open the file, bind every sink, and start listening for the trigger.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> Result<RotationManager, RotateError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|e| RotateError::Subscribe {
                trigger: self.trigger.name().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e),
            })?;

        let trigger = self.trigger.subscribe()?;

        let mut sinks = self.sinks;
        if self.capture_stdout {
            sinks.push(Arc::new(StdStream::Stdout));
        }
        if self.capture_stderr {
            sinks.push(Arc::new(StdStream::Stderr));
        }
        let state = RotationState::open(&self.path, sinks)?;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (stats_tx, stats_rx) = watch::channel(RotationStats::default());

        tracing::info!(
            path = %self.path.display(),
            trigger = self.trigger.name(),
            sinks = state.sink_count(),
            "log rotation started"
        );

        let listener = Listener {
            state,
            trigger,
            commands: command_rx,
            shutdown: shutdown_rx,
            announcer: self
                .message_sink
                .unwrap_or_else(|| Verbosity::Active.message_sink()),
            stats: stats_tx,
        };
        let handle = runtime.spawn(listener.run());

        Ok(RotationManager {
            path: self.path,
            trigger: self.trigger,
            commands: command_tx,
            shutdown: Some(shutdown_tx),
            listener: Some(handle),
            stats: stats_rx,
            close_timeout: self.close_timeout,
        })
    }
}

/// Keeps a set of sinks writing to `path`, reopening it whenever the trigger fires.
///
/// Call [`close`](Self::close) on every exit path. Dropping the manager
/// stops the listener too, but without waiting for the final flush.
pub struct RotationManager {
    path: PathBuf,
    trigger: Trigger,
    commands: mpsc::Sender<Command>,
    shutdown: Option<oneshot::Sender<()>>,
    listener: Option<JoinHandle<Option<std::io::Error>>>,
    stats: watch::Receiver<RotationStats>,
    close_timeout: Option<Duration>,
}

impl RotationManager {
    pub fn builder(path: impl Into<PathBuf>) -> RotationBuilder {
        RotationBuilder::new(path)
    }

    /// Rotate `path` for `sinks` on SIGHUP.
    pub fn start(
        path: impl Into<PathBuf>,
        sinks: Vec<Arc<dyn OutputRedirector>>,
    ) -> Result<Self, RotateError> {
        RotationBuilder::new(path).sinks(sinks).start()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_none()
    }

    /// Reopen the file now, serialized with trigger-driven rotations.
    ///
    /// A failed open leaves the previous handle in place and is returned here.
    pub async fn rotate(&self) -> Result<RotationOutcome, RotateError> {
        let (reply, outcome) = oneshot::channel();
        self.send(Command::Rotate { reply }).await?;
        outcome.await.map_err(|_| RotateError::Closed)?
    }

    /// Register a sink after start; it is bound to the current handle immediately.
    pub async fn add_sink(&self, sink: Arc<dyn OutputRedirector>) -> Result<(), RotateError> {
        let (reply, bound) = oneshot::channel();
        self.send(Command::AddSink { sink, reply }).await?;
        bound
            .await
            .map_err(|_| RotateError::Closed)?
            .map_err(|e| RotateError::Redirect { source: e })
    }

    /// Latest rotation counters.
    pub fn stats(&self) -> RotationStats {
        self.stats.borrow().clone()
    }

    /// Watch rotation counters; the channel closes when the listener stops.
    pub fn subscribe(&self) -> watch::Receiver<RotationStats> {
        self.stats.clone()
    }

    /// Stop the listener and close the current handle.
    ///
    /// A rotation already in flight finishes first. A failed flush of the
    /// final handle is returned as [`RotateError::Flush`].
    ///
    /// Idempotent: later calls return `Ok(())` immediately.
    pub async fn close(&mut self) -> Result<(), RotateError> {
        let Some(shutdown) = self.shutdown.take() else {
            return Ok(());
        };
        // Never blocks: the oneshot buffers the request if a rotation is running.
        let _ = shutdown.send(());

        let Some(mut listener) = self.listener.take() else {
            return Ok(());
        };
        let joined = match self.close_timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut listener).await {
                Ok(joined) => joined,
                Err(_) => {
                    listener.abort();
                    tracing::warn!(
                        path = %self.path.display(),
                        timeout_ms = limit.as_millis() as u64,
                        "rotation listener unresponsive, aborted"
                    );
                    return Err(RotateError::ShutdownTimeout { after: limit });
                }
            },
            None => listener.await,
        };
        if let Some(source) = joined.map_err(|e| RotateError::Listener { source: e })? {
            return Err(RotateError::Flush {
                path: self.path.clone(),
                source,
            });
        }
        tracing::debug!(path = %self.path.display(), "log rotation closed");
        Ok(())
    }

    async fn send(&self, command: Command) -> Result<(), RotateError> {
        if self.is_closed() {
            return Err(RotateError::Closed);
        }
        self.commands
            .send(command)
            .await
            .map_err(|_| RotateError::Closed)
    }
}

impl std::fmt::Debug for RotationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationManager")
            .field("path", &self.path)
            .field("trigger", &self.trigger)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Write `sinks` to `path`, reopening it on SIGHUP.
pub fn write_to(
    path: impl Into<PathBuf>,
    sinks: Vec<Arc<dyn OutputRedirector>>,
) -> Result<RotationManager, RotateError> {
    RotationManager::start(path, sinks)
}

/// Like [`write_to`], and also capture the process's stdout and stderr.
pub fn write_all_to(
    path: impl Into<PathBuf>,
    sinks: Vec<Arc<dyn OutputRedirector>>,
) -> Result<RotationManager, RotateError> {
    RotationBuilder::new(path)
        .sinks(sinks)
        .capture_stdout(true)
        .capture_stderr(true)
        .start()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opener::LogHandle;
    use crate::sink::LogWriter;
    use std::collections::HashSet;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::tempdir;

    fn start_manual(path: &Path, writer: &LogWriter) -> RotationManager {
        RotationManager::builder(path)
            .sink(writer.clone())
            .trigger(Trigger::Manual)
            .verbosity(Verbosity::Suppressed)
            .start()
            .unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        lines: Mutex<Vec<String>>,
    }

    impl MessageSink for Recorder {
        fn emit(&self, line: &str) {
            self.lines.lock().unwrap().push(line.to_string());
        }
    }

    /// Counts redirects and records whether two ever overlapped.
    #[derive(Default)]
    struct OverlapProbe {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    impl OutputRedirector for OverlapProbe {
        fn set_output(&self, _handle: &LogHandle) -> io::Result<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(10));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Blocks every redirect after the first until released.
    struct GatedSink {
        calls: AtomicUsize,
        entered: Mutex<Option<oneshot::Sender<()>>>,
        release: Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl GatedSink {
        fn new() -> (Arc<Self>, oneshot::Receiver<()>, std::sync::mpsc::Sender<()>) {
            let (entered_tx, entered_rx) = oneshot::channel();
            let (release_tx, release_rx) = std::sync::mpsc::channel();
            let sink = Arc::new(Self {
                calls: AtomicUsize::new(0),
                entered: Mutex::new(Some(entered_tx)),
                release: Mutex::new(release_rx),
            });
            (sink, entered_rx, release_tx)
        }
    }

    impl OutputRedirector for GatedSink {
        fn set_output(&self, _handle: &LogHandle) -> io::Result<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(());
            }
            if let Some(entered) = self.entered.lock().unwrap().take() {
                let _ = entered.send(());
            }
            let _ = self.release.lock().unwrap().recv();
            Ok(())
        }
    }

    fn start_gated(
        path: &Path,
        sink: &Arc<GatedSink>,
        timeout: Option<Duration>,
    ) -> RotationManager {
        RotationManager::builder(path)
            .sinks([sink.clone() as Arc<dyn OutputRedirector>])
            .trigger(Trigger::Manual)
            .verbosity(Verbosity::Suppressed)
            .close_timeout(timeout)
            .start()
            .unwrap()
    }

    #[tokio::test]
    async fn test_single_sink_writes_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let writer = LogWriter::new();
        let mut manager = start_manual(&path, &writer);

        writer.write_line("A").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A\n");

        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_rotate_after_external_rename() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let old = dir.path().join("log.txt.old");
        let writer = LogWriter::new();
        let mut manager = start_manual(&path, &writer);

        writer.write_line("some log").unwrap();
        std::fs::rename(&path, &old).unwrap();
        writer.write_line("new filename").unwrap();
        assert!(!path.exists());

        let outcome = manager.rotate().await.unwrap();
        assert_eq!(outcome.sinks_rebound, 1);
        assert!(path.exists());

        writer.write_line("This is after rotation").unwrap();
        assert_eq!(
            std::fs::read_to_string(&old).unwrap(),
            "some log\nnew filename\n"
        );
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "This is after rotation\n"
        );

        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_immediately_leaves_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let writer = LogWriter::new();
        let mut manager = start_manual(&path, &writer);

        manager.close().await.unwrap();
        assert!(manager.is_closed());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn test_close_twice_is_harmless() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let writer = LogWriter::new();
        let mut manager = start_manual(&path, &writer);

        manager.close().await.unwrap();
        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_with_timeout_on_healthy_listener() {
        let dir = tempdir().unwrap();
        let mut manager = RotationManager::builder(dir.path().join("log.txt"))
            .trigger(Trigger::Manual)
            .close_timeout(Some(Duration::from_secs(5)))
            .start()
            .unwrap();

        manager.close().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_close_during_rotation_waits_for_it() {
        let dir = tempdir().unwrap();
        let (sink, entered, release) = GatedSink::new();
        let mut manager = start_gated(&dir.path().join("log.txt"), &sink, None);
        let mut watch = manager.subscribe();

        let (reply, outcome) = oneshot::channel();
        manager.commands.send(Command::Rotate { reply }).await.unwrap();
        entered.await.unwrap();

        let (closed, ()) = tokio::join!(manager.close(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            release.send(()).unwrap();
        });
        closed.unwrap();

        let outcome = outcome.await.unwrap().unwrap();
        assert_eq!(outcome.sinks_rebound, 1);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
        assert_eq!(manager.stats().rotations, 1);
        assert!(manager.is_closed());
        watch.borrow_and_update();
        assert!(watch.changed().await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_close_times_out_on_stalled_listener() {
        let dir = tempdir().unwrap();
        let limit = Duration::from_millis(100);
        let (sink, entered, release) = GatedSink::new();
        let mut manager = start_gated(&dir.path().join("log.txt"), &sink, Some(limit));

        let (reply, _outcome) = oneshot::channel();
        manager.commands.send(Command::Rotate { reply }).await.unwrap();
        entered.await.unwrap();

        let started = std::time::Instant::now();
        let err = manager.close().await.unwrap_err();
        assert!(matches!(err, RotateError::ShutdownTimeout { after } if after == limit));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(manager.is_closed());
        manager.close().await.unwrap();

        release.send(()).unwrap();
    }

    #[tokio::test]
    async fn test_close_reports_final_flush_failure() {
        // Character devices reject fdatasync with EINVAL.
        let mut manager = RotationManager::builder("/dev/null")
            .trigger(Trigger::Manual)
            .verbosity(Verbosity::Suppressed)
            .start()
            .unwrap();

        match manager.close().await {
            Err(RotateError::Flush { path, source }) => {
                assert_eq!(path, PathBuf::from("/dev/null"));
                assert_eq!(source.raw_os_error(), Some(nix::errno::Errno::EINVAL as i32));
            }
            other => panic!("expected Flush error, got {other:?}"),
        }
        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_start_on_directory_fails_with_os_error() {
        let dir = tempdir().unwrap();
        let err = RotationManager::builder(dir.path())
            .trigger(Trigger::Manual)
            .start()
            .unwrap_err();

        match err {
            RotateError::Open { source, .. } => {
                assert_eq!(source.raw_os_error(), Some(nix::errno::Errno::EISDIR as i32));
            }
            other => panic!("expected Open error, got {other:?}"),
        }
    }

    #[test]
    fn test_start_outside_runtime_is_an_error() {
        let dir = tempdir().unwrap();
        let err = RotationManager::builder(dir.path().join("log.txt"))
            .trigger(Trigger::Manual)
            .start()
            .unwrap_err();
        assert!(matches!(err, RotateError::Subscribe { .. }));
        assert!(!dir.path().join("log.txt").exists());
    }

    #[tokio::test]
    async fn test_rotate_after_close_is_rejected() {
        let dir = tempdir().unwrap();
        let writer = LogWriter::new();
        let mut manager = start_manual(&dir.path().join("log.txt"), &writer);

        manager.close().await.unwrap();
        assert!(matches!(manager.rotate().await, Err(RotateError::Closed)));
        assert!(matches!(
            manager.add_sink(Arc::new(LogWriter::new())).await,
            Err(RotateError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_failed_rotation_keeps_writing_to_original_file() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        let moved = dir.path().join("logs-moved");
        std::fs::create_dir(&logs).unwrap();
        let writer = LogWriter::new();
        let mut manager = start_manual(&logs.join("log.txt"), &writer);
        writer.write_line("before").unwrap();

        std::fs::rename(&logs, &moved).unwrap();
        let err = manager.rotate().await.unwrap_err();
        assert!(matches!(err, RotateError::Open { .. }));

        writer.write_line("after failed rotate").unwrap();
        assert_eq!(
            std::fs::read_to_string(moved.join("log.txt")).unwrap(),
            "before\nafter failed rotate\n"
        );
        let stats = manager.stats();
        assert_eq!(stats.rotations, 0);
        assert_eq!(stats.failed_rotations, 1);

        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_back_to_back_rotations_never_overlap() {
        let dir = tempdir().unwrap();
        let probe = Arc::new(OverlapProbe::default());
        let mut manager = RotationManager::builder(dir.path().join("log.txt"))
            .sinks([probe.clone() as Arc<dyn OutputRedirector>])
            .trigger(Trigger::Manual)
            .verbosity(Verbosity::Suppressed)
            .start()
            .unwrap();

        let (first, second) = tokio::join!(manager.rotate(), manager.rotate());
        first.unwrap();
        second.unwrap();

        assert_eq!(probe.calls.load(Ordering::SeqCst), 3);
        assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(manager.stats().rotations, 2);

        manager.close().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_writes_survive_rotation() {
        const THREADS: usize = 4;
        const LINES: usize = 500;

        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let old = dir.path().join("log.txt.old");
        let writer = LogWriter::new();
        let mut manager = start_manual(&path, &writer);

        writer.write_line("pre-rotation").unwrap();

        let producers: Vec<_> = (0..THREADS)
            .map(|t| {
                let writer = writer.clone();
                std::thread::spawn(move || {
                    for n in 0..LINES {
                        writer.write_line(&format!("thread-{t}-line-{n}")).unwrap();
                        if n % 50 == 0 {
                            std::thread::yield_now();
                        }
                    }
                })
            })
            .collect();

        std::fs::rename(&path, &old).unwrap();
        manager.rotate().await.unwrap();
        writer.write_line("post-rotation").unwrap();

        for producer in producers {
            producer.join().unwrap();
        }
        manager.close().await.unwrap();

        let old_contents = std::fs::read_to_string(&old).unwrap();
        let new_contents = std::fs::read_to_string(&path).unwrap();
        assert!(old_contents.starts_with("pre-rotation\n"));
        assert!(new_contents.contains("post-rotation\n"));
        assert!(!old_contents.contains("post-rotation"));

        let mut seen = HashSet::new();
        for line in old_contents.lines().chain(new_contents.lines()) {
            if line == "pre-rotation" || line == "post-rotation" {
                continue;
            }
            assert!(line.starts_with("thread-"), "mangled line: {line:?}");
            assert!(seen.insert(line.to_string()), "duplicated line: {line}");
        }
        assert_eq!(seen.len(), THREADS * LINES);
    }

    #[tokio::test]
    async fn test_add_sink_follows_rotation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let old = dir.path().join("log.txt.old");
        let first = LogWriter::new();
        let mut manager = start_manual(&path, &first);

        let late = LogWriter::new();
        manager.add_sink(Arc::new(late.clone())).await.unwrap();
        late.write_line("late before").unwrap();

        std::fs::rename(&path, &old).unwrap();
        manager.rotate().await.unwrap();
        late.write_line("late after").unwrap();

        assert_eq!(std::fs::read_to_string(&old).unwrap(), "late before\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "late after\n");

        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_rotation_notice_goes_to_message_sink() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let recorder = Arc::new(Recorder::default());
        let mut manager = RotationManager::builder(&path)
            .trigger(Trigger::Manual)
            .message_sink(recorder.clone())
            .start()
            .unwrap();

        manager.rotate().await.unwrap();

        let lines = recorder.lines.lock().unwrap().clone();
        assert_eq!(
            lines,
            vec![format!(
                "rotation request received - rotating log file handle on {}",
                path.display()
            )]
        );

        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_stats_track_rotations() {
        let dir = tempdir().unwrap();
        let writer = LogWriter::new();
        let mut manager = start_manual(&dir.path().join("log.txt"), &writer);
        assert_eq!(manager.stats(), RotationStats::default());

        let mut watch = manager.subscribe();
        manager.rotate().await.unwrap();
        watch.changed().await.unwrap();

        let stats = watch.borrow().clone();
        assert_eq!(stats.rotations, 1);
        assert_eq!(stats.failed_rotations, 0);
        assert!(stats.last_rotated_at.is_some());

        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropping_manager_stops_listener() {
        let dir = tempdir().unwrap();
        let writer = LogWriter::new();
        let manager = start_manual(&dir.path().join("log.txt"), &writer);
        let mut watch = manager.subscribe();

        drop(manager);
        let stopped = tokio::time::timeout(Duration::from_secs(5), watch.changed()).await;
        assert!(matches!(stopped, Ok(Err(_))));
    }

    #[tokio::test]
    async fn test_write_to_rotates_on_hangup_by_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let writer = LogWriter::new();
        let sinks: Vec<Arc<dyn OutputRedirector>> = vec![Arc::new(writer.clone())];
        let mut manager = write_to(&path, sinks).unwrap();

        assert_eq!(manager.trigger(), Trigger::Hup);
        assert_eq!(manager.path(), path);
        writer.write_line("via factory").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "via factory\n");

        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_debug_shows_path_and_state() {
        let dir = tempdir().unwrap();
        let writer = LogWriter::new();
        let mut manager = start_manual(&dir.path().join("log.txt"), &writer);

        let shown = format!("{manager:?}");
        assert!(shown.contains("log.txt"));
        assert!(shown.contains("closed: false"));
        assert_eq!(manager.trigger(), Trigger::Manual);

        manager.close().await.unwrap();
    }
}
