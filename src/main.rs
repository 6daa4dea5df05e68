use clap::Parser;
use logrot::config::{self, LogrotConfig};
use logrot::{LogWriter, RotationManager, Trigger, Verbosity};
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

/// Append stdin to a log file, reopening the file whenever the rotation
/// signal arrives so external tools can rename it away.
#[derive(Parser, Debug)]
#[command(name = "logrot", version, about)]
pub struct Cli {
    /// Log file path (overrides config)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Config file path
    #[arg(short, long, default_value = "logrot.toml")]
    config: PathBuf,

    /// Rotation trigger: hup, usr1, usr2 or manual (overrides config)
    #[arg(long)]
    trigger: Option<Trigger>,

    /// Also redirect this process's stdout and stderr into the log file
    #[arg(long)]
    capture_stdio: bool,

    /// Seconds to wait for the rotation listener on shutdown, 0 = forever (overrides config)
    #[arg(long)]
    close_timeout: Option<u64>,

    /// Validate config and print resolved settings, don't run
    #[arg(long)]
    dry_run: bool,

    /// Extra logging (rotation steps, sink rebinding)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut LogrotConfig) {
        if let Some(path) = &self.path {
            config.rotation.path = path.clone();
        }
        if let Some(trigger) = self.trigger {
            config.rotation.trigger = trigger;
        }
        if self.capture_stdio {
            config.rotation.capture_stdout = true;
            config.rotation.capture_stderr = true;
        }
        if let Some(secs) = self.close_timeout {
            config.rotation.close_timeout_secs = secs;
        }
        if self.verbose {
            config.logging.filter = "logrot=debug".to_string();
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match config::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("logrot: {e}");
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!(?cli, "parsed CLI arguments");

    if cli.dry_run {
        println!("path:          {}", config.rotation.path.display());
        println!("trigger:       {}", config.rotation.trigger);
        println!(
            "capture:       stdout={} stderr={}",
            config.rotation.capture_stdout, config.rotation.capture_stderr
        );
        println!("announce:      {}", config.rotation.announce);
        println!("close timeout: {}s", config.rotation.close_timeout_secs);
        return ExitCode::SUCCESS;
    }

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "logrot failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &LogrotConfig) -> Result<(), Box<dyn std::error::Error>> {
    let writer = LogWriter::new();
    let mut manager = RotationManager::builder(&config.rotation.path)
        .sink(writer.clone())
        .trigger(config.rotation.trigger)
        .capture_stdout(config.rotation.capture_stdout)
        .capture_stderr(config.rotation.capture_stderr)
        .verbosity(Verbosity::from_enabled(config.rotation.announce))
        .close_timeout(config.rotation.close_timeout())
        .start()?;

    let copied = copy_stdin(&writer).await;

    let stats = manager.stats();
    let closed = manager.close().await;
    tracing::info!(
        rotations = stats.rotations,
        failed_rotations = stats.failed_rotations,
        "logrot finished"
    );

    copied?;
    closed?;
    Ok(())
}

/// Copy stdin line by line until EOF, SIGINT or SIGTERM.
async fn copy_stdin(writer: &LogWriter) -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut lines = spawn_stdin_reader();
    let mut copied: u64 = 0;

    loop {
        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("received SIGINT, shutting down");
                break;
            }
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM, shutting down");
                break;
            }
            line = lines.recv() => match line {
                Some(line) => {
                    writer.write_line(&line?)?;
                    copied += 1;
                }
                None => {
                    tracing::debug!(lines = copied, "stdin closed");
                    break;
                }
            },
        }
    }

    Ok(())
}

/// Read stdin on a detached thread so a pending read never holds up exit.
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(256);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let failed = line.is_err();
            if tx.blocking_send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}
