use crate::trigger::Trigger;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration loaded from logrot.toml.
#[derive(Debug, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct LogrotConfig {
    pub rotation: RotationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// File that is appended to and reopened on rotation.
    pub path: PathBuf,
    pub trigger: Trigger,
    pub capture_stdout: bool,
    pub capture_stderr: bool,
    /// Emit a notice whenever the trigger fires.
    pub announce: bool,
    /// 0 waits for the listener indefinitely.
    pub close_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub filter: String,
}

/// Errors that can occur while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

impl RotationConfig {
    pub fn close_timeout(&self) -> Option<Duration> {
        match self.close_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LogrotConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<LogrotConfig, ConfigError> {
    match load_config(path) {
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(LogrotConfig::default())
        }
        other => other,
    }
}

// --- Default implementations ---

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logrot.log"),
            trigger: Trigger::Hup,
            capture_stdout: false,
            capture_stderr: false,
            announce: true,
            close_timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "logrot=info".to_string(),
        }
    }
}
