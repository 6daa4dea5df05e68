//! External rotation triggers.
//!
//! A manager subscribes to exactly one trigger kind. Signal triggers use
//! tokio's async-safe signal handling; once subscribed, the signal no longer
//! terminates the process, even after the manager closes. `Manual` subscribes to nothing and relies on
//! administrative requests alone.

use crate::error::RotateError;
use serde::Deserialize;
use tokio::signal::unix::{signal, Signal, SignalKind};

/// What makes a manager reopen its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Trigger {
    /// SIGHUP, the conventional "reopen your logs" signal.
    #[default]
    Hup,
    Usr1,
    Usr2,
    /// No signal; rotate only on explicit requests.
    Manual,
}

impl Trigger {
    /// Name used in rotation notices, e.g. `SIGHUP`.
    pub fn name(self) -> &'static str {
        match self {
            Trigger::Hup => "SIGHUP",
            Trigger::Usr1 => "SIGUSR1",
            Trigger::Usr2 => "SIGUSR2",
            Trigger::Manual => "rotation request",
        }
    }

    fn signal_kind(self) -> Option<SignalKind> {
        match self {
            Trigger::Hup => Some(SignalKind::hangup()),
            Trigger::Usr1 => Some(SignalKind::user_defined1()),
            Trigger::Usr2 => Some(SignalKind::user_defined2()),
            Trigger::Manual => None,
        }
    }

    /// Register for this trigger. Must be called inside a tokio runtime.
    ///
    /// tokio never uninstalls a signal handler. From the first subscription
    /// on, this signal is ignored by default for the rest of the process,
    /// including after the manager closes or if `start` fails after
    /// subscribing.
    pub fn subscribe(self) -> Result<TriggerSubscription, RotateError> {
        let signal = match self.signal_kind() {
            Some(kind) => Some(signal(kind).map_err(|e| RotateError::Subscribe {
                trigger: self.name().to_string(),
                source: e,
            })?),
            None => None,
        };
        tracing::debug!(trigger = self.name(), "subscribed to rotation trigger");
        Ok(TriggerSubscription {
            trigger: self,
            signal,
        })
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().trim_start_matches("sig") {
            "hup" => Ok(Trigger::Hup),
            "usr1" => Ok(Trigger::Usr1),
            "usr2" => Ok(Trigger::Usr2),
            "manual" => Ok(Trigger::Manual),
            other => Err(format!(
                "unknown trigger '{other}' (expected hup, usr1, usr2 or manual)"
            )),
        }
    }
}

impl TryFrom<String> for Trigger {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

/// A live trigger registration, owned by the listener task.
///
/// Dropping it releases the subscription.
pub struct TriggerSubscription {
    trigger: Trigger,
    signal: Option<Signal>,
}

impl TriggerSubscription {
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Wait for the next delivery. `Manual` subscriptions never fire.
    ///
    /// Returns `None` once the signal stream can no longer deliver.
    pub async fn recv(&mut self) -> Option<()> {
        match &mut self.signal {
            Some(signal) => signal.recv().await,
            None => std::future::pending().await,
        }
    }
}
