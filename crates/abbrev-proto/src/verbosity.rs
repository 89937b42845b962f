//! Verbosity levels attached to command and log events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Importance of an event, ordered from least to most important.
///
/// Console filtering compares an event's level against a threshold: an event
/// renders only when its level is strictly above the threshold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl Verbosity {
    /// All levels in ascending order.
    pub const ALL: [Verbosity; 6] = [
        Verbosity::Trace,
        Verbosity::Debug,
        Verbosity::Info,
        Verbosity::Warn,
        Verbosity::Error,
        Verbosity::Fatal,
    ];

    /// Returns true if an event at this level passes `threshold`.
    pub fn exceeds(self, threshold: Verbosity) -> bool {
        self > threshold
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verbosity::Trace => "trace",
            Verbosity::Debug => "debug",
            Verbosity::Info => "info",
            Verbosity::Warn => "warn",
            Verbosity::Error => "error",
            Verbosity::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Verbosity::ALL
            .into_iter()
            .find(|level| level.as_str() == lowered)
            .ok_or_else(|| format!("unknown verbosity level '{}'", s))
    }
}
