//! Command line normalization.
//!
//! Transports often wrap commands in an environment shim (`/usr/bin/env ls`).
//! The shim is stripped so that wrapped and bare forms of the same command
//! share one ledger entry.

use regex::Regex;

/// Default shim prefix pattern.
pub const DEFAULT_ENV_PREFIX_PATTERN: &str = "^/usr/bin/env ";

/// Strips a leading environment-invocation prefix from command lines.
#[derive(Debug, Clone)]
pub struct Normalizer {
    prefix: Regex,
}

impl Normalizer {
    /// Builds a normalizer from a prefix pattern.
    ///
    /// Patterns that are not anchored are anchored at the start of the line.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let anchored = if pattern.starts_with('^') {
            pattern.to_string()
        } else {
            format!("^(?:{})", pattern)
        };
        Ok(Self {
            prefix: Regex::new(&anchored)?,
        })
    }

    /// Returns the correlation key for a command line.
    pub fn normalize<'a>(&self, command: &'a str) -> std::borrow::Cow<'a, str> {
        self.prefix.replacen(command, 1, "")
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            prefix: Regex::new(DEFAULT_ENV_PREFIX_PATTERN).expect("default pattern is valid"),
        }
    }
}
