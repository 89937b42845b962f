//! # abbrev-core
//!
//! Correlation and formatting core of the abbrev reporter.
//!
//! This crate provides:
//! - The task command ledger that deduplicates commands per task
//! - Pure line renderers for banners, issued commands and completions
//! - The `Reporter` dispatcher that drives console and durable sink
//! - Console and sink collaborators, including a size-rotated JSONL log
//! - Configuration loading and JSONL event feed parsing

mod config;
mod console;
mod event_reader;
mod ledger;
mod log_file;
mod normalize;
pub mod render;
mod reporter;
mod sink;

pub use config::{ConfigError, ReporterConfig};
pub use console::{BufferConsole, Console, QuietConsole, StdoutConsole};
pub use event_reader::{MalformedLine, parse_line, parse_raw_line};
pub use ledger::{Occurrence, TaskLedger};
pub use log_file::{DEFAULT_KEEP, DEFAULT_MAX_BYTES, RotatingFile};
pub use normalize::{DEFAULT_ENV_PREFIX_PATTERN, Normalizer};
pub use render::{Palette, SessionClock};
pub use reporter::{Reporter, UNKNOWN_SEQUENCE};
pub use sink::{DurableSink, JsonlSink, MemorySink, Record, SinkError};
