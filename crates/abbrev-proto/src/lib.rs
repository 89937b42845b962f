//! # abbrev-proto
//!
//! Shared types for the abbrev reporter.
//!
//! This crate defines the in-process "protocol" between a remote-execution
//! transport and the reporter:
//! - `ExecutionEvent`, the tagged union of task, command and log events
//! - `Verbosity` levels used for console filtering
//! - `InvocationId` for correlating a command's start and finish
//! - Common error types

mod error;
mod event;
mod verbosity;

pub use error::{Error, Result};
pub use event::{
    CommandCompleted, CommandIssued, ExecutionEvent, InvocationId, LogMessage, TaskStarted,
};
pub use verbosity::Verbosity;
