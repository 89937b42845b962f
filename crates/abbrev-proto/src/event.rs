//! Execution event types.
//!
//! Events arrive from a remote-execution transport in the order they happened.
//! A command produces two events: `CommandIssued` when it starts and
//! `CommandCompleted` when it finishes. The two are linked by an optional
//! `InvocationId` and, failing that, by task name plus command text.

use crate::{Error, Result, Verbosity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An event produced while executing tasks on remote hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ExecutionEvent {
    /// A task began executing.
    #[serde(rename = "task.started")]
    TaskStarted(TaskStarted),

    /// A shell command was sent to a host.
    #[serde(rename = "command.issued")]
    CommandIssued(CommandIssued),

    /// A previously issued command finished.
    #[serde(rename = "command.completed")]
    CommandCompleted(CommandCompleted),

    /// Free-form log output from the execution transport.
    #[serde(rename = "log.message")]
    LogMessage(LogMessage),
}

impl ExecutionEvent {
    /// Decodes one JSONL line into an event.
    pub fn from_json_line(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Err(Error::EmptyLine);
        }
        Ok(serde_json::from_str(line)?)
    }

    /// Returns the event's type tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionEvent::TaskStarted(_) => "task.started",
            ExecutionEvent::CommandIssued(_) => "command.issued",
            ExecutionEvent::CommandCompleted(_) => "command.completed",
            ExecutionEvent::LogMessage(_) => "log.message",
        }
    }

    /// Returns the task name stamped on the event, if any.
    ///
    /// An empty name counts as "not stamped".
    pub fn task_name(&self) -> Option<&str> {
        let name = match self {
            ExecutionEvent::TaskStarted(e) => e.task_name.as_str(),
            ExecutionEvent::CommandIssued(e) => e.task_name.as_str(),
            ExecutionEvent::CommandCompleted(e) => e.task_name.as_str(),
            ExecutionEvent::LogMessage(_) => return None,
        };
        (!name.is_empty()).then_some(name)
    }
}

impl From<TaskStarted> for ExecutionEvent {
    fn from(event: TaskStarted) -> Self {
        ExecutionEvent::TaskStarted(event)
    }
}

impl From<CommandIssued> for ExecutionEvent {
    fn from(event: CommandIssued) -> Self {
        ExecutionEvent::CommandIssued(event)
    }
}

impl From<CommandCompleted> for ExecutionEvent {
    fn from(event: CommandCompleted) -> Self {
        ExecutionEvent::CommandCompleted(event)
    }
}

impl From<LogMessage> for ExecutionEvent {
    fn from(event: LogMessage) -> Self {
        ExecutionEvent::LogMessage(event)
    }
}

/// Identifier assigned by the transport to one command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(String);

impl InvocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InvocationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A task began executing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStarted {
    pub task_name: String,
}

impl TaskStarted {
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
        }
    }
}

/// A shell command was sent to a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandIssued {
    /// Owning task. Empty when the producer did not stamp it.
    #[serde(default)]
    pub task_name: String,

    /// The full command line, before normalization.
    pub command: String,

    #[serde(default)]
    pub verbosity: Verbosity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<InvocationId>,
}

impl CommandIssued {
    pub fn new(task_name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            command: command.into(),
            verbosity: Verbosity::default(),
            invocation_id: None,
        }
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_invocation_id(mut self, id: impl Into<InvocationId>) -> Self {
        self.invocation_id = Some(id.into());
        self
    }
}

/// A previously issued command finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandCompleted {
    #[serde(default)]
    pub task_name: String,

    pub command: String,

    /// Remote user the command ran as, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    pub host: String,

    pub succeeded: bool,

    /// Wall-clock runtime of the command.
    pub elapsed_seconds: f64,

    #[serde(default)]
    pub verbosity: Verbosity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<InvocationId>,
}

impl CommandCompleted {
    pub fn new(
        task_name: impl Into<String>,
        command: impl Into<String>,
        host: impl Into<String>,
        succeeded: bool,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            command: command.into(),
            user: None,
            host: host.into(),
            succeeded,
            elapsed_seconds,
            verbosity: Verbosity::default(),
            invocation_id: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_invocation_id(mut self, id: impl Into<InvocationId>) -> Self {
        self.invocation_id = Some(id.into());
        self
    }

    /// Formats the remote identity as `user@host`, or `host` when no user is known.
    pub fn user_at_host(&self) -> String {
        match self.user.as_deref() {
            Some(user) if !user.is_empty() => format!("{}@{}", user, self.host),
            _ => self.host.clone(),
        }
    }
}

/// Free-form log output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub message: String,

    #[serde(default)]
    pub verbosity: Verbosity,
}

impl LogMessage {
    pub fn new(message: impl Into<String>, verbosity: Verbosity) -> Self {
        Self {
            message: message.into(),
            verbosity,
        }
    }
}
