//! Per-task registry of distinct command lines.
//!
//! The ledger decides whether a command is being seen for the first time
//! within its task and assigns it a stable, 1-based sequence number. Entries
//! are append-only: a command keeps the number of its first occurrence for the
//! life of the session.

use abbrev_proto::InvocationId;
use std::collections::HashMap;

/// Result of recording a command against its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// 1-based position of the command's first appearance in its task.
    pub number: usize,

    /// True if this call added the command to the task.
    pub first: bool,
}

impl Occurrence {
    /// True for the first command ever recorded for the task.
    pub fn opens_task(&self) -> bool {
        self.first && self.number == 1
    }
}

/// Commands seen so far for one task.
#[derive(Debug, Default)]
struct TaskEntry {
    /// Normalized command lines in first-seen order.
    commands: Vec<String>,

    /// Command line -> 1-based sequence number.
    numbers: HashMap<String, usize>,

    /// Invocation id -> sequence number of the command it ran.
    invocations: HashMap<InvocationId, usize>,
}

/// Ordered registry of distinct commands per task.
///
/// Access must be serialized by the caller; the ledger does no locking.
#[derive(Debug, Default)]
pub struct TaskLedger {
    tasks: HashMap<String, TaskEntry>,
}

impl TaskLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `command` for `task` if it is new, returning its sequence number.
    ///
    /// Repeated calls for the same pair return the same number with
    /// `first == false`.
    pub fn record_or_lookup(&mut self, task: &str, command: &str) -> Occurrence {
        let entry = self.tasks.entry(task.to_string()).or_default();

        if let Some(&number) = entry.numbers.get(command) {
            return Occurrence {
                number,
                first: false,
            };
        }

        entry.commands.push(command.to_string());
        let number = entry.commands.len();
        entry.numbers.insert(command.to_string(), number);

        Occurrence {
            number,
            first: true,
        }
    }

    /// Looks up a command's sequence number without recording it.
    pub fn lookup(&self, task: &str, command: &str) -> Option<usize> {
        self.tasks.get(task)?.numbers.get(command).copied()
    }

    /// Associates an invocation id with a sequence number in `task`.
    ///
    /// A later binding for the same id replaces the earlier one.
    pub fn bind_invocation(&mut self, task: &str, id: &InvocationId, number: usize) {
        self.tasks
            .entry(task.to_string())
            .or_default()
            .invocations
            .insert(id.clone(), number);
    }

    /// Returns the sequence number bound to an invocation id.
    pub fn lookup_invocation(&self, task: &str, id: &InvocationId) -> Option<usize> {
        self.tasks.get(task)?.invocations.get(id).copied()
    }

    /// Returns the commands recorded for `task` in first-seen order.
    pub fn commands(&self, task: &str) -> &[String] {
        self.tasks
            .get(task)
            .map(|entry| entry.commands.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the number of distinct commands recorded for `task`.
    pub fn command_count(&self, task: &str) -> usize {
        self.commands(task).len()
    }

    /// Returns the number of tasks with at least one ledger entry.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}
