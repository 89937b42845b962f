//! Event dispatcher for the abbreviated log.
//!
//! `Reporter` consumes execution events one at a time. Every event is
//! forwarded to the durable sink; the console only gets a line when the event
//! passes its verbosity filter and adds something new:
//!
//! - the first command of a task prints a task banner,
//! - the first occurrence of a command prints an issued line with its
//!   sequence number,
//! - a repeated command prints nothing until it completes,
//! - every completion prints a status line.
//!
//! The reporter assumes a single ordered feed. Hosts with several producers
//! must funnel them through one queue before calling [`Reporter::handle`].

use crate::config::{ConfigError, ReporterConfig};
use crate::console::Console;
use crate::ledger::TaskLedger;
use crate::normalize::Normalizer;
use crate::render::{
    Completion, Palette, SessionClock, banner_line, completion_line, issued_line, startup_lines,
};
use crate::sink::{DurableSink, SinkError};
use abbrev_proto::{
    CommandCompleted, CommandIssued, ExecutionEvent, LogMessage, TaskStarted, Verbosity,
};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Sequence number rendered for a completion that matches no issued command.
pub const UNKNOWN_SEQUENCE: usize = 0;

/// Stateful presentation layer over an ordered event feed.
pub struct Reporter<C, S> {
    console: C,
    sink: S,
    ledger: TaskLedger,
    normalizer: Normalizer,
    palette: Palette,
    clock: SessionClock,
    log_destination: PathBuf,
    command_verbosity: Verbosity,
    message_verbosity: Verbosity,

    /// Task named by the latest `TaskStarted`, used for unstamped events.
    current_task: Option<String>,

    correlation_misses: u64,
}

impl<C: Console, S: DurableSink> Reporter<C, S> {
    /// Creates a reporter and prints the startup banner.
    pub fn new(
        config: &ReporterConfig,
        console: C,
        sink: S,
        palette: Palette,
    ) -> Result<Self, ConfigError> {
        let normalizer = config.normalizer()?;
        let mut reporter = Self {
            console,
            sink,
            ledger: TaskLedger::new(),
            normalizer,
            palette,
            clock: SessionClock::new(),
            log_destination: config.log_file.clone(),
            command_verbosity: config.command_verbosity,
            message_verbosity: config.message_verbosity,
            current_task: None,
            correlation_misses: 0,
        };

        for line in startup_lines(&reporter.palette, &reporter.log_destination) {
            reporter.console.print_line(&line);
        }
        Ok(reporter)
    }

    /// Processes one event.
    ///
    /// The event is forwarded to the sink and rendered to the console. A sink
    /// failure is returned after the console has been updated.
    pub fn handle(&mut self, event: &ExecutionEvent) -> Result<(), SinkError> {
        let forwarded = self.sink.record(event);

        match event {
            ExecutionEvent::TaskStarted(started) => self.on_task_started(started),
            ExecutionEvent::CommandIssued(issued) => self.on_command_issued(issued),
            ExecutionEvent::CommandCompleted(completed) => self.on_command_completed(completed),
            ExecutionEvent::LogMessage(message) => self.on_log_message(message),
        }

        forwarded
    }

    fn on_task_started(&mut self, started: &TaskStarted) {
        debug!(task = %started.task_name, "Task started");
        self.current_task = Some(started.task_name.clone());
    }

    fn on_command_issued(&mut self, issued: &CommandIssued) {
        if !issued.verbosity.exceeds(self.command_verbosity) {
            return;
        }

        let task = self.resolve_task(&issued.task_name);
        let shell = self.normalizer.normalize(&issued.command);
        let occurrence = self.ledger.record_or_lookup(&task, &shell);

        if let Some(id) = &issued.invocation_id {
            self.ledger.bind_invocation(&task, id, occurrence.number);
        }

        if occurrence.opens_task() {
            let elapsed = self.clock.elapsed();
            let line = banner_line(&self.palette, &task, elapsed);
            self.console.print_line(&line);
        }

        if occurrence.first {
            let line = issued_line(&self.palette, occurrence.number, &shell);
            self.console.print_line(&line);
        }
    }

    fn on_command_completed(&mut self, completed: &CommandCompleted) {
        if !completed.verbosity.exceeds(self.command_verbosity) {
            return;
        }

        let task = self.resolve_task(&completed.task_name);
        let shell = self.normalizer.normalize(&completed.command);

        let number = completed
            .invocation_id
            .as_ref()
            .and_then(|id| self.ledger.lookup_invocation(&task, id))
            .or_else(|| self.ledger.lookup(&task, &shell));

        let number = number.unwrap_or_else(|| {
            self.correlation_misses += 1;
            warn!(
                task = %task,
                command = %shell,
                "Completion does not match any issued command"
            );
            UNKNOWN_SEQUENCE
        });

        let user_at_host = completed.user_at_host();
        let line = completion_line(
            &self.palette,
            &Completion {
                number,
                succeeded: completed.succeeded,
                user_at_host: &user_at_host,
                elapsed_seconds: completed.elapsed_seconds,
            },
            &self.log_destination,
        );
        self.console.print_line(&line);
    }

    fn on_log_message(&mut self, message: &LogMessage) {
        if message.verbosity.exceeds(self.message_verbosity) {
            self.console.print_line(&message.message);
        }
    }

    fn resolve_task(&self, stamped: &str) -> String {
        if stamped.is_empty() {
            self.current_task.clone().unwrap_or_default()
        } else {
            stamped.to_string()
        }
    }

    /// Flushes the sink.
    pub fn flush(&mut self) -> Result<(), SinkError> {
        self.sink.flush()
    }

    pub fn ledger(&self) -> &TaskLedger {
        &self.ledger
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn log_destination(&self) -> &Path {
        &self.log_destination
    }

    /// Task named by the most recent `TaskStarted` event.
    pub fn current_task(&self) -> Option<&str> {
        self.current_task.as_deref()
    }

    /// Number of completions that matched no issued command.
    pub fn correlation_misses(&self) -> u64 {
        self.correlation_misses
    }

    /// Consumes the reporter, returning its console and sink.
    pub fn into_parts(self) -> (C, S) {
        (self.console, self.sink)
    }
}
