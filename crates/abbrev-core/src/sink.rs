//! Durable sink for the unabridged event record.
//!
//! The console shows an abbreviated view; the sink receives every event the
//! reporter sees, including the ones filtered out of the console. `JsonlSink`
//! writes one JSON record per line for replay and analysis.

use crate::log_file::RotatingFile;
use abbrev_proto::ExecutionEvent;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::Path;

/// Errors raised while forwarding events to a sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Append-only destination for raw events.
pub trait DurableSink {
    /// Records one event.
    fn record(&mut self, event: &ExecutionEvent) -> Result<(), SinkError>;

    /// Flushes buffered records.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: DurableSink + ?Sized> DurableSink for &mut S {
    fn record(&mut self, event: &ExecutionEvent) -> Result<(), SinkError> {
        (**self).record(event)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

impl<S: DurableSink + ?Sized> DurableSink for Box<S> {
    fn record(&mut self, event: &ExecutionEvent) -> Result<(), SinkError> {
        (**self).record(event)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

/// A timestamped line in the JSONL log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// RFC 3339 UTC timestamp of when the event was recorded.
    pub ts: String,

    /// The event type tag (e.g. "command.issued").
    pub event: String,

    /// The complete event.
    pub data: ExecutionEvent,
}

impl Record {
    /// Creates a record stamped with the current time.
    pub fn new(event: &ExecutionEvent) -> Self {
        Self {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event: event.kind().to_string(),
            data: event.clone(),
        }
    }
}

/// Writes each event as a JSON line.
///
/// # Example
///
/// ```
/// use abbrev_core::{DurableSink, JsonlSink};
/// use abbrev_proto::{ExecutionEvent, TaskStarted};
///
/// let mut sink = JsonlSink::new(Vec::new());
/// sink.record(&ExecutionEvent::from(TaskStarted::new("deploy"))).unwrap();
///
/// let output = String::from_utf8(sink.into_inner()).unwrap();
/// assert!(output.contains("task.started"));
/// ```
#[derive(Debug)]
pub struct JsonlSink<W> {
    writer: W,
    records: u64,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, records: 0 }
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> u64 {
        self.records
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonlSink<RotatingFile> {
    /// Opens a rotating log file as the sink destination.
    pub fn open(path: impl AsRef<Path>, max_bytes: u64, keep: u32) -> io::Result<Self> {
        Ok(Self::new(RotatingFile::open(path, max_bytes, keep)?))
    }
}

impl<W: Write> DurableSink for JsonlSink<W> {
    fn record(&mut self, event: &ExecutionEvent) -> Result<(), SinkError> {
        // One write per record; RotatingFile keeps each write in a single file.
        let mut line = serde_json::to_string(&Record::new(event))?;
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        self.records += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps forwarded events in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Vec<ExecutionEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ExecutionEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl DurableSink for MemorySink {
    fn record(&mut self, event: &ExecutionEvent) -> Result<(), SinkError> {
        self.events.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abbrev_proto::{CommandCompleted, CommandIssued, TaskStarted, Verbosity};

    #[test]
    fn test_jsonl_format() {
        let mut sink = JsonlSink::new(Vec::new());
        sink.record(&TaskStarted::new("deploy").into()).unwrap();
        sink.record(&CommandIssued::new("deploy", "git fetch").into())
            .unwrap();

        assert_eq!(sink.records_written(), 2);
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        // Should have exactly 2 lines (JSONL format)
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: Result<serde_json::Value, _> = serde_json::from_str(line);
            assert!(parsed.is_ok(), "Line should be valid JSON: {}", line);
        }
    }

    #[test]
    fn test_record_keeps_full_event() {
        let event: ExecutionEvent = CommandCompleted::new("deploy", "ls", "web1", false, 2.5)
            .with_user("root")
            .with_verbosity(Verbosity::Debug)
            .into();
        let record = Record::new(&event);

        let json = serde_json::to_string(&record).unwrap();
        let parsed: Record = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.event, "command.completed");
        assert_eq!(parsed.data, event);
        assert!(parsed.ts.ends_with('Z'));
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.record(&TaskStarted::new("a").into()).unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.events()[0].task_name(), Some("a"));
    }

    #[test]
    fn test_write_errors_surface() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut sink = JsonlSink::new(Broken);
        let err = sink.record(&TaskStarted::new("a").into()).unwrap_err();
        assert!(matches!(err, SinkError::Io(_)));
        assert_eq!(sink.records_written(), 0);
    }
}
