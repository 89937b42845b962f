//! Console writers for the abbreviated log.
//!
//! The `Console` trait abstracts over where rendered lines go, allowing for
//! different output strategies (terminal, captured buffer, silent).

use std::io::{self, Write};

/// Append-only, line-oriented output.
pub trait Console {
    /// Writes one line. The console adds the line terminator.
    fn print_line(&mut self, line: &str);
}

/// Writes lines to stdout.
///
/// Write errors are ignored: a closed pipe must not stop event processing.
pub struct StdoutConsole {
    stdout: io::Stdout,
}

impl StdoutConsole {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for StdoutConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdoutConsole {
    fn print_line(&mut self, line: &str) {
        let mut out = self.stdout.lock();
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
}

/// Collects lines in memory.
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    lines: Vec<String>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Takes all collected lines, leaving the buffer empty.
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

impl Console for BufferConsole {
    fn print_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Discards everything (for CI/silent mode).
#[derive(Debug, Default, Clone, Copy)]
pub struct QuietConsole;

impl Console for QuietConsole {
    fn print_line(&mut self, _: &str) {}
}

impl<C: Console + ?Sized> Console for &mut C {
    fn print_line(&mut self, line: &str) {
        (**self).print_line(line);
    }
}

impl<C: Console + ?Sized> Console for Box<C> {
    fn print_line(&mut self, line: &str) {
        (**self).print_line(line);
    }
}
