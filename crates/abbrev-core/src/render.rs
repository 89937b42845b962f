//! Line formatting for the abbreviated console log.
//!
//! Every function here is pure: it takes values and returns the line to print.
//! Colors come from a [`Palette`], which can be disabled so output is plain
//! text (pipes, tests, `--color never`).

use colored::Colorize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Indent before an issued-command line.
const ISSUED_INDENT: &str = "      ";

/// Indent before a completion line.
const COMPLETION_INDENT: &str = "    ";

const SUCCESS_GLYPH: &str = "✔";
const FAILURE_GLYPH: &str = "✘";

/// Applies terminal colors when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// A palette that never emits escape codes.
    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn paint(&self, text: &str, color: fn(&str) -> colored::ColoredString) -> String {
        if self.enabled {
            color(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn blue(&self, text: &str) -> String {
        self.paint(text, |s| s.blue())
    }

    pub fn yellow(&self, text: &str) -> String {
        self.paint(text, |s| s.yellow())
    }

    pub fn green(&self, text: &str) -> String {
        self.paint(text, |s| s.green())
    }

    pub fn red(&self, text: &str) -> String {
        self.paint(text, |s| s.red())
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(text, |s| s.bright_black())
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::plain()
    }
}

/// Wall clock for the reporting session.
///
/// The clock starts on first use, so the first task banner always reads `00:00`.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    start: Option<Instant>,
}

impl SessionClock {
    /// Creates a clock that starts on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the time since the clock started, starting it if needed.
    pub fn elapsed(&mut self) -> Duration {
        self.start.get_or_insert_with(Instant::now).elapsed()
    }

    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }
}

/// Formats a duration as `mm:ss`. Minutes keep counting past 59.
pub fn format_clock(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Formats a command runtime as a fixed-width stamp, e.g. `1.234s`.
pub fn format_elapsed(seconds: f64) -> String {
    format!("{:5.3}s", seconds)
}

/// Formats a sequence number as two digits.
pub fn format_number(number: usize) -> String {
    format!("{:02}", number)
}

/// Task header printed before the first command of a task.
pub fn banner_line(palette: &Palette, task_name: &str, elapsed: Duration) -> String {
    format!("{} {}", format_clock(elapsed), palette.blue(task_name))
}

/// Line announcing the first occurrence of a command within its task.
pub fn issued_line(palette: &Palette, number: usize, shell_string: &str) -> String {
    format!(
        "{}{} {}",
        ISSUED_INDENT,
        format_number(number),
        palette.yellow(shell_string)
    )
}

/// Everything needed to render a command's completion status.
#[derive(Debug, Clone, Copy)]
pub struct Completion<'a> {
    pub number: usize,
    pub succeeded: bool,
    pub user_at_host: &'a str,
    pub elapsed_seconds: f64,
}

/// Status line for a finished command.
///
/// Failures point the reader at the full log for details.
pub fn completion_line(
    palette: &Palette,
    completion: &Completion<'_>,
    log_destination: &Path,
) -> String {
    let number = format_number(completion.number);
    let status = if completion.succeeded {
        palette.green(&format!(
            "{} {} {}",
            SUCCESS_GLYPH, number, completion.user_at_host
        ))
    } else {
        palette.red(&format!(
            "{} {} {} (see {} for details)",
            FAILURE_GLYPH,
            number,
            completion.user_at_host,
            log_destination.display()
        ))
    };
    let runtime = palette.dim(&format_elapsed(completion.elapsed_seconds));

    format!("{}{} {}", COMPLETION_INDENT, status, runtime)
}

/// Lines printed once when the reporter starts.
pub fn startup_lines(palette: &Palette, log_destination: &Path) -> [String; 2] {
    [
        "Using abbreviated format.".to_string(),
        format!(
            "Full output is being written to {}.",
            palette.blue(&log_destination.display().to_string())
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Duration::ZERO), "00:00");
        assert_eq!(format_clock(Duration::from_millis(59_999)), "00:59");
        assert_eq!(format_clock(Duration::from_secs(61)), "01:01");
        assert_eq!(format_clock(Duration::from_secs(100 * 60 + 5)), "100:05");
    }

    #[test]
    fn test_format_elapsed_is_fixed_width() {
        assert_eq!(format_elapsed(1.234), "1.234s");
        assert_eq!(format_elapsed(0.5), "0.500s");
        assert_eq!(format_elapsed(12.3456), "12.346s");
    }

    #[test]
    fn test_banner_and_issued_lines() {
        let palette = Palette::plain();
        assert_eq!(
            banner_line(&palette, "deploy", Duration::from_secs(3)),
            "00:03 deploy"
        );
        assert_eq!(issued_line(&palette, 1, "git fetch"), "      01 git fetch");
        assert_eq!(issued_line(&palette, 12, "make"), "      12 make");
    }

    #[test]
    fn test_completion_success() {
        let palette = Palette::plain();
        let line = completion_line(
            &palette,
            &Completion {
                number: 1,
                succeeded: true,
                user_at_host: "deploy@web1",
                elapsed_seconds: 1.234,
            },
            Path::new("abbrev.log"),
        );
        assert_eq!(line, "    ✔ 01 deploy@web1 1.234s");
    }

    #[test]
    fn test_completion_failure_points_at_log() {
        let palette = Palette::plain();
        let line = completion_line(
            &palette,
            &Completion {
                number: 3,
                succeeded: false,
                user_at_host: "root@db1",
                elapsed_seconds: 0.25,
            },
            Path::new("logs/run.log"),
        );
        assert_eq!(
            line,
            "    ✘ 03 root@db1 (see logs/run.log for details) 0.250s"
        );
    }

    #[test]
    fn test_startup_lines() {
        let [first, second] = startup_lines(&Palette::plain(), Path::new("abbrev.log"));
        assert_eq!(first, "Using abbreviated format.");
        assert_eq!(second, "Full output is being written to abbrev.log.");
    }

    #[test]
    fn test_enabled_palette_emits_escapes() {
        colored::control::set_override(true);
        let palette = Palette::new(true);

        let line = issued_line(&palette, 1, "ls");
        assert!(line.contains("\x1b["));
        assert!(line.contains("ls"));
    }

    #[test]
    fn test_session_clock_starts_lazily() {
        let mut clock = SessionClock::new();
        assert!(!clock.is_started());

        let first = clock.elapsed();
        assert!(clock.is_started());
        assert!(first < Duration::from_secs(1));
    }
}
