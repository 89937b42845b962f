//! # abbrev-cli
//!
//! Binary entry point for the abbrev reporter.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - Configuration loading with command-line overrides
//! - Concurrent reading of JSONL event feeds, serialized into one reporter

use abbrev_core::{
    JsonlSink, MalformedLine, Palette, Reporter, ReporterConfig, StdoutConsole, parse_raw_line,
};
use abbrev_proto::{ExecutionEvent, Verbosity};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fmt;
use std::io::{IsTerminal, stdout};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "abbrev.yml";

/// Events buffered between the feed readers and the reporter.
const QUEUE_CAPACITY: usize = 1024;

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if stdout is a TTY
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorMode {
    /// Returns true if colors should be used based on mode and terminal detection.
    fn should_use_colors(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => stdout().is_terminal(),
        }
    }
}

/// Abbreviated console log for remote command execution events
#[derive(Parser, Debug)]
#[command(name = "abbrev", version, about)]
struct Cli {
    /// JSONL event feeds to read ("-" or none for stdin)
    feeds: Vec<PathBuf>,

    /// Path to configuration file (default: ./abbrev.yml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override where the full event log is written
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Override the level commands must exceed to be shown
    #[arg(long)]
    command_verbosity: Option<Verbosity>,

    /// Override the level log messages must exceed to be shown
    #[arg(long)]
    message_verbosity: Option<Verbosity>,

    /// Verbose diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Color output mode (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,
}

/// Where a feed's lines come from.
#[derive(Debug, Clone)]
enum FeedSource {
    Stdin,
    File(PathBuf),
}

impl FeedSource {
    fn from_args(feeds: &[PathBuf]) -> Vec<FeedSource> {
        if feeds.is_empty() {
            return vec![FeedSource::Stdin];
        }
        feeds
            .iter()
            .map(|path| {
                if path.as_os_str() == "-" {
                    FeedSource::Stdin
                } else {
                    FeedSource::File(path.clone())
                }
            })
            .collect()
    }

    async fn open(&self) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
        match self {
            FeedSource::Stdin => Ok(Box::new(tokio::io::stdin())),
            FeedSource::File(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("Failed to open event feed {}", path.display()))?;
                Ok(Box::new(file))
            }
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Stdin => f.write_str("<stdin>"),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One item sent from a feed reader to the reporter.
enum FeedItem {
    Event(ExecutionEvent),
    Malformed { feed: String, line: MalformedLine },
}

/// Counters reported when the feeds are drained.
#[derive(Debug, Default)]
struct FeedStats {
    events: u64,
    malformed: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so they never interleave with the abbreviated log
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    let use_colors = cli.color.should_use_colors();
    colored::control::set_override(use_colors);
    let palette = Palette::new(use_colors);

    let sink = JsonlSink::open(&config.log_file, config.log_max_bytes, config.log_keep)
        .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;
    let mut reporter = Reporter::new(&config, StdoutConsole::new(), sink, palette)?;

    let (tx, mut rx) = mpsc::channel(QUEUE_CAPACITY);
    let mut readers = JoinSet::new();
    for source in FeedSource::from_args(&cli.feeds) {
        debug!(feed = %source, "Starting feed reader");
        readers.spawn(read_feed(source, tx.clone()));
    }
    // Readers hold the remaining senders; the queue closes when they finish
    drop(tx);

    let mut stats = FeedStats::default();
    while let Some(item) = rx.recv().await {
        match item {
            FeedItem::Event(event) => {
                stats.events += 1;
                reporter
                    .handle(&event)
                    .context("Failed to write to the event log")?;
            }
            FeedItem::Malformed { feed, line } => {
                stats.malformed += 1;
                warn!(
                    feed = %feed,
                    line_number = line.line_number,
                    error = %line.error,
                    "Skipping malformed event: {}",
                    line.content
                );
            }
        }
    }

    reporter.flush().context("Failed to flush the event log")?;

    while let Some(joined) = readers.join_next().await {
        joined.context("Feed reader panicked")??;
    }

    info!(
        events = stats.events,
        malformed = stats.malformed,
        correlation_misses = reporter.correlation_misses(),
        "All feeds drained"
    );
    Ok(())
}

/// Loads configuration and applies command-line overrides.
fn load_config(cli: &Cli) -> Result<ReporterConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                read_config(default_path)?
            } else {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                ReporterConfig::default()
            }
        }
    };

    if let Some(log_file) = &cli.log_file {
        config.log_file = log_file.clone();
    }
    if let Some(level) = cli.command_verbosity {
        config.command_verbosity = level;
    }
    if let Some(level) = cli.message_verbosity {
        config.message_verbosity = level;
    }

    config.validate()?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<ReporterConfig> {
    ReporterConfig::from_file(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Reads one feed line by line, forwarding parsed events to the reporter queue.
///
/// Lines are read as raw bytes so a line that is not valid UTF-8 is reported
/// as malformed instead of ending the feed. Returns the number of lines read.
async fn read_feed(source: FeedSource, tx: mpsc::Sender<FeedItem>) -> Result<u64> {
    let reader = source.open().await?;
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut line_number = 0u64;

    loop {
        buf.clear();
        let bytes = reader
            .read_until(b'\n', &mut buf)
            .await
            .with_context(|| format!("Failed to read event feed {}", source))?;
        if bytes == 0 {
            break;
        }

        line_number += 1;
        let item = match parse_raw_line(line_number, &buf) {
            Ok(Some(event)) => FeedItem::Event(event),
            Ok(None) => continue,
            Err(malformed) => FeedItem::Malformed {
                feed: source.to_string(),
                line: malformed,
            },
        };
        if tx.send(item).await.is_err() {
            // Reporter stopped; nothing left to deliver to
            break;
        }
    }

    debug!(feed = %source, lines = line_number, "Feed finished");
    Ok(line_number)
}
