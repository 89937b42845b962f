//! End-to-end scenarios for the abbreviated reporter.
//!
//! Tests cover:
//! - Deduplication of repeated commands within a task
//! - Sequence numbering and task banners
//! - Shim normalization
//! - Verbosity gating versus the durable log
//! - The file-backed JSONL log

use abbrev_core::{
    BufferConsole, DurableSink, JsonlSink, MemorySink, Palette, Reporter, ReporterConfig,
};
use abbrev_proto::{
    CommandCompleted, CommandIssued, ExecutionEvent, LogMessage, TaskStarted, Verbosity,
};
use std::fs;

fn plain_reporter<S: DurableSink>(
    config: &ReporterConfig,
    sink: S,
) -> Reporter<BufferConsole, S> {
    let mut reporter = Reporter::new(config, BufferConsole::new(), sink, Palette::plain())
        .unwrap_or_else(|e| panic!("Failed to build reporter: {}", e));
    // Drop the startup banner so tests only see event output
    reporter.console_mut().take_lines();
    reporter
}

fn run(events: Vec<ExecutionEvent>) -> Reporter<BufferConsole, MemorySink> {
    let mut reporter = plain_reporter(&ReporterConfig::default(), MemorySink::new());
    for event in &events {
        reporter.handle(event).unwrap();
    }
    reporter
}

#[test]
fn deploy_scenario() {
    let mut reporter = plain_reporter(&ReporterConfig::default(), MemorySink::new());

    reporter.handle(&TaskStarted::new("deploy").into()).unwrap();
    reporter
        .handle(&CommandIssued::new("deploy", "git fetch").into())
        .unwrap();
    assert_eq!(
        reporter.console_mut().take_lines(),
        ["00:00 deploy", "      01 git fetch"]
    );

    // Repeat is absorbed
    reporter
        .handle(&CommandIssued::new("deploy", "git fetch").into())
        .unwrap();
    assert!(reporter.console().lines().is_empty());

    reporter
        .handle(
            &CommandCompleted::new("deploy", "git fetch", "web1", true, 1.234)
                .with_user("deploy")
                .into(),
        )
        .unwrap();
    let lines = reporter.console_mut().take_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains('✔'));
    assert!(lines[0].contains("01"));
    assert!(lines[0].contains("deploy@web1"));
    assert!(lines[0].contains("1.234s"));

    reporter
        .handle(&CommandIssued::new("deploy", "git push").into())
        .unwrap();
    assert_eq!(reporter.console_mut().take_lines(), ["      02 git push"]);

    assert_eq!(reporter.sink().len(), 5);
}

#[test]
fn repeated_issue_renders_once_with_same_number() {
    let reporter = run(vec![
        CommandIssued::new("build", "make").into(),
        CommandIssued::new("build", "make").into(),
        CommandIssued::new("build", "make").into(),
    ]);

    let issued: Vec<&String> = reporter
        .console()
        .lines()
        .iter()
        .filter(|line| line.ends_with("make"))
        .collect();
    assert_eq!(issued, ["      01 make"]);
    assert_eq!(reporter.ledger().lookup("build", "make"), Some(1));
    assert_eq!(reporter.sink().len(), 3);
}

#[test]
fn sequence_numbers_ignore_interleaved_repeats() {
    let reporter = run(vec![
        CommandIssued::new("t", "a").into(),
        CommandIssued::new("t", "a").into(),
        CommandIssued::new("t", "b").into(),
        CommandIssued::new("t", "a").into(),
        CommandIssued::new("t", "b").into(),
        CommandIssued::new("t", "c").into(),
    ]);

    assert_eq!(
        reporter.console().lines(),
        ["00:00 t", "      01 a", "      02 b", "      03 c"]
    );
}

#[test]
fn banner_once_per_task() {
    let reporter = run(vec![
        TaskStarted::new("build").into(),
        CommandIssued::new("build", "make").into(),
        CommandIssued::new("build", "make install").into(),
        TaskStarted::new("deploy").into(),
        CommandIssued::new("deploy", "make").into(),
        CommandIssued::new("build", "make").into(),
    ]);

    let banners: Vec<&String> = reporter
        .console()
        .lines()
        .iter()
        .filter(|line| !line.starts_with(' '))
        .collect();
    assert_eq!(banners, ["00:00 build", "00:00 deploy"]);
}

#[test]
fn env_shim_correlates_with_bare_command() {
    let reporter = run(vec![
        CommandIssued::new("deploy", "/usr/bin/env ls -la").into(),
        CommandIssued::new("deploy", "ls -la").into(),
        CommandCompleted::new("deploy", "ls -la", "web1", true, 0.2).into(),
    ]);

    assert_eq!(
        reporter.console().lines(),
        ["00:00 deploy", "      01 ls -la", "    ✔ 01 web1 0.200s"]
    );
    assert_eq!(reporter.ledger().command_count("deploy"), 1);
}

#[test]
fn filtered_command_reaches_sink_only() {
    let reporter = run(vec![
        CommandIssued::new("deploy", "cat /etc/hosts")
            .with_verbosity(Verbosity::Debug)
            .into(),
        CommandIssued::new("deploy", "cat /etc/hosts")
            .with_verbosity(Verbosity::Trace)
            .into(),
    ]);

    assert!(reporter.console().lines().is_empty());
    assert_eq!(reporter.sink().len(), 2);
}

#[test]
fn configured_thresholds_are_honored() {
    let config = ReporterConfig {
        command_verbosity: Verbosity::Trace,
        message_verbosity: Verbosity::Debug,
        ..ReporterConfig::default()
    };
    let mut reporter = plain_reporter(&config, MemorySink::new());

    let events: Vec<ExecutionEvent> = vec![
        CommandIssued::new("t", "ls")
            .with_verbosity(Verbosity::Debug)
            .into(),
        LogMessage::new("connecting", Verbosity::Info).into(),
    ];
    for event in &events {
        reporter.handle(event).unwrap();
    }

    assert_eq!(
        reporter.console().lines(),
        ["00:00 t", "      01 ls", "connecting"]
    );
}

#[test]
fn failure_points_at_configured_log() {
    let config = ReporterConfig {
        log_file: "logs/cap.log".into(),
        ..ReporterConfig::default()
    };
    let mut reporter = plain_reporter(&config, MemorySink::new());

    reporter
        .handle(&CommandIssued::new("deploy", "false").into())
        .unwrap();
    reporter
        .handle(
            &CommandCompleted::new("deploy", "false", "web2", false, 0.01)
                .with_user("app")
                .into(),
        )
        .unwrap();

    assert_eq!(
        reporter.console().lines().last().unwrap(),
        "    ✘ 01 app@web2 (see logs/cap.log for details) 0.010s"
    );
}

#[test]
fn jsonl_log_holds_every_event() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("abbrev.log");
    let config = ReporterConfig {
        log_file: path.clone(),
        ..ReporterConfig::default()
    };

    let sink = JsonlSink::open(&path, config.log_max_bytes, config.log_keep).unwrap();
    let mut reporter = plain_reporter(&config, sink);

    let events: Vec<ExecutionEvent> = vec![
        TaskStarted::new("deploy").into(),
        CommandIssued::new("deploy", "ls")
            .with_verbosity(Verbosity::Debug)
            .into(),
        CommandIssued::new("deploy", "ls").into(),
        CommandIssued::new("deploy", "ls").into(),
        LogMessage::new("quiet", Verbosity::Trace).into(),
    ];
    for event in &events {
        reporter.handle(event).unwrap();
    }
    reporter.flush().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let kinds: Vec<String> = content
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["event"].as_str().unwrap().to_string()
        })
        .collect();

    assert_eq!(
        kinds,
        [
            "task.started",
            "command.issued",
            "command.issued",
            "command.issued",
            "log.message"
        ]
    );
    assert_eq!(reporter.console().lines().len(), 2);
}
