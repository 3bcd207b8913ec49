use seltrace::domain::{Address, TraceError};
use seltrace::engine::{Script, SimulatedEngine};
use seltrace::output::{ControlRecord, TraceLine, TraceSummary};
use seltrace::{Session, SessionConfig};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_summary_of_sample_log() {
    let summary = TraceSummary::from_file("tests/fixtures/sample.out").unwrap();

    assert_eq!(summary.watch_calls, 1);
    assert_eq!(summary.unwatch_calls, 1);
    assert_eq!(summary.toggle_calls, 2);
    assert_eq!(summary.writes, 3);
    assert_eq!(summary.reads, 1);
    assert_eq!(summary.instructions.len(), 2);
    assert!(summary.data_addresses.contains(&Address(0x41a)));
    assert!(summary.data_addresses.contains(&Address(0x41b)));
    assert!(summary.complete);
}

#[test]
fn test_truncated_log_is_summarised() {
    let summary = TraceSummary::from_file("tests/fixtures/truncated.out").unwrap();
    assert!(!summary.complete);
    assert_eq!(summary.control_records(), 2);
    assert_eq!(summary.data_records(), 1);
}

#[test]
fn test_every_sample_line_parses() {
    let content = std::fs::read_to_string("tests/fixtures/sample.out").unwrap();
    let lines: Vec<TraceLine> = content.lines().map(|l| l.parse().unwrap()).collect();

    assert_eq!(lines.first(), Some(&TraceLine::Control(ControlRecord::Watch { start: 1000, end: 1099 })));
    assert_eq!(lines.last(), Some(&TraceLine::Eof));
    for (line, original) in lines.iter().zip(content.lines()) {
        assert_eq!(line.to_string(), original);
    }
}

#[test]
fn test_malformed_file_reports_line() {
    let mut tmp = NamedTempFile::new().unwrap();
    writeln!(tmp, "watch 1000 1099").unwrap();
    writeln!(tmp, "0x401000: X 0x41a").unwrap();

    let err = TraceSummary::from_file(tmp.path()).unwrap_err();
    assert!(matches!(err, TraceError::MalformedLine { line: 2, .. }), "got {err:?}");
}

#[test]
fn test_missing_file_is_io_error() {
    let err = TraceSummary::from_file("tests/fixtures/does-not-exist.out").unwrap_err();
    assert!(matches!(err, TraceError::Io(_)));
}

#[test]
fn test_session_output_summarises_back() {
    let tmp = NamedTempFile::new().unwrap();
    let session = Session::create(&SessionConfig { output: tmp.path().to_path_buf() }).unwrap();
    let script = Script::from_file("tests/fixtures/readwrite.json").unwrap();
    let mut engine = SimulatedEngine::new();
    session.attach(&mut engine);
    script.run(&mut engine);

    let summary = TraceSummary::from_file(tmp.path()).unwrap();
    let stats = session.stats();
    assert!(summary.complete);
    assert_eq!(summary.control_records() as u64, stats.control_calls);
    assert_eq!(summary.data_records() as u64, stats.recorded);
    assert_eq!(summary.writes, 2);
    assert_eq!(summary.reads, 1);
}
