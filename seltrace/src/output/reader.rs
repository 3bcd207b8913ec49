//! Trace log reader
//!
//! Parses a finished trace log back into [`TraceLine`]s and aggregates them.
//! A log without the `#eof` sentinel comes from a target that did not
//! terminate normally; it is still summarised but flagged as truncated.

use super::record::{ControlRecord, TraceLine};
use crate::domain::{Address, TraceError};
use log::warn;
use seltrace_common::{Direction, EOF_SENTINEL};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Aggregate counts over one trace log
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TraceSummary {
    pub watch_calls: usize,
    pub unwatch_calls: usize,
    pub toggle_calls: usize,
    pub reads: usize,
    pub writes: usize,
    pub instructions: HashSet<Address>,
    pub data_addresses: HashSet<Address>,
    /// Whether the log ends with the sentinel
    pub complete: bool,
}

impl TraceSummary {
    /// Summarise the log at `path`
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or contains a malformed line
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Summarise a log read line by line from `reader`
    ///
    /// # Errors
    /// Returns an error on I/O failure, on a line that does not match the log
    /// grammar, or on any line following the sentinel
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, TraceError> {
        let mut summary = Self::default();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let number = idx + 1;
            if summary.complete {
                return Err(TraceError::TrailingData { line: number, sentinel: EOF_SENTINEL });
            }
            summary.add(TraceLine::parse_numbered(&line, number)?);
        }

        if !summary.complete {
            warn!("Trace log has no {EOF_SENTINEL} sentinel; target did not exit normally");
        }
        Ok(summary)
    }

    fn add(&mut self, line: TraceLine) {
        match line {
            TraceLine::Control(ControlRecord::Watch { .. }) => self.watch_calls += 1,
            TraceLine::Control(ControlRecord::Unwatch { .. }) => self.unwatch_calls += 1,
            TraceLine::Control(ControlRecord::ToggleTracing { .. }) => self.toggle_calls += 1,
            TraceLine::Data(record) => {
                match record.direction {
                    Direction::Read => self.reads += 1,
                    Direction::Write => self.writes += 1,
                }
                self.instructions.insert(record.instruction);
                self.data_addresses.insert(record.address);
            }
            TraceLine::Eof => self.complete = true,
        }
    }

    #[must_use]
    pub fn control_records(&self) -> usize {
        self.watch_calls + self.unwatch_calls + self.toggle_calls
    }

    #[must_use]
    pub fn data_records(&self) -> usize {
        self.reads + self.writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let log = "watch 1000 1099\n\
                   toggleTracing 1\n\
                   0x401000: W 0x41a\n\
                   0x401000: W 0x41e\n\
                   0x401008: R 0x41a\n\
                   unwatch 1000 1099\n\
                   toggleTracing 0\n\
                   #eof\n";
        let summary = TraceSummary::from_reader(log.as_bytes()).unwrap();

        assert_eq!(summary.watch_calls, 1);
        assert_eq!(summary.unwatch_calls, 1);
        assert_eq!(summary.toggle_calls, 2);
        assert_eq!(summary.control_records(), 4);
        assert_eq!(summary.writes, 2);
        assert_eq!(summary.reads, 1);
        assert_eq!(summary.data_records(), 3);
        assert_eq!(summary.instructions.len(), 2);
        assert_eq!(summary.data_addresses.len(), 2);
        assert!(summary.complete);
    }

    #[test]
    fn test_truncated_log_is_flagged() {
        let summary = TraceSummary::from_reader("watch 1 2\n".as_bytes()).unwrap();
        assert!(!summary.complete);
        assert_eq!(summary.watch_calls, 1);
    }

    #[test]
    fn test_data_after_sentinel_is_rejected() {
        let err = TraceSummary::from_reader("#eof\nwatch 1 2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TraceError::TrailingData { line: 2, .. }));
    }

    #[test]
    fn test_malformed_line_reports_number() {
        let err = TraceSummary::from_reader("watch 1 2\nadd_mem 1 2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TraceError::MalformedLine { line: 2, .. }));
    }
}
