//! # Trace Writer
//!
//! Sole owner of the output stream. Every append formats one complete line
//! into a `BufWriter` while holding the stream's mutex, so lines from
//! concurrent application threads never interleave, and appends from one
//! thread land in the order that thread made them.
//!
//! The stream is an `Option` so that [`TraceWriter::finalize`] can take it:
//! after the sentinel is written and the buffer flushed, every later append
//! fails with [`TraceError::Finalized`].

use super::record::{ControlRecord, DataRecord, TraceLine};
use crate::domain::TraceError;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Upper bound on the length of one rendered log line, newline included
const MAX_LINE: usize = 64;

/// Append-only, line-atomic trace log
#[derive(Debug)]
pub struct TraceWriter<W: Write> {
    out: Mutex<Option<BufWriter<W>>>,
}

impl TraceWriter<File> {
    /// Create (or truncate) the trace log at `path`
    ///
    /// # Errors
    /// Returns [`TraceError::OpenFailed`] if the file cannot be created
    pub fn create(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|source| TraceError::OpenFailed { path: path.to_path_buf(), source })?;
        Ok(Self::new(file))
    }
}

impl<W: Write> TraceWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { out: Mutex::new(Some(BufWriter::new(inner))) }
    }

    /// Append one control record line
    ///
    /// # Errors
    /// Returns an error if the log is finalized or the write fails
    pub fn append_control(&self, record: &ControlRecord) -> Result<(), TraceError> {
        self.append(record)
    }

    /// Append one data record line
    ///
    /// # Errors
    /// Returns an error if the log is finalized or the write fails
    #[inline]
    pub fn append_data(&self, record: &DataRecord) -> Result<(), TraceError> {
        self.append(record)
    }

    fn append(&self, line: &dyn Display) -> Result<(), TraceError> {
        let mut guard = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let out = guard.as_mut().ok_or(TraceError::Finalized)?;
        // Drain before a line could straddle the buffer boundary, so the
        // underlying writer only ever receives whole lines
        if out.capacity() - out.buffer().len() < MAX_LINE {
            out.flush().map_err(TraceError::WriteFailed)?;
        }
        writeln!(out, "{line}").map_err(TraceError::WriteFailed)
    }

    /// Write the `#eof` sentinel, flush, and close the stream
    ///
    /// Hands back the underlying writer. Must be called once; a second call
    /// fails with [`TraceError::Finalized`].
    ///
    /// # Errors
    /// Returns an error if already finalized or if the final write or flush fails
    pub fn finalize(&self) -> Result<W, TraceError> {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(TraceError::Finalized)?;
        writeln!(out, "{}", TraceLine::Eof).map_err(TraceError::WriteFailed)?;
        out.into_inner().map_err(|e| TraceError::WriteFailed(e.into_error()))
    }

    /// Push buffered lines to the underlying writer without the sentinel
    ///
    /// Used when the process is about to stop without finalizing, so that every
    /// accepted line reaches the log. A finalized log is left untouched.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails to accept the lines
    pub fn flush(&self) -> Result<(), TraceError> {
        let mut guard = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_mut() {
            Some(out) => out.flush().map_err(TraceError::WriteFailed),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.out.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Address;
    use seltrace_common::Direction;
    use std::io;

    fn output(writer: TraceWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.finalize().expect("finalize")).expect("utf-8")
    }

    #[test]
    fn test_lines_in_call_order_with_sentinel() {
        let writer = TraceWriter::new(Vec::new());
        writer.append_control(&ControlRecord::Watch { start: 1000, end: 1099 }).unwrap();
        writer.append_control(&ControlRecord::ToggleTracing { enable: true }).unwrap();
        writer
            .append_data(&DataRecord {
                instruction: Address(0x40_1000),
                direction: Direction::Write,
                address: Address(1050),
            })
            .unwrap();

        assert_eq!(
            output(writer),
            "watch 1000 1099\ntoggleTracing 1\n0x401000: W 0x41a\n#eof\n"
        );
    }

    #[test]
    fn test_empty_log_has_only_sentinel() {
        assert_eq!(output(TraceWriter::new(Vec::new())), "#eof\n");
    }

    #[test]
    fn test_append_after_finalize_fails() {
        let writer = TraceWriter::new(Vec::new());
        writer.finalize().unwrap();
        assert!(writer.is_finalized());

        let err = writer.append_control(&ControlRecord::ToggleTracing { enable: false });
        assert!(matches!(err, Err(TraceError::Finalized)));
    }

    #[test]
    fn test_second_finalize_fails() {
        let writer = TraceWriter::new(Vec::new());
        writer.finalize().unwrap();
        assert!(matches!(writer.finalize(), Err(TraceError::Finalized)));
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let err = TraceWriter::create("/nonexistent-dir/seltrace.out").unwrap_err();
        assert!(matches!(err, TraceError::OpenFailed { .. }));
    }

    #[test]
    fn test_flush_keeps_log_open_without_sentinel() {
        let sink = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let writer = TraceWriter::new(SharedSink(std::sync::Arc::clone(&sink)));
        writer.append_control(&ControlRecord::Watch { start: 1, end: 2 }).unwrap();
        assert!(sink.lock().unwrap().is_empty());

        writer.flush().unwrap();
        assert_eq!(*sink.lock().unwrap(), b"watch 1 2\n");
        assert!(!writer.is_finalized());

        writer.append_control(&ControlRecord::Unwatch { start: 1, end: 2 }).unwrap();
        writer.finalize().unwrap();
        assert_eq!(*sink.lock().unwrap(), b"watch 1 2\nunwatch 1 2\n#eof\n");
        writer.flush().unwrap();
    }

    struct SharedSink(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_write_failure_surfaces_on_finalize() {
        let writer = TraceWriter::new(FailingSink);
        // Buffered, so the sink is not touched yet
        writer.append_control(&ControlRecord::ToggleTracing { enable: true }).unwrap();

        let err = writer.finalize().unwrap_err();
        assert!(err.is_resource_error());
    }
}
