//! Structured error types for seltrace
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to open trace log {}: {source}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write trace record: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("Trace log is already finalized")]
    Finalized,

    #[error("Malformed trace line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("Unexpected data after {sentinel} at line {line}")]
    TrailingData { line: usize, sentinel: &'static str },

    #[error("Unknown control entry point: {0}")]
    UnknownEntryPoint(String),

    #[error("{symbol} expects {expected} argument(s), got {actual}")]
    ArgumentCount { symbol: &'static str, expected: usize, actual: usize },

    #[error("Invalid simulation script: {0}")]
    InvalidScript(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TraceError {
    /// Whether this error means the trace log can no longer be trusted
    ///
    /// These are the resource errors that stop the traced process.
    #[must_use]
    pub fn is_resource_error(&self) -> bool {
        matches!(
            self,
            TraceError::OpenFailed { .. }
                | TraceError::WriteFailed(_)
                | TraceError::Finalized
                | TraceError::Io(_)
        )
    }
}
