//! Trace log output
//!
//! - `record`: the line grammar (control records, data records, sentinel)
//! - `writer`: the append-only, line-atomic log sink
//! - `reader`: parsing and summarising finished logs

pub mod reader;
pub mod record;
pub mod writer;

pub use reader::TraceSummary;
pub use record::{ControlRecord, DataRecord, TraceLine};
pub use writer::TraceWriter;
