//! # Event Recorder
//!
//! Runs once per executed, probed memory operand, inline on the application
//! thread that made the access. The only per-access filter is range
//! membership. The trace gate is not consulted here: it only
//! decides whether probes get installed when code is first discovered, and
//! probes stay installed after the gate is turned off.
//!
//! The hot path takes a read lock on the shared state, then (on a match) the
//! writer's mutex. It never allocates and never holds both locks at once.

use super::SharedState;
use crate::domain::{Address, TraceError};
use crate::output::{DataRecord, TraceWriter};
use seltrace_common::Direction;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct EventRecorder<W: Write> {
    state: Arc<SharedState>,
    writer: Arc<TraceWriter<W>>,
    recorded: AtomicU64,
    filtered: AtomicU64,
}

impl<W: Write> EventRecorder<W> {
    pub fn new(state: Arc<SharedState>, writer: Arc<TraceWriter<W>>) -> Self {
        Self { state, writer, recorded: AtomicU64::new(0), filtered: AtomicU64::new(0) }
    }

    /// Record an access if `address` lies in a watched range
    ///
    /// Returns whether a data record was written.
    ///
    /// # Errors
    /// Returns an error only if the trace log cannot be written
    #[inline]
    pub fn on_access(
        &self,
        instruction: Address,
        address: Address,
        direction: Direction,
    ) -> Result<bool, TraceError> {
        if !self.state.is_watched(address) {
            self.filtered.fetch_add(1, Ordering::Relaxed);
            return Ok(false);
        }

        self.writer.append_data(&DataRecord { instruction, direction, address })?;
        self.recorded.fetch_add(1, Ordering::Relaxed);
        Ok(true)
    }

    /// Number of data records written so far
    pub fn recorded(&self) -> u64 {
        self.recorded.load(Ordering::Relaxed)
    }

    /// Number of probed accesses that fell outside every watched range
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }
}
