//! # Control Bridge
//!
//! Receives the three control calls the target program makes through the
//! engine's call interception, applies them to the shared state and logs a
//! control record for each. Calls are fire-and-forget for the target: no
//! registry or gate condition is ever reported back as a failure.
//!
//! The state mutation and its control record happen under the state's write
//! lock, so the order of control records in the log matches the order in
//! which the registry and gate actually changed.

use super::SharedState;
use crate::domain::{AddressRange, TraceError};
use crate::output::{ControlRecord, TraceWriter};
use log::info;
use seltrace_common::ControlEntry;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct ControlBridge<W: Write> {
    state: Arc<SharedState>,
    writer: Arc<TraceWriter<W>>,
    calls: AtomicU64,
}

impl<W: Write> ControlBridge<W> {
    pub fn new(state: Arc<SharedState>, writer: Arc<TraceWriter<W>>) -> Self {
        Self { state, writer, calls: AtomicU64::new(0) }
    }

    /// `watch(start, end)`: add `[start, end]` unless it overlaps a watched range
    ///
    /// # Errors
    /// Returns an error only if the control record cannot be written
    pub fn watch(&self, start: u64, end: u64) -> Result<(), TraceError> {
        let mut state = self.state.write();
        state.registry.watch(AddressRange::new(start, end));
        self.log(&ControlRecord::Watch { start, end })
    }

    /// `unwatch(start, end)`: remove the watched range overlapping `[start, end]`
    ///
    /// # Errors
    /// Returns an error only if the control record cannot be written
    pub fn unwatch(&self, start: u64, end: u64) -> Result<(), TraceError> {
        let mut state = self.state.write();
        state.registry.unwatch(AddressRange::new(start, end));
        self.log(&ControlRecord::Unwatch { start, end })
    }

    /// `toggleTracing(enable)`: set the trace gate
    ///
    /// # Errors
    /// Returns an error only if the control record cannot be written
    pub fn toggle_tracing(&self, enable: bool) -> Result<(), TraceError> {
        let mut state = self.state.write();
        let was = state.gate.set_enabled(enable);
        if was != enable {
            info!("Tracing {} for newly discovered code", if enable { "enabled" } else { "disabled" });
        }
        self.log(&ControlRecord::ToggleTracing { enable })
    }

    /// Route an intercepted call by entry point, with raw register arguments
    ///
    /// `toggleTracing` treats any non-zero argument as `true`.
    ///
    /// # Errors
    /// Returns [`TraceError::ArgumentCount`] if `args` does not match the entry
    /// point's arity, or a write error from the trace log
    pub fn dispatch(&self, entry: ControlEntry, args: &[u64]) -> Result<(), TraceError> {
        if args.len() != entry.arity() {
            return Err(TraceError::ArgumentCount {
                symbol: entry.symbol(),
                expected: entry.arity(),
                actual: args.len(),
            });
        }
        match entry {
            ControlEntry::Watch => self.watch(args[0], args[1]),
            ControlEntry::Unwatch => self.unwatch(args[0], args[1]),
            ControlEntry::ToggleTracing => self.toggle_tracing(args[0] != 0),
        }
    }

    /// Number of control calls handled so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn log(&self, record: &ControlRecord) -> Result<(), TraceError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.writer.append_control(record)
    }
}
