//! # Tracing Session
//!
//! Owns the shared state and trace log for one traced process and registers
//! the core against an instrumentation engine:
//!
//! - **Code discovery** → reads the trace gate once and returns probes for
//!   every memory operand, or none while the gate is off
//! - **Access** → [`EventRecorder::on_access`]
//! - **Call interception** → [`ControlBridge::dispatch`] for `watch`,
//!   `unwatch` and `toggleTracing`
//! - **Exit** → [`TraceWriter::finalize`]
//!
//! Engine callbacks cannot return errors to anyone. A failing trace log
//! means the run cannot produce a trustworthy trace, so inside callbacks a
//! resource error flushes what was already accepted and terminates the
//! process with [`EXIT_IO`]. A control call with the wrong argument count is
//! logged and dropped. A second exit after the log was finalized is ignored.

use crate::domain::{Address, TraceError};
use crate::engine::{probes_for, Access, CodeSite, Instrumentation};
use crate::output::TraceWriter;
use crate::tracer::{ControlBridge, EventRecorder, SharedState};
use log::{debug, error, info, warn};
use seltrace_common::{ControlEntry, Direction, DEFAULT_OUTPUT};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Exit code used when the trace log cannot be written (`EX_IOERR`)
pub const EXIT_IO: i32 = 74;

/// Library-side configuration of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Trace log path; created or truncated at session start
    pub output: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { output: PathBuf::from(DEFAULT_OUTPUT) }
    }
}

/// Counters gathered over a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub control_calls: u64,
    pub recorded: u64,
    pub filtered: u64,
}

pub struct Session<W: Write + Send + 'static> {
    state: Arc<SharedState>,
    writer: Arc<TraceWriter<W>>,
    recorder: Arc<EventRecorder<W>>,
    bridge: Arc<ControlBridge<W>>,
}

impl Session<File> {
    /// Open the trace log named by `config`
    ///
    /// # Errors
    /// Returns [`TraceError::OpenFailed`] if the log cannot be created
    pub fn create(config: &SessionConfig) -> Result<Self, TraceError> {
        let writer = TraceWriter::create(&config.output)?;
        info!("Tracing to {}", config.output.display());
        Ok(Self::new(writer))
    }
}

impl<W: Write + Send + 'static> Session<W> {
    pub fn new(writer: TraceWriter<W>) -> Self {
        let state = Arc::new(SharedState::new());
        let writer = Arc::new(writer);
        let recorder = Arc::new(EventRecorder::new(Arc::clone(&state), Arc::clone(&writer)));
        let bridge = Arc::new(ControlBridge::new(Arc::clone(&state), Arc::clone(&writer)));
        Self { state, writer, recorder, bridge }
    }

    /// Register discovery, access, call and exit hooks with `engine`
    pub fn attach<E: Instrumentation>(&self, engine: &mut E) {
        let state = Arc::clone(&self.state);
        engine.on_code_discovered(Box::new(move |site: &CodeSite| {
            if state.tracing_enabled() {
                probes_for(site)
            } else {
                Vec::new()
            }
        }));

        let recorder = Arc::clone(&self.recorder);
        let writer = Arc::clone(&self.writer);
        engine.on_access(Box::new(move |access: Access| {
            if let Err(err) = recorder.on_access(access.instruction, access.address, access.direction)
            {
                fatal(&writer, &err);
            }
        }));

        for entry in ControlEntry::ALL {
            let bridge = Arc::clone(&self.bridge);
            let writer = Arc::clone(&self.writer);
            engine.intercept_call(
                entry.symbol(),
                Box::new(move |args: &[u64]| match bridge.dispatch(entry, args) {
                    Ok(()) => {}
                    Err(err) if err.is_resource_error() => fatal(&writer, &err),
                    Err(err) => warn!("Ignoring control call: {err}"),
                }),
            );
        }

        let writer = Arc::clone(&self.writer);
        let recorder = Arc::clone(&self.recorder);
        let bridge = Arc::clone(&self.bridge);
        engine.on_exit(Box::new(move |code: i32| {
            if writer.is_finalized() {
                debug!("Trace log already finalized at exit({code})");
                return;
            }
            info!(
                "Target exited with code {code}: {} control call(s), {} access(es) recorded, {} filtered",
                bridge.calls(),
                recorder.recorded(),
                recorder.filtered()
            );
            if let Err(err) = writer.finalize() {
                fatal(&writer, &err);
            }
        }));
    }

    /// Control entry points, for driving the core without an engine
    pub fn control(&self) -> &ControlBridge<W> {
        &self.bridge
    }

    /// Per-access recorder, for driving the core without an engine
    pub fn recorder(&self) -> &EventRecorder<W> {
        &self.recorder
    }

    #[must_use]
    pub fn is_watched(&self, addr: Address) -> bool {
        self.state.is_watched(addr)
    }

    #[must_use]
    pub fn tracing_enabled(&self) -> bool {
        self.state.tracing_enabled()
    }

    /// Record an access directly, as an installed probe would
    ///
    /// # Errors
    /// Returns an error if the trace log cannot be written
    pub fn record(&self, instruction: u64, address: u64, direction: Direction) -> Result<bool, TraceError> {
        self.recorder.on_access(Address(instruction), Address(address), direction)
    }

    /// Close the log without an engine exit
    ///
    /// # Errors
    /// Returns an error if already finalized or the final write fails
    pub fn finish(&self) -> Result<W, TraceError> {
        self.writer.finalize()
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            control_calls: self.bridge.calls(),
            recorded: self.recorder.recorded(),
            filtered: self.recorder.filtered(),
        }
    }
}

/// Log a resource error and terminate the traced process
///
/// `process::exit` runs no destructors, so lines still buffered in `writer`
/// are flushed first. The log is left without the sentinel.
fn fatal<W: Write>(writer: &TraceWriter<W>, err: &TraceError) -> ! {
    error!("Trace log failure, terminating: {err}");
    if let Err(flush_err) = writer.flush() {
        error!("Could not flush buffered trace lines: {flush_err}");
    }
    std::process::exit(EXIT_IO);
}
