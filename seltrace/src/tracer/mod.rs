//! Selective-tracing core
//!
//! - `registry`: watched address ranges with overlap-equivalence semantics
//! - `gate`: the trace-enable switch consulted at code discovery
//! - `state`: the lock shared by registry and gate
//! - `recorder`: the per-access range filter
//! - `control`: the three control entry points

pub mod control;
pub mod gate;
pub mod recorder;
pub mod registry;
pub mod state;

pub use control::ControlBridge;
pub use gate::TraceGate;
pub use recorder::EventRecorder;
pub use registry::{RangeRegistry, WatchOutcome};
pub use state::{SharedState, TraceState};
