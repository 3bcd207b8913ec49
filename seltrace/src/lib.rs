//! # seltrace - Selective Memory-Access Tracer
//!
//! seltrace records the memory reads and writes a running program makes, but
//! only for address ranges the program itself asks to have watched. Each
//! matching access becomes one line in an append-only text log.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Target Program                           │
//! │      watch(start, end) / unwatch(start, end) / toggleTracing    │
//! └──────────────┬──────────────────────────────────┬───────────────┘
//!                │ intercepted calls                │ memory accesses
//!                ▼                                  ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Instrumentation Engine (external)               │
//! │  • code discovery: install probes once per instruction site     │
//! │  • probes: call the access hook per executed memory operand     │
//! │  • exit: run the exit hook once                                 │
//! └──────────────┬──────────────────────────────────┬───────────────┘
//!                │                                  │
//!                ▼                                  ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       seltrace (This Crate)                     │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │   Control    │──▶│    Range     │◀──│    Event     │         │
//! │  │   Bridge     │   │   Registry   │   │   Recorder   │         │
//! │  └──────┬───────┘   │  Trace Gate  │   └──────┬───────┘         │
//! │         │           └──────────────┘          │                 │
//! │         ▼                                     ▼                 │
//! │  ┌───────────────────────────────────────────────────┐          │
//! │  │           Trace Writer (seltrace.out)             │          │
//! │  └───────────────────────────────────────────────────┘          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`tracer`]: the selective-tracing core
//!   - `registry`: watched ranges; overlapping ranges are one storage element
//!   - `gate`: the trace-enable switch read at code discovery
//!   - `recorder`: per-access range filter on the hot path
//!   - `control`: the `watch` / `unwatch` / `toggleTracing` entry points
//!
//! - [`output`]: the trace log
//!   - `record`: line grammar for control records, data records, `#eof`
//!   - `writer`: line-atomic append-only sink
//!   - `reader`: parse and summarise a finished log
//!
//! - [`engine`]: the instrumentation-engine interface, a simulated engine and
//!   JSON simulation scripts
//!
//! - [`session`]: wiring of the core into an engine, fatal-error policy
//!
//! - [`cli`]: command-line argument parsing
//!
//! - [`domain`]: core domain types (`Address`, `AddressRange`) and errors
//!
//! ## Two-Phase Filtering
//!
//! 1. **Install time**: when the engine first sees an instruction, the trace
//!    gate decides whether its memory operands get probes. That decision
//!    sticks for the site.
//! 2. **Access time**: an installed probe always reaches the recorder, which
//!    writes a record only if the address is in a watched range.
//!
//! Toggling tracing off therefore does not silence already-probed code, and
//! toggling it on does not retroactively probe code seen while it was off.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Replay a synthetic target program through the tracer
//! seltrace run demo.json -o demo.out
//!
//! # Count what was recorded
//! seltrace summary demo.out
//! ```

pub mod cli;
pub mod domain;
pub mod engine;
pub mod output;
pub mod session;
pub mod tracer;

pub use session::{Session, SessionConfig, SessionStats};
