//! # Instrumentation Engine Interface
//!
//! The binary-instrumentation engine is external: it discovers code in the
//! target, decides where to inject calls, and invokes our hooks. The tracer
//! never sees machine code. It only registers against four extension points:
//!
//! | Registration          | Invoked                                     |
//! |-----------------------|---------------------------------------------|
//! | `on_code_discovered`  | once per instruction site, at first sight   |
//! | `on_access`           | per executed probe installed at discovery   |
//! | `intercept_call`      | per call to a named target entry point      |
//! | `on_exit`             | once, at normal process termination         |
//!
//! ## Two-Phase Semantics
//!
//! The discovery hook returns the probes to install for a site, and the engine
//! keeps them for as long as that code stays instrumented. Whatever the trace
//! gate said at discovery time is therefore baked into the site: turning the
//! gate off leaves existing probes in place, and turning it on does not probe
//! sites that were discovered while it was off.
//!
//! [`SimulatedEngine`] implements the interface for tests and script replay.

pub mod script;
pub mod simulated;

use crate::domain::Address;
use seltrace_common::Direction;

pub use script::Script;
pub use simulated::SimulatedEngine;

/// One memory operand of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryOperand {
    pub read: bool,
    pub written: bool,
}

impl MemoryOperand {
    pub const READ: MemoryOperand = MemoryOperand { read: true, written: false };
    pub const WRITE: MemoryOperand = MemoryOperand { read: false, written: true };
    pub const READ_WRITE: MemoryOperand = MemoryOperand { read: true, written: true };
}

/// An instruction as the engine presents it at discovery time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSite {
    pub instruction: Address,
    pub operands: Vec<MemoryOperand>,
}

/// A request to call the access hook for one operand and direction
///
/// An operand that is both read and written gets two probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub operand: usize,
    pub direction: Direction,
}

/// One executed probe: instruction pointer, effective address, direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub instruction: Address,
    pub address: Address,
    pub direction: Direction,
}

pub type DiscoveryHook = Box<dyn Fn(&CodeSite) -> Vec<Probe> + Send + Sync>;
pub type AccessHook = Box<dyn Fn(Access) + Send + Sync>;
pub type CallHook = Box<dyn Fn(&[u64]) + Send + Sync>;
pub type ExitHook = Box<dyn FnOnce(i32) + Send>;

/// Extension points of an instrumentation engine
pub trait Instrumentation {
    /// Register the callback deciding which probes a newly seen site gets
    fn on_code_discovered(&mut self, hook: DiscoveryHook);

    /// Register the callback invoked by every installed probe
    fn on_access(&mut self, hook: AccessHook);

    /// Register the callback for calls to the target function `symbol`,
    /// receiving its integer arguments in order
    fn intercept_call(&mut self, symbol: &'static str, hook: CallHook);

    /// Register the callback run once when the target exits normally
    fn on_exit(&mut self, hook: ExitHook);
}

/// Probes for every read and every write of a site's memory operands
#[must_use]
pub fn probes_for(site: &CodeSite) -> Vec<Probe> {
    let mut probes = Vec::with_capacity(site.operands.len());
    for (operand, kind) in site.operands.iter().enumerate() {
        if kind.read {
            probes.push(Probe { operand, direction: Direction::Read });
        }
        if kind.written {
            probes.push(Probe { operand, direction: Direction::Write });
        }
    }
    probes
}
