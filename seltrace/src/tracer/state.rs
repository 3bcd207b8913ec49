//! Shared tracing state
//!
//! The range registry and trace gate live behind one `RwLock`. Control calls
//! take the write side; the per-access filter and the code-discovery callback
//! take the read side, so concurrent accesses never wait on each other.

use super::{RangeRegistry, TraceGate};
use crate::domain::Address;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Registry and gate, mutated together by the control bridge
#[derive(Debug, Default)]
pub struct TraceState {
    pub registry: RangeRegistry,
    pub gate: TraceGate,
}

/// Synchronisation boundary around [`TraceState`]
#[derive(Debug, Default)]
pub struct SharedState {
    inner: RwLock<TraceState>,
}

impl SharedState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning is ignored: no mutation spans more than one statement.
    pub fn read(&self) -> RwLockReadGuard<'_, TraceState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, TraceState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    #[must_use]
    pub fn is_watched(&self, addr: Address) -> bool {
        self.read().registry.contains(addr)
    }

    #[must_use]
    pub fn tracing_enabled(&self) -> bool {
        self.read().gate.is_enabled()
    }
}
