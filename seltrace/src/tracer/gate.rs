//! Trace gate
//!
//! A single process-wide switch. The engine reads it once per code-discovery
//! event to decide whether to install access probes for that code; it is never
//! consulted per access.

/// Whether newly discovered code gets access probes. Off at startup.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TraceGate {
    enabled: bool,
}

impl TraceGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gate, returning the previous value
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.enabled, enabled)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
