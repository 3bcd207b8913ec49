//! # Shared Vocabulary (Tracer ↔ Target Program)
//!
//! Defines the names and shapes shared between the tracer and the programs it
//! traces. The target program exports marker functions under the symbol names
//! below; the instrumentation engine recognises calls to them and forwards
//! their arguments to the tracer's control bridge.
//!
//! ## Key Types
//!
//! - [`ControlEntry`] - One of the three control entry points
//! - [`Direction`] - Whether a memory operand is read or written
//!
//! The log keywords (`watch`, `unwatch`, `toggleTracing`, `R`, `W`, `#eof`)
//! are part of the trace log grammar and must not change.

#![cfg_attr(not(test), no_std)]

use core::fmt;

// ============================================================================
// Control Entry Points
// ============================================================================

/// Symbol of the entry point that adds an address range to the watch set
///
/// Signature in the target: `watch(start: u64, end: u64)`
pub const WATCH_SYMBOL: &str = "watch";

/// Symbol of the entry point that removes an address range from the watch set
///
/// Signature in the target: `unwatch(start: u64, end: u64)`
pub const UNWATCH_SYMBOL: &str = "unwatch";

/// Symbol of the entry point that flips the trace gate
///
/// Signature in the target: `toggleTracing(enable: bool)`
pub const TOGGLE_TRACING_SYMBOL: &str = "toggleTracing";

// ============================================================================
// Trace Log Grammar
// ============================================================================

/// Final line of every trace log that was closed on normal termination
pub const EOF_SENTINEL: &str = "#eof";

/// Default file name of the trace log
pub const DEFAULT_OUTPUT: &str = "seltrace.out";

/// A control entry point exported by the target program
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlEntry {
    Watch,
    Unwatch,
    ToggleTracing,
}

impl ControlEntry {
    /// Every entry point, in the order the engine should intercept them
    pub const ALL: [ControlEntry; 3] =
        [ControlEntry::Watch, ControlEntry::Unwatch, ControlEntry::ToggleTracing];

    /// Exported symbol name, also used as the control record keyword
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            ControlEntry::Watch => WATCH_SYMBOL,
            ControlEntry::Unwatch => UNWATCH_SYMBOL,
            ControlEntry::ToggleTracing => TOGGLE_TRACING_SYMBOL,
        }
    }

    /// Number of integer arguments the engine forwards for this entry point
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            ControlEntry::Watch | ControlEntry::Unwatch => 2,
            ControlEntry::ToggleTracing => 1,
        }
    }

    /// Look up an entry point by its exact symbol name
    ///
    /// Matching is exact: `unwatch` never resolves to [`ControlEntry::Watch`].
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|entry| entry.symbol() == symbol)
    }
}

impl fmt::Display for ControlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ============================================================================
// Memory Accesses
// ============================================================================

/// Direction of a memory access
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Direction {
    Read = 0,
    Write = 1,
}

impl Direction {
    /// Single-character tag used in data records (`R` or `W`)
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Direction::Read => 'R',
            Direction::Write => 'W',
        }
    }

    /// Inverse of [`Direction::tag`]
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "R" => Some(Direction::Read),
            "W" => Some(Direction::Write),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
