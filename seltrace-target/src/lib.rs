//! # Target-Side Control Markers
//!
//! Link this crate into a program that should be traced by seltrace. The
//! three marker functions do nothing on their own: the instrumentation engine
//! intercepts calls to them by symbol name and forwards the arguments to the
//! tracer. Outside a traced run they are cheap no-ops.
//!
//! ```no_run
//! use seltrace_target::{watch_slice, unwatch_slice, TracingGuard};
//!
//! let mut buffer = vec![0u32; 100];
//! let _tracing = TracingGuard::enable();
//! watch_slice(&buffer);
//! for (i, slot) in buffer.iter_mut().enumerate() {
//!     *slot = i as u32 * 2;
//! }
//! unwatch_slice(&buffer);
//! ```
//!
//! Only code the engine discovers after tracing is enabled gets probed, so
//! enable tracing before the first execution of the code of interest.

// The markers must keep their exact, unmangled symbol names for interception
#![allow(unsafe_code)]

use std::hint::black_box;

/// Start recording accesses to `[start, end]` (inclusive)
#[no_mangle]
#[inline(never)]
pub extern "C" fn watch(start: u64, end: u64) {
    black_box((start, end));
}

/// Stop recording accesses to the watched range overlapping `[start, end]`
#[no_mangle]
#[inline(never)]
pub extern "C" fn unwatch(start: u64, end: u64) {
    black_box((start, end));
}

/// Enable or disable probing of code discovered from now on
#[export_name = "toggleTracing"]
#[inline(never)]
pub extern "C" fn toggle_tracing(enable: bool) {
    black_box(enable);
}

/// Inclusive address bounds of a slice's memory, `None` if it occupies none
#[must_use]
pub fn slice_bounds<T>(slice: &[T]) -> Option<(u64, u64)> {
    let len = std::mem::size_of_val(slice) as u64;
    if len == 0 {
        return None;
    }
    let start = slice.as_ptr() as u64;
    Some((start, start + (len - 1)))
}

/// Watch every byte of `slice`; empty slices are ignored
pub fn watch_slice<T>(slice: &[T]) {
    if let Some((start, end)) = slice_bounds(slice) {
        watch(start, end);
    }
}

/// Unwatch the range covering `slice`; empty slices are ignored
pub fn unwatch_slice<T>(slice: &[T]) {
    if let Some((start, end)) = slice_bounds(slice) {
        unwatch(start, end);
    }
}

/// Enables tracing while alive, disables it on drop
#[must_use = "tracing is disabled again as soon as the guard is dropped"]
pub struct TracingGuard(());

impl TracingGuard {
    pub fn enable() -> Self {
        toggle_tracing(true);
        TracingGuard(())
    }
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        toggle_tracing(false);
    }
}
