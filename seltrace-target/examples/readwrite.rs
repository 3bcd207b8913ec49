//! Read/write demo target
//!
//! Fills a watched 100-element buffer, reads it back, then unwatches it and
//! disables tracing. Under a tracer every store in the fill loop and every
//! load in the print loop shows up in the trace log; the final sum does not,
//! because the buffer is no longer watched by then.
//!
//! Run with: cargo run -p seltrace-target --example readwrite

use seltrace_target::{toggle_tracing, unwatch_slice, watch_slice};

fn main() {
    let mut buffer = vec![0u32; 100];

    toggle_tracing(true);
    watch_slice(&buffer);

    for (i, slot) in buffer.iter_mut().enumerate() {
        *slot = std::hint::black_box(u32::try_from(i).unwrap_or(u32::MAX) * 2);
    }
    for value in &buffer {
        print!("{value} ");
    }
    println!();

    unwatch_slice(&buffer);
    toggle_tracing(false);

    let sum: u64 = buffer.iter().map(|&v| u64::from(v)).sum();
    println!("sum = {sum}");
}
