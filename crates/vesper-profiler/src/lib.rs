//! Rolling-average frame counters for debug overlays.
//!
//! Timestamps are plain `f64` milliseconds supplied by the caller, so the
//! counters never read a clock themselves and behave deterministically in tests.

mod counter;
mod perf;

pub use counter::{Counter, CounterOptions, CounterSnapshot};
pub use perf::PerfCounter;

/// Window used by [`PerfCounter::frame`] when the options set none.
pub const DEFAULT_FRAME_WINDOW_MS: f64 = 1000.0;
