use std::ops::Deref;

use crate::DEFAULT_FRAME_WINDOW_MS;
use crate::counter::{Counter, CounterOptions};

/// A [`Counter`] fed by elapsed time: span timings or frame rate.
#[derive(Debug, Clone)]
pub struct PerfCounter {
    counter: Counter,
    time: f64,
}

impl PerfCounter {
    pub fn new(id: impl Into<String>, options: CounterOptions, now: f64) -> Self {
        Self {
            counter: Counter::new(id, options, now),
            time: now,
        }
    }

    /// Open a timed span.
    pub fn start(&mut self, now: f64) {
        self.time = now;
    }

    /// Close the span: the value becomes the elapsed milliseconds.
    pub fn end(&mut self, now: f64) {
        let elapsed = now - self.time;
        self.counter.set_value(elapsed);
        self.counter.accumulate(elapsed, now);
    }

    /// Close the current span and open the next one at the same instant.
    pub fn tick(&mut self, now: f64) {
        self.end(now);
        self.start(now);
    }

    /// Count one frame. Once more than the window has passed, the value
    /// becomes the frame rate over it.
    pub fn frame(&mut self, now: f64) {
        let elapsed = now - self.time;
        self.counter.total += 1;
        let window = self
            .counter
            .options()
            .average_window_ms
            .unwrap_or(DEFAULT_FRAME_WINDOW_MS);

        if elapsed > window {
            let fps = self.counter.total as f64 * 1000.0 / elapsed;
            self.counter.set_value(fps);
            self.counter.total = 0;
            self.time = now;
            self.counter.accumulate(fps, now);
        }
    }

    pub fn counter(&self) -> &Counter {
        &self.counter
    }
}

impl Deref for PerfCounter {
    type Target = Counter;

    fn deref(&self) -> &Counter {
        &self.counter
    }
}
