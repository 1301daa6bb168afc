use log::trace;
use serde::{Deserialize, Serialize};

/// How a counter averages, rounds and alarms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterOptions {
    /// Length of the rolling window. `None` disables averaging.
    pub average_window_ms: Option<f64>,
    /// Alarm when the value drops below this.
    pub below: Option<f64>,
    /// Alarm when the value rises above this.
    pub over: Option<f64>,
    /// Round [`Counter::human`] to whole numbers.
    pub is_integer: bool,
}

impl CounterOptions {
    pub fn averaged(window_ms: f64) -> Self {
        Self {
            average_window_ms: Some(window_ms),
            ..Self::default()
        }
    }
}

/// Serializable view of a counter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterSnapshot {
    pub id: String,
    pub value: f64,
    pub average: f64,
    pub human: f64,
    pub alarm: bool,
}

/// A named value with an optional rolling average.
///
/// Samples are accumulated until `average_window_ms` has elapsed since the
/// window opened; the mean of the window is then published as the averaged
/// value and a new window starts at that timestamp.
#[derive(Debug, Clone)]
pub struct Counter {
    id: String,
    options: CounterOptions,
    value: f64,
    pub(crate) total: u64,
    average_value: f64,
    accum_value: f64,
    accum_samples: u32,
    accum_start: f64,
}

impl Counter {
    pub fn new(id: impl Into<String>, options: CounterOptions, now: f64) -> Self {
        Self {
            id: id.into(),
            options,
            value: 0.0,
            total: 0,
            average_value: 0.0,
            accum_value: 0.0,
            accum_samples: 0,
            accum_start: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &CounterOptions {
        &self.options
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    pub fn add(&mut self, delta: f64) {
        self.value += delta;
    }

    /// Last published window mean; `0` until the first window closes.
    pub fn average(&self) -> f64 {
        self.average_value
    }

    /// Fold the current value into the rolling window.
    pub fn sample(&mut self, now: f64) {
        self.accumulate(self.value, now);
    }

    /// The displayed value: the window mean when averaging, otherwise the raw
    /// value, rounded to an integer or to two decimals.
    pub fn human(&self) -> f64 {
        let value = if self.options.average_window_ms.is_some() {
            self.average_value
        } else {
            self.value
        };
        if self.options.is_integer {
            value.round()
        } else {
            (value * 100.0).round() / 100.0
        }
    }

    /// Whether the current value is outside the `below`/`over` bounds.
    pub fn alarm(&self) -> bool {
        self.options.below.is_some_and(|below| self.value < below)
            || self.options.over.is_some_and(|over| self.value > over)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            id: self.id.clone(),
            value: self.value,
            average: self.average_value,
            human: self.human(),
            alarm: self.alarm(),
        }
    }

    pub(crate) fn accumulate(&mut self, value: f64, now: f64) {
        let Some(window) = self.options.average_window_ms else {
            return;
        };
        self.accum_value += value;
        self.accum_samples += 1;
        if now - self.accum_start >= window {
            self.average_value = self.accum_value / f64::from(self.accum_samples);
            trace!(
                "Counter {} averaged {:.3} over {} samples",
                self.id, self.average_value, self.accum_samples
            );
            self.accum_value = 0.0;
            self.accum_samples = 0;
            self.accum_start = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_published_when_window_elapses() {
        let mut counter = Counter::new("draws", CounterOptions::averaged(100.0), 0.0);
        for (t, v) in [(10.0, 2.0), (50.0, 4.0), (90.0, 6.0)] {
            counter.set_value(v);
            counter.sample(t);
        }
        assert_eq!(counter.average(), 0.0);

        counter.set_value(8.0);
        counter.sample(100.0);
        assert_eq!(counter.average(), 5.0);

        // The next window starts at 100.
        counter.set_value(1.0);
        counter.sample(150.0);
        assert_eq!(counter.average(), 5.0);
        counter.sample(200.0);
        assert_eq!(counter.average(), 1.0);
    }

    #[test]
    fn test_sample_without_window_is_ignored() {
        let mut counter = Counter::new("raw", CounterOptions::default(), 0.0);
        counter.set_value(3.0);
        counter.sample(10_000.0);
        assert_eq!(counter.average(), 0.0);
        assert_eq!(counter.human(), 3.0);
    }

    #[test]
    fn test_human_rounding() {
        let mut counter = Counter::new("ms", CounterOptions::default(), 0.0);
        counter.set_value(16.66666);
        assert_eq!(counter.human(), 16.67);

        let mut integer = Counter::new(
            "tris",
            CounterOptions {
                is_integer: true,
                ..CounterOptions::default()
            },
            0.0,
        );
        integer.set_value(1234.6);
        assert_eq!(integer.human(), 1235.0);
    }

    #[test]
    fn test_alarm_bounds() {
        let options = CounterOptions {
            below: Some(30.0),
            over: Some(120.0),
            ..CounterOptions::default()
        };
        let mut counter = Counter::new("fps", options, 0.0);
        counter.set_value(60.0);
        assert!(!counter.alarm());
        counter.set_value(29.0);
        assert!(counter.alarm());
        counter.set_value(121.0);
        assert!(counter.alarm());
    }

    #[test]
    fn test_add_accumulates_value() {
        let mut counter = Counter::new("batches", CounterOptions::default(), 0.0);
        counter.add(2.0);
        counter.add(3.0);
        assert_eq!(counter.value(), 5.0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut counter = Counter::new("draws", CounterOptions::default(), 0.0);
        counter.set_value(12.3456);
        let json = serde_json::to_value(counter.snapshot()).unwrap();
        assert_eq!(json["id"], "draws");
        assert_eq!(json["human"], 12.35);
        assert_eq!(json["alarm"], false);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: CounterOptions =
            serde_json::from_str(r#"{"average_window_ms": 500.0}"#).unwrap();
        assert_eq!(options.average_window_ms, Some(500.0));
        assert!(!options.is_integer);
        assert_eq!(options.below, None);
    }
}
