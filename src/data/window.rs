//! Bounded, time-ordered store of recent samples.

use std::collections::VecDeque;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// One probe result: when it was taken and the derived metric value.
///
/// Immutable once created. `value` is jitter in milliseconds or packet loss
/// in percent, never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub at: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    pub fn new(at: DateTime<Utc>, value: f64) -> Self {
        Self { at, value }
    }

    /// A sample stamped with the current time.
    pub fn now(value: f64) -> Self {
        Self::new(Utc::now(), value)
    }
}

/// Sliding window of the most recent samples, ascending by timestamp.
///
/// Every append evicts from the front whatever has fallen outside the
/// retention span, measured against the appended sample's timestamp. Callers
/// guarantee monotonically non-decreasing timestamps; the sampling loop is
/// the only writer.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
    retention: Duration,
}

impl SampleWindow {
    /// Create an empty window retaining `retention` worth of samples.
    pub fn new(retention: StdDuration) -> Self {
        Self {
            samples: VecDeque::new(),
            retention: Duration::from_std(retention).unwrap_or(Duration::MAX),
        }
    }

    /// Append a sample, then evict everything that has aged out.
    ///
    /// The window keeps the half-open span `(now - retention, now]`, so a
    /// sample exactly `retention` old is dropped. Eviction is O(k) in the
    /// number of expired entries, amortized O(1) at a steady sampling rate.
    pub fn append(&mut self, sample: Sample) {
        let cutoff = sample.at - self.retention;
        self.samples.push_back(sample);
        while self.samples.front().is_some_and(|s| s.at <= cutoff) {
            self.samples.pop_front();
        }
    }

    /// A consistent, independently-iterable copy for readers.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    /// Mean value over the current contents, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(|s| s.value).sum();
        Some(sum / self.samples.len() as f64)
    }

    /// The most recently appended sample.
    pub fn latest(&self) -> Option<Sample> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
