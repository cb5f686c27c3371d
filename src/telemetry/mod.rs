//! 遥测模块：为缓存与限流统计提供有界的时间戳滚动窗口。
//!
//! # Telemetry Module
//!
//! Shared statistics plumbing for the cache and the rate limiter: a
//! fixed-capacity rolling window of recent event timestamps used for
//! instantaneous-rate estimation. Derived metrics (hit rate, current
//! rate) are always recomputed from raw samples on demand so no
//! floating-point drift accumulates in stored aggregates.

use std::collections::VecDeque;
use std::time::Instant;

/// Number of timestamps retained for rate estimation.
pub const WINDOW_CAPACITY: usize = 100;

/// Fixed-capacity rolling window of event timestamps.
///
/// The oldest sample is discarded as the newest arrives, so memory stays
/// bounded regardless of traffic volume.
#[derive(Debug, Clone)]
pub struct RequestWindow {
    samples: VecDeque<Instant>,
    capacity: usize,
}

impl RequestWindow {
    /// Rate estimation needs two samples, so the capacity floor is 2.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an event at the current instant.
    pub fn record(&mut self) {
        self.record_at(Instant::now());
    }

    pub fn record_at(&mut self, at: Instant) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(at);
    }

    /// Estimated events per second over the retained window.
    ///
    /// Derived from the span between the earliest and most recent samples;
    /// 0.0 when fewer than two samples exist or the span is zero.
    pub fn rate(&self) -> f64 {
        let (first, last) = match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) if self.samples.len() >= 2 => (*first, *last),
            _ => return 0.0,
        };
        let span = last.duration_since(first).as_secs_f64();
        if span > 0.0 {
            (self.samples.len() - 1) as f64 / span
        } else {
            0.0
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for RequestWindow {
    fn default() -> Self {
        Self::new(WINDOW_CAPACITY)
    }
}
