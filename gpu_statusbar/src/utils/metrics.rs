//! Poll timing metrics

use std::collections::VecDeque;
use std::time::Duration;

/// Rolling average calculator
#[derive(Debug, Clone)]
pub struct RollingAverage {
    values: VecDeque<f64>,
    capacity: usize,
    sum: f64,
}

impl RollingAverage {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
        }
    }

    pub fn add(&mut self, value: f64) {
        if self.values.len() >= self.capacity {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }

        self.values.push_back(value);
        self.sum += value;
    }

    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum / self.values.len() as f64
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// How long `poll_tick` takes, as seen by the UI thread.
#[derive(Debug, Clone)]
pub struct TickMetrics {
    poll_times: RollingAverage,
    last_poll: Duration,
    max_poll: Duration,
    overruns: u64,
    tick_count: u64,
}

impl TickMetrics {
    pub fn new(history_length: usize) -> Self {
        Self {
            poll_times: RollingAverage::new(history_length),
            last_poll: Duration::ZERO,
            max_poll: Duration::ZERO,
            overruns: 0,
            tick_count: 0,
        }
    }

    /// Record one tick. Returns true when it took longer than `interval`.
    pub fn record(&mut self, poll_duration: Duration, interval: Duration) -> bool {
        self.tick_count += 1;
        self.last_poll = poll_duration;
        self.max_poll = self.max_poll.max(poll_duration);
        self.poll_times.add(poll_duration.as_secs_f64());

        let overrun = poll_duration > interval;
        if overrun {
            self.overruns += 1;
        }
        overrun
    }

    pub fn average_poll_ms(&self) -> f64 {
        self.poll_times.average() * 1000.0
    }

    pub fn last_poll_ms(&self) -> f64 {
        self.last_poll.as_secs_f64() * 1000.0
    }

    pub fn max_poll_ms(&self) -> f64 {
        self.max_poll.as_secs_f64() * 1000.0
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

impl Default for TickMetrics {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_metrics_tracks_overruns() {
        let interval = Duration::from_millis(100);
        let mut metrics = TickMetrics::new(4);

        assert!(!metrics.record(Duration::from_millis(20), interval));
        assert!(metrics.record(Duration::from_millis(150), interval));
        // 恰好等于间隔不算超时
        assert!(!metrics.record(interval, interval));

        assert_eq!(metrics.tick_count(), 3);
        assert_eq!(metrics.overruns(), 1);
        assert!((metrics.max_poll_ms() - 150.0).abs() < 1e-6);
        assert!((metrics.last_poll_ms() - 100.0).abs() < 1e-6);
        assert!((metrics.average_poll_ms() - 90.0).abs() < 1e-6);
    }

    #[test]
    fn rolling_average_zero_capacity_keeps_latest() {
        let mut avg = RollingAverage::new(0);
        avg.add(5.0);
        avg.add(7.0);
        assert_eq!(avg.len(), 1);
        assert_eq!(avg.average(), 7.0);
    }
}
