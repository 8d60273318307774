//! Adaptive batch sizing (spec §4.4.2): a single writer records commit
//! latency after each batch; everyone else only ever reads the current size.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub struct BatchOptimizer {
    current: AtomicUsize,
    min: usize,
    max: usize,
    target: Duration,
}

impl BatchOptimizer {
    pub fn new(initial: usize, min: usize, max: usize, target: Duration) -> Self {
        let initial = initial.clamp(min, max);
        Self {
            current: AtomicUsize::new(initial),
            min,
            max,
            target,
        }
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    /// Grows or shrinks the batch size from one observed commit latency.
    /// Read-mostly atomic with a single logical writer, matching the "batch
    /// size state" shared-resource note in the concurrency model.
    pub fn record_latency(&self, elapsed: Duration) {
        let half_target = self.target / 2;
        let double_target = self.target * 2;
        self.current
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |b| {
                if elapsed < half_target {
                    Some(grow(b, self.max))
                } else if elapsed > double_target {
                    Some(shrink(b, self.min))
                } else {
                    None
                }
            })
            .ok();
    }
}

fn grow(b: usize, max: usize) -> usize {
    let grown = ((b as f64) * 1.2).ceil() as usize;
    grown.min(max).max(b)
}

fn shrink(b: usize, min: usize) -> usize {
    let shrunk = ((b as f64) * 0.8).floor() as usize;
    shrunk.max(min).min(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_when_latency_well_under_target() {
        let opt = BatchOptimizer::new(10, 5, 100, Duration::from_millis(500));
        opt.record_latency(Duration::from_millis(50));
        assert_eq!(opt.current(), 12);
    }

    #[test]
    fn shrinks_when_latency_well_over_target() {
        let opt = BatchOptimizer::new(10, 5, 100, Duration::from_millis(500));
        opt.record_latency(Duration::from_millis(1200));
        assert_eq!(opt.current(), 8);
    }

    #[test]
    fn stays_within_bounds_regardless_of_repeated_adjustment() {
        let opt = BatchOptimizer::new(10, 5, 20, Duration::from_millis(500));
        for _ in 0..50 {
            opt.record_latency(Duration::from_millis(1));
        }
        assert!(opt.current() <= 20);
        for _ in 0..50 {
            opt.record_latency(Duration::from_secs(5));
        }
        assert!(opt.current() >= 5);
    }

    #[test]
    fn latency_within_band_leaves_size_unchanged() {
        let opt = BatchOptimizer::new(10, 5, 100, Duration::from_millis(500));
        opt.record_latency(Duration::from_millis(500));
        assert_eq!(opt.current(), 10);
    }
}
