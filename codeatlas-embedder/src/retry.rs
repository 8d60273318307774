//! Exponential backoff with jitter (spec §4.5):
//! `delay_i = min(max_delay, base_delay * 2^i * (1 + jitter))`, jitter ∈ [0, 0.5).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub fn backoff_delay(base: Duration, max: Duration, attempt: u32, jitter: f64) -> Duration {
    let jitter = jitter.clamp(0.0, 0.5 - f64::EPSILON);
    let factor = 2f64.powi(attempt as i32) * (1.0 + jitter);
    let scaled = base.as_secs_f64() * factor;
    Duration::from_secs_f64(scaled.min(max.as_secs_f64()))
}

/// A jitter value in `[0, 0.5)` derived from the wall clock and the retry
/// attempt, not a cryptographic source — this only needs to avoid
/// synchronized retry storms across concurrent batches.
pub fn sample_jitter(attempt: u32) -> f64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let mixed = nanos.wrapping_mul(2654435761).wrapping_add(attempt.wrapping_mul(40503));
    (mixed % 500_000) as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_exponentially_and_caps_at_max() {
        let base = Duration::from_millis(100);
        let max = Duration::from_secs(2);
        let d0 = backoff_delay(base, max, 0, 0.0);
        let d1 = backoff_delay(base, max, 1, 0.0);
        let d2 = backoff_delay(base, max, 2, 0.0);
        assert_eq!(d0, Duration::from_millis(100));
        assert_eq!(d1, Duration::from_millis(200));
        assert_eq!(d2, Duration::from_millis(400));
        let d10 = backoff_delay(base, max, 10, 0.0);
        assert_eq!(d10, max);
    }

    #[test]
    fn jitter_always_within_range() {
        for attempt in 0..50 {
            let j = sample_jitter(attempt);
            assert!(j >= 0.0 && j < 0.5);
        }
    }
}
