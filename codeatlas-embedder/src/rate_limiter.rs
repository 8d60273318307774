//! Token-bucket rate limiter (spec §4.5: "enforces `≤ max_requests_per_second`.
//! Over-limit callers block.").

use std::time::Instant;
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};

pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<(f64, Instant)>,
}

impl TokenBucket {
    pub fn new(rate_per_sec: f64) -> Self {
        let capacity = rate_per_sec.max(0.001);
        Self {
            capacity,
            refill_per_sec: capacity,
            state: Mutex::new((capacity, Instant::now())),
        }
    }

    /// Blocks until one token is available, then consumes it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut guard = self.state.lock().await;
                let (tokens, last) = &mut *guard;
                let elapsed = last.elapsed().as_secs_f64();
                *tokens = (*tokens + elapsed * self.refill_per_sec).min(self.capacity);
                *last = Instant::now();
                if *tokens >= 1.0 {
                    *tokens -= 1.0;
                    None
                } else {
                    Some(Duration::from_secs_f64((1.0 - *tokens) / self.refill_per_sec))
                }
            };
            match wait {
                None => return,
                Some(d) => sleep(d).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn allows_burst_up_to_capacity_then_throttles() {
        let bucket = Arc::new(TokenBucket::new(10.0));
        let start = Instant::now();
        for _ in 0..10 {
            bucket.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(200), "first burst should be near-instant");
    }
}
