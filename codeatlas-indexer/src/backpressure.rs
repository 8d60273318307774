//! Memory and concurrency budget enforcement (spec §4.4.2 / §5).
//!
//! A `tokio::sync::Semaphore` stands in for the goroutine budget G: a permit
//! is one in-flight stage task. The memory budget M is tracked as a plain
//! byte counter; producers are asked to reserve space for what they're about
//! to enqueue before doing so.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Semaphore, SemaphorePermit};

/// Per-item retained-size estimate (spec §5): content bytes plus a flat
/// per-record overhead for symbols/edges/vectors.
pub fn estimate_retained_bytes(content_bytes: usize, symbol_count: usize, edge_count: usize) -> usize {
    content_bytes + symbol_count * 200 + edge_count * 100
}

#[derive(Debug)]
pub struct StreamingController {
    soft_budget: usize,
    hard_budget: usize,
    resident: AtomicUsize,
    slots: Semaphore,
}

#[derive(Debug, thiserror::Error)]
pub enum BackpressureError {
    #[error("memory budget exceeded: {projected} bytes projected against a {budget} byte cap")]
    MemoryBudgetExceeded { projected: usize, budget: usize },
}

impl StreamingController {
    /// `memory_budget_mb` is the soft cap M; the hard cap is 1.1·M per the
    /// concurrency model. `concurrency_budget` is G.
    pub fn new(memory_budget_mb: usize, concurrency_budget: usize) -> Self {
        let soft = memory_budget_mb * 1024 * 1024;
        Self {
            soft_budget: soft,
            hard_budget: (soft as f64 * 1.1) as usize,
            resident: AtomicUsize::new(0),
            slots: Semaphore::new(concurrency_budget.max(1)),
        }
    }

    /// Reserves `bytes` of projected resident memory. Blocks (best-effort
    /// backpressure) once resident usage crosses 0.9·M; rejects outright
    /// once it would cross the hard cap.
    pub async fn reserve(&self, bytes: usize) -> Result<MemoryGuard<'_>, BackpressureError> {
        loop {
            let current = self.resident.load(Ordering::Acquire);
            let projected = current + bytes;
            if projected > self.hard_budget {
                return Err(BackpressureError::MemoryBudgetExceeded {
                    projected,
                    budget: self.hard_budget,
                });
            }
            if (current as f64) > 0.9 * self.soft_budget as f64 {
                tokio::task::yield_now().await;
                continue;
            }
            self.resident.fetch_add(bytes, Ordering::AcqRel);
            return Ok(MemoryGuard { controller: self, bytes });
        }
    }

    /// Acquires one of G concurrency slots; held for the lifetime of a
    /// stage task.
    pub async fn acquire_slot(&self) -> SemaphorePermit<'_> {
        self.slots.acquire().await.expect("semaphore never closed")
    }
}

#[derive(Debug)]
pub struct MemoryGuard<'a> {
    controller: &'a StreamingController,
    bytes: usize,
}

impl Drop for MemoryGuard<'_> {
    fn drop(&mut self) {
        self.controller.resident.fetch_sub(self.bytes, Ordering::AcqRel);
    }
}

/// Convenience wrapper for sharing a controller across tasks spawned onto
/// the runtime (as opposed to `.await`ed inline within a pipeline stage).
pub type SharedController = Arc<StreamingController>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reserve_within_budget_succeeds_and_releases_on_drop() {
        let c = StreamingController::new(1, 4);
        {
            let _g = c.reserve(1024).await.unwrap();
            assert!(c.resident.load(Ordering::Acquire) >= 1024);
        }
        assert_eq!(c.resident.load(Ordering::Acquire), 0);
    }

    #[tokio::test]
    async fn reserve_past_hard_cap_is_rejected() {
        let c = StreamingController::new(1, 4);
        let huge = 2 * 1024 * 1024;
        let err = c.reserve(huge).await.unwrap_err();
        assert!(matches!(err, BackpressureError::MemoryBudgetExceeded { .. }));
    }

    #[test]
    fn estimate_includes_flat_overhead_per_record() {
        assert_eq!(estimate_retained_bytes(100, 2, 3), 100 + 400 + 300);
    }
}
