//! Metrics collection module
//!
//! Tracks how many searches a run issued, how many failed or were answered
//! from the cache, and how long the engine took to respond.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Search counters for one optimization run
#[derive(Debug, Default)]
pub struct Metrics {
    searches: AtomicU64,
    failures: AtomicU64,
    cache_hits: AtomicU64,
    response_time_ms: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed engine request
    pub fn record_search(&self, elapsed: Duration) {
        self.searches.fetch_add(1, Ordering::Relaxed);
        self.response_time_ms
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a failed engine request
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a count served from the cache
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let searches = self.searches.load(Ordering::Relaxed);
        let total_ms = self.response_time_ms.load(Ordering::Relaxed);
        MetricsSnapshot {
            searches,
            failures: self.failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            avg_response_ms: (searches > 0).then(|| total_ms / searches),
        }
    }
}

/// Point-in-time copy of [`Metrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub searches: u64,
    pub failures: u64,
    pub cache_hits: u64,
    pub avg_response_ms: Option<u64>,
}
