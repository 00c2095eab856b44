use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide run counters, shared between the scheduler, the pipeline
/// runs, and the status endpoint. Monotonically non-decreasing for the
/// process lifetime; only a restart resets them.
#[derive(Debug, Default)]
pub struct RunCounters {
    links_generated: AtomicU64,
    valid_links: AtomicU64,
    insights_extracted: AtomicU64,
    failed_validations: AtomicU64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_generated(&self, count: u64) {
        self.links_generated.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_valid_link(&self) {
        self.valid_links.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insight(&self) {
        self.insights_extracted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed_validation(&self) {
        self.failed_validations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            links_generated: self.links_generated.load(Ordering::Relaxed),
            valid_links: self.valid_links.load(Ordering::Relaxed),
            insights_extracted: self.insights_extracted.load(Ordering::Relaxed),
            failed_validations: self.failed_validations.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub links_generated: u64,
    pub valid_links: u64,
    pub insights_extracted: u64,
    pub failed_validations: u64,
}
