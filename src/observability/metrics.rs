//! Metrics registry for tagsift
//!
//! - Counters only, monotonic
//! - Thread-safe, Relaxed atomics
//! - Shared between components through `Arc<MetricsRegistry>`

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for one engine instance
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Range queries issued against posting lists or the catalogue
    range_queries: AtomicU64,
    /// Bulk get/write calls issued (first attempts and retries)
    batch_calls: AtomicU64,
    /// Bulk calls that were retries of an unprocessed residue
    batch_retries: AtomicU64,
    /// Keys or items left unprocessed after the last retry
    residue_entries: AtomicU64,
    /// Identifiers produced by the intersector
    ids_matched: AtomicU64,
    /// Records returned to callers
    records_returned: AtomicU64,
    /// Saves that failed with a residue
    saves_failed: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_range_queries(&self) {
        self.range_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_batch_calls(&self) {
        self.batch_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_batch_retries(&self) {
        self.batch_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_residue_entries(&self, count: u64) {
        self.residue_entries.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_ids_matched(&self, count: u64) {
        self.ids_matched.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_records_returned(&self, count: u64) {
        self.records_returned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_saves_failed(&self) {
        self.saves_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            range_queries: self.range_queries.load(Ordering::Relaxed),
            batch_calls: self.batch_calls.load(Ordering::Relaxed),
            batch_retries: self.batch_retries.load(Ordering::Relaxed),
            residue_entries: self.residue_entries.load(Ordering::Relaxed),
            ids_matched: self.ids_matched.load(Ordering::Relaxed),
            records_returned: self.records_returned.load(Ordering::Relaxed),
            saves_failed: self.saves_failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub range_queries: u64,
    pub batch_calls: u64,
    pub batch_retries: u64,
    pub residue_entries: u64,
    pub ids_matched: u64,
    pub records_returned: u64,
    pub saves_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_range_queries();
        registry.increment_range_queries();
        registry.increment_batch_calls();
        registry.increment_batch_retries();
        registry.add_residue_entries(2);
        registry.add_ids_matched(3);
        registry.add_records_returned(3);
        registry.increment_saves_failed();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.range_queries, 2);
        assert_eq!(snapshot.batch_calls, 1);
        assert_eq!(snapshot.batch_retries, 1);
        assert_eq!(snapshot.residue_entries, 2);
        assert_eq!(snapshot.ids_matched, 3);
        assert_eq!(snapshot.records_returned, 3);
        assert_eq!(snapshot.saves_failed, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.add_ids_matched(7);

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["ids_matched"], 7);
        assert_eq!(json["batch_calls"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_batch_calls();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().batch_calls, 1000);
    }
}
