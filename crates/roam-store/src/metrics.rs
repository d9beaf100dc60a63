//! Counters for typed property access
//!
//! Type mismatches are degraded to default values at the call site, so this
//! is where they stay visible.

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for [`crate::PropertyStore`] operations.
#[derive(Debug, Default)]
pub struct StoreMetrics {
    /// Typed reads attempted
    pub reads: AtomicU64,
    /// Reads that found no container or no value
    pub soft_misses: AtomicU64,
    /// Reads whose stored value could not be decoded as the requested type
    pub type_mismatches: AtomicU64,
    /// Successful writes
    pub writes: AtomicU64,
    /// Writes rejected by the store or by serialization
    pub write_failures: AtomicU64,
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_soft_miss(&self) {
        self.soft_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_type_mismatch(&self) {
        self.type_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StoreMetricsSnapshot {
        StoreMetricsSnapshot {
            reads: self.reads.load(Ordering::Relaxed),
            soft_misses: self.soft_misses.load(Ordering::Relaxed),
            type_mismatches: self.type_mismatches.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`StoreMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreMetricsSnapshot {
    pub reads: u64,
    pub soft_misses: u64,
    pub type_mismatches: u64,
    pub writes: u64,
    pub write_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_records() {
        let metrics = StoreMetrics::new();
        metrics.record_read();
        metrics.record_read();
        metrics.record_soft_miss();
        metrics.record_type_mismatch();
        metrics.record_write();
        metrics.record_write_failure();

        let snap = metrics.snapshot();
        assert_eq!(snap.reads, 2);
        assert_eq!(snap.soft_misses, 1);
        assert_eq!(snap.type_mismatches, 1);
        assert_eq!(snap.writes, 1);
        assert_eq!(snap.write_failures, 1);
    }
}
