//! Index store statistics.

use core::sync::atomic::{AtomicUsize, Ordering};

/// Statistics for an index store.
#[derive(Debug)]
pub struct IndexStats {
    /// Number of value/entry pairs in the store.
    total_entries: AtomicUsize,
    /// Number of distinct values in the store.
    distinct_values: AtomicUsize,
}

impl IndexStats {
    /// Creates a new empty stats instance.
    pub fn new() -> Self {
        Self {
            total_entries: AtomicUsize::new(0),
            distinct_values: AtomicUsize::new(0),
        }
    }

    /// Returns the number of value/entry pairs.
    pub fn total_entries(&self) -> usize {
        self.total_entries.load(Ordering::Relaxed)
    }

    /// Returns the number of distinct values.
    pub fn distinct_values(&self) -> usize {
        self.distinct_values.load(Ordering::Relaxed)
    }

    /// Records one added pair, and a new value if `new_value` is set.
    pub fn record_add(&self, new_value: bool) {
        self.total_entries.fetch_add(1, Ordering::Relaxed);
        if new_value {
            self.distinct_values.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records one removed pair, and a dropped value if `value_gone` is set.
    pub fn record_remove(&self, value_gone: bool) {
        self.total_entries.fetch_sub(1, Ordering::Relaxed);
        if value_gone {
            self.distinct_values.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Resets all counters to zero.
    pub fn clear(&self) {
        self.total_entries.store(0, Ordering::Relaxed);
        self.distinct_values.store(0, Ordering::Relaxed);
    }
}

impl Default for IndexStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for IndexStats {
    fn clone(&self) -> Self {
        Self {
            total_entries: AtomicUsize::new(self.total_entries()),
            distinct_values: AtomicUsize::new(self.distinct_values()),
        }
    }
}
