//! Hash store implementation.
//!
//! This module provides a hash-based store for O(1) equality lookups. Every
//! other comparison kind scans all stored values.

use crate::stats::IndexStats;
use crate::traits::{scan, Comparison, IndexStore, KeySet, StoreKind};
use cinder_core::{EntryKey, IndexKey};
use hashbrown::HashMap;

/// A hash-based index store.
#[derive(Debug, Default)]
pub struct HashStore {
    /// The underlying map from values to entry keys.
    map: HashMap<IndexKey, KeySet>,
    /// Statistics for this store.
    stats: IndexStats,
}

impl HashStore {
    /// Creates a new empty hash store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IndexStore for HashStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Hash
    }

    fn add(&mut self, key: IndexKey, entry: EntryKey) {
        let bucket = self.map.entry(key).or_default();
        let new_value = bucket.is_empty();
        if bucket.insert(entry) {
            self.stats.record_add(new_value);
        }
    }

    fn remove(&mut self, key: &IndexKey, entry: &EntryKey) -> bool {
        let Some(bucket) = self.map.get_mut(key) else {
            return false;
        };
        if !bucket.remove(entry) {
            return false;
        }
        let value_gone = bucket.is_empty();
        if value_gone {
            self.map.remove(key);
        }
        self.stats.record_remove(value_gone);
        true
    }

    fn clear(&mut self) {
        self.map.clear();
        self.stats.clear();
    }

    fn len(&self) -> usize {
        self.stats.total_entries()
    }

    fn distinct_values(&self) -> usize {
        self.map.len()
    }

    fn get_data(&self, key: &IndexKey, comparison: Comparison) -> KeySet {
        match comparison {
            Comparison::Equals => self.map.get(key).cloned().unwrap_or_default(),
            _ => scan(self.map.iter(), &comparison.matcher(key)),
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&IndexKey, &KeySet)> + '_> {
        Box::new(self.map.iter())
    }

    fn stats(&self) -> &IndexStats {
        &self.stats
    }
}
