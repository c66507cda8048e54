//! Ordered store implementation.
//!
//! The ordered store keeps values in a balanced search tree (`BTreeMap`),
//! each node holding the bucket of entry keys sharing that value. Range
//! comparisons walk the tree from the bound instead of scanning every value.

use crate::stats::IndexStats;
use crate::traits::{scan, Comparison, IndexStore, KeySet, StoreKind};
use cinder_core::{EntryKey, IndexKey};
use core::ops::Bound;
use std::collections::BTreeMap;

/// An ordered index store supporting range walks.
#[derive(Debug, Default)]
pub struct OrderedStore {
    /// Value → bucket of entry keys, in value order.
    tree: BTreeMap<IndexKey, KeySet>,
    /// Statistics for this store.
    stats: IndexStats,
}

impl OrderedStore {
    /// Creates a new empty ordered store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the smallest value and its bucket.
    pub fn min(&self) -> Option<(&IndexKey, &KeySet)> {
        self.tree.iter().next()
    }

    /// Returns the largest value and its bucket.
    pub fn max(&self) -> Option<(&IndexKey, &KeySet)> {
        self.tree.iter().next_back()
    }

    fn collect_range(&self, bounds: (Bound<&IndexKey>, Bound<&IndexKey>), into: &mut KeySet) {
        for keys in self.tree.range::<IndexKey, _>(bounds).map(|(_, keys)| keys) {
            into.extend(keys.iter().cloned());
        }
    }
}

impl IndexStore for OrderedStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Ordered
    }

    fn add(&mut self, key: IndexKey, entry: EntryKey) {
        let bucket = self.tree.entry(key).or_default();
        let new_value = bucket.is_empty();
        if bucket.insert(entry) {
            self.stats.record_add(new_value);
        }
    }

    fn remove(&mut self, key: &IndexKey, entry: &EntryKey) -> bool {
        let Some(bucket) = self.tree.get_mut(key) else {
            return false;
        };
        if !bucket.remove(entry) {
            return false;
        }
        // The last key of a value takes its node with it.
        let value_gone = bucket.is_empty();
        if value_gone {
            self.tree.remove(key);
        }
        self.stats.record_remove(value_gone);
        true
    }

    fn clear(&mut self) {
        self.tree.clear();
        self.stats.clear();
    }

    fn len(&self) -> usize {
        self.stats.total_entries()
    }

    fn distinct_values(&self) -> usize {
        self.tree.len()
    }

    fn get_data(&self, key: &IndexKey, comparison: Comparison) -> KeySet {
        let mut result = KeySet::new();
        match comparison {
            Comparison::Equals => {
                if let Some(keys) = self.tree.get(key) {
                    result.extend(keys.iter().cloned());
                }
            }
            Comparison::NotEquals => {
                self.collect_range((Bound::Unbounded, Bound::Excluded(key)), &mut result);
                self.collect_range((Bound::Excluded(key), Bound::Unbounded), &mut result);
            }
            Comparison::Like | Comparison::NotLike => {
                return scan(self.tree.iter(), &comparison.matcher(key));
            }
            range_comparison => {
                if let Some(range) = range_comparison.key_range(key) {
                    self.collect_range(range.bounds(), &mut result);
                }
            }
        }
        result
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&IndexKey, &KeySet)> + '_> {
        Box::new(self.tree.iter())
    }

    fn stats(&self) -> &IndexStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::Value;

    fn int(v: i64) -> IndexKey {
        IndexKey::Value(Value::Int64(v))
    }

    fn keys(items: &[&str]) -> KeySet {
        items.iter().map(|k| EntryKey::from(*k)).collect()
    }

    fn populated() -> OrderedStore {
        let mut store = OrderedStore::new();
        for (v, k) in [(10, "a"), (20, "b"), (20, "b2"), (30, "c"), (40, "d")] {
            store.add(int(v), k.into());
        }
        store
    }

    #[test]
    fn test_ordered_store_equals() {
        let store = populated();
        assert_eq!(store.get_data(&int(20), Comparison::Equals), keys(&["b", "b2"]));
        assert!(store.get_data(&int(25), Comparison::Equals).is_empty());
        assert_eq!(store.len(), 5);
        assert_eq!(store.distinct_values(), 4);
    }

    #[test]
    fn test_ordered_store_ranges() {
        let store = populated();
        assert_eq!(store.get_data(&int(20), Comparison::GreaterThan), keys(&["c", "d"]));
        assert_eq!(
            store.get_data(&int(20), Comparison::GreaterThanEquals),
            keys(&["b", "b2", "c", "d"])
        );
        assert_eq!(store.get_data(&int(20), Comparison::LessThan), keys(&["a"]));
        assert_eq!(store.get_data(&int(20), Comparison::LessThanEquals), keys(&["a", "b", "b2"]));
        assert_eq!(store.get_data(&int(25), Comparison::LessThan), keys(&["a", "b", "b2"]));
        assert_eq!(store.get_data(&int(20), Comparison::NotEquals), keys(&["a", "c", "d"]));
    }

    #[test]
    fn test_ordered_store_null_orders_first() {
        let mut store = populated();
        store.add(IndexKey::Null, "n".into());
        assert_eq!(store.get_data(&int(15), Comparison::LessThan), keys(&["a", "n"]));
        assert_eq!(store.get_data(&IndexKey::Null, Comparison::Equals), keys(&["n"]));
        assert_eq!(store.min().map(|(k, _)| k.clone()), Some(IndexKey::Null));
        assert_eq!(store.max().map(|(k, _)| k.clone()), Some(int(40)));
    }

    #[test]
    fn test_ordered_store_remove_last_key_removes_node() {
        let mut store = populated();
        assert!(store.remove(&int(10), &"a".into()));
        assert_eq!(store.distinct_values(), 3);
        assert!(store.remove(&int(20), &"b".into()));
        assert_eq!(store.distinct_values(), 3);
        assert!(!store.remove(&int(20), &"missing".into()));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_ordered_store_like() {
        let mut store = OrderedStore::new();
        store.add(IndexKey::Value(Value::String("Alpha".into())), "a".into());
        store.add(IndexKey::Value(Value::String("beta".into())), "b".into());
        let pattern = IndexKey::Value(Value::String("a*".into()));
        assert_eq!(store.get_data(&pattern, Comparison::Like), keys(&["a"]));
        assert_eq!(store.get_data(&pattern, Comparison::NotLike), keys(&["b"]));
    }

    #[test]
    fn test_ordered_store_iter_is_sorted() {
        let store = populated();
        let values: Vec<_> = store.iter().map(|(k, _)| k.clone()).collect();
        let mut sorted = values.clone();
        sorted.sort();
        assert_eq!(values, sorted);
    }
}
