//! Index store contract.
//!
//! This module defines the `IndexStore` trait every store strategy
//! implements, the `Comparison` kinds a store answers, and the `KeyRange`
//! the ordered store walks.

use crate::stats::IndexStats;
use cinder_core::pattern_match::WildcardPattern;
use cinder_core::{EntryKey, IndexKey};
use core::fmt;
use core::ops::Bound;
use hashbrown::HashSet;

/// A deduplicated set of entry keys.
pub type KeySet = HashSet<EntryKey>;

/// Comparison kinds a leaf predicate applies between a stored value and a
/// query value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessThanEquals,
    GreaterThanEquals,
    Like,
    NotLike,
}

impl Comparison {
    /// Returns the complementary comparison: for any stored and query value
    /// exactly one of `self` and `self.inverse()` holds.
    pub fn inverse(self) -> Self {
        match self {
            Comparison::Equals => Comparison::NotEquals,
            Comparison::NotEquals => Comparison::Equals,
            Comparison::LessThan => Comparison::GreaterThanEquals,
            Comparison::GreaterThanEquals => Comparison::LessThan,
            Comparison::GreaterThan => Comparison::LessThanEquals,
            Comparison::LessThanEquals => Comparison::GreaterThan,
            Comparison::Like => Comparison::NotLike,
            Comparison::NotLike => Comparison::Like,
        }
    }

    /// Returns the comparison with its operands swapped (`a < b` ⇔ `b > a`).
    pub fn reverse(self) -> Self {
        match self {
            Comparison::LessThan => Comparison::GreaterThan,
            Comparison::GreaterThan => Comparison::LessThan,
            Comparison::LessThanEquals => Comparison::GreaterThanEquals,
            Comparison::GreaterThanEquals => Comparison::LessThanEquals,
            other => other,
        }
    }

    /// Returns true for `NotEquals` and `NotLike`.
    pub fn is_negative(self) -> bool {
        matches!(self, Comparison::NotEquals | Comparison::NotLike)
    }

    /// Returns the contiguous key range selected by this comparison, if any.
    pub fn key_range(self, value: &IndexKey) -> Option<KeyRange<IndexKey>> {
        let value = value.clone();
        match self {
            Comparison::Equals => Some(KeyRange::only(value)),
            Comparison::LessThan => Some(KeyRange::upper_bound(value, true)),
            Comparison::LessThanEquals => Some(KeyRange::upper_bound(value, false)),
            Comparison::GreaterThan => Some(KeyRange::lower_bound(value, true)),
            Comparison::GreaterThanEquals => Some(KeyRange::lower_bound(value, false)),
            Comparison::NotEquals | Comparison::Like | Comparison::NotLike => None,
        }
    }

    /// Prepares a reusable test of stored keys against `value`.
    pub fn matcher(self, value: &IndexKey) -> KeyMatcher {
        match self {
            Comparison::Like | Comparison::NotLike => {
                let pattern = value
                    .value()
                    .and_then(|v| v.as_text())
                    .map(|text| WildcardPattern::new(&text));
                KeyMatcher::Pattern {
                    pattern,
                    negate: self == Comparison::NotLike,
                }
            }
            _ => KeyMatcher::Compare {
                comparison: self,
                value: value.clone(),
            },
        }
    }

    /// Tests one stored key against a query key.
    pub fn matches(self, stored: &IndexKey, query: &IndexKey) -> bool {
        self.matcher(query).test(stored)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Comparison::Equals => "=",
            Comparison::NotEquals => "!=",
            Comparison::LessThan => "<",
            Comparison::GreaterThan => ">",
            Comparison::LessThanEquals => "<=",
            Comparison::GreaterThanEquals => ">=",
            Comparison::Like => "LIKE",
            Comparison::NotLike => "NOT LIKE",
        };
        f.write_str(op)
    }
}

/// A compiled comparison against one query key.
#[derive(Clone, Debug)]
pub enum KeyMatcher {
    /// Ordering comparison.
    Compare { comparison: Comparison, value: IndexKey },
    /// Wildcard match. A query value without text never matches.
    Pattern {
        pattern: Option<WildcardPattern>,
        negate: bool,
    },
}

impl KeyMatcher {
    /// Tests a stored key.
    pub fn test(&self, stored: &IndexKey) -> bool {
        match self {
            KeyMatcher::Compare { comparison, value } => match comparison {
                Comparison::Equals => stored == value,
                Comparison::NotEquals => stored != value,
                Comparison::LessThan => stored < value,
                Comparison::GreaterThan => stored > value,
                Comparison::LessThanEquals => stored <= value,
                Comparison::GreaterThanEquals => stored >= value,
                Comparison::Like | Comparison::NotLike => false,
            },
            KeyMatcher::Pattern { pattern, negate } => {
                let matched = match (pattern, stored.value().and_then(|v| v.as_text())) {
                    (Some(pattern), Some(text)) => pattern.matches(&text),
                    _ => false,
                };
                matched != *negate
            }
        }
    }
}

/// A key range for ordered store walks.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyRange<K> {
    /// All keys
    All,
    /// A single key (equality)
    Only(K),
    /// Keys >= lower bound (> when exclusive)
    LowerBound { value: K, exclusive: bool },
    /// Keys <= upper bound (< when exclusive)
    UpperBound { value: K, exclusive: bool },
}

impl<K: Clone + Ord> KeyRange<K> {
    /// Creates a range for all keys.
    pub fn all() -> Self {
        KeyRange::All
    }

    /// Creates a range for a single key.
    pub fn only(key: K) -> Self {
        KeyRange::Only(key)
    }

    /// Creates a range with a lower bound.
    pub fn lower_bound(value: K, exclusive: bool) -> Self {
        KeyRange::LowerBound { value, exclusive }
    }

    /// Creates a range with an upper bound.
    pub fn upper_bound(value: K, exclusive: bool) -> Self {
        KeyRange::UpperBound { value, exclusive }
    }

    /// Returns the range as `Bound`s for `BTreeMap::range`.
    pub fn bounds(&self) -> (Bound<&K>, Bound<&K>) {
        match self {
            KeyRange::All => (Bound::Unbounded, Bound::Unbounded),
            KeyRange::Only(k) => (Bound::Included(k), Bound::Included(k)),
            KeyRange::LowerBound { value, exclusive } => {
                let lower = if *exclusive {
                    Bound::Excluded(value)
                } else {
                    Bound::Included(value)
                };
                (lower, Bound::Unbounded)
            }
            KeyRange::UpperBound { value, exclusive } => {
                let upper = if *exclusive {
                    Bound::Excluded(value)
                } else {
                    Bound::Included(value)
                };
                (Bound::Unbounded, upper)
            }
        }
    }

    /// Checks if a key is within this range.
    pub fn contains(&self, key: &K) -> bool {
        match self {
            KeyRange::All => true,
            KeyRange::Only(k) => key == k,
            KeyRange::LowerBound { value, exclusive } => {
                if *exclusive {
                    key > value
                } else {
                    key >= value
                }
            }
            KeyRange::UpperBound { value, exclusive } => {
                if *exclusive {
                    key < value
                } else {
                    key <= value
                }
            }
        }
    }
}

/// Store strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum StoreKind {
    /// Unordered map, O(1) equality.
    #[default]
    Hash,
    /// Ordered tree, range walks.
    Ordered,
}

/// Core trait for all index stores: attribute value → set of entry keys.
pub trait IndexStore: fmt::Debug + Send + Sync {
    /// Returns the strategy of this store.
    fn kind(&self) -> StoreKind;

    /// Adds an entry key under a value.
    fn add(&mut self, key: IndexKey, entry: EntryKey);

    /// Removes an entry key from a value. Returns true if it was present.
    fn remove(&mut self, key: &IndexKey, entry: &EntryKey) -> bool;

    /// Clears all entries from the store.
    fn clear(&mut self);

    /// Returns the number of value/entry pairs in the store.
    fn len(&self) -> usize;

    /// Returns true if the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of distinct values.
    fn distinct_values(&self) -> usize;

    /// Returns the keys whose stored value satisfies `stored <comparison> key`.
    fn get_data(&self, key: &IndexKey, comparison: Comparison) -> KeySet;

    /// Iterates over (value, keys) pairs.
    fn iter(&self) -> Box<dyn Iterator<Item = (&IndexKey, &KeySet)> + '_>;

    /// Returns every entry key in the store.
    fn all_keys(&self) -> KeySet {
        self.iter().flat_map(|(_, keys)| keys.iter().cloned()).collect()
    }

    /// Returns the statistics for this store.
    fn stats(&self) -> &IndexStats;
}

/// Collects the keys of every bucket whose value passes `matcher`.
pub(crate) fn scan<'a>(
    buckets: impl Iterator<Item = (&'a IndexKey, &'a KeySet)>,
    matcher: &KeyMatcher,
) -> KeySet {
    let mut result = KeySet::new();
    for (value, keys) in buckets {
        if matcher.test(value) {
            result.extend(keys.iter().cloned());
        }
    }
    result
}
