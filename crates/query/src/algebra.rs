//! Result algebra: the candidate lists carried through an evaluation.
//!
//! The left list holds the keys accepted so far, the right list the keys
//! produced by the predicate just executed.

use cinder_core::EntryKey;
use cinder_index::KeySet;
use core::mem;

/// Combination of child result sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Junction {
    And,
    Or,
}

impl Junction {
    /// Returns the dual junction.
    pub fn flip(self) -> Self {
        match self {
            Junction::And => Junction::Or,
            Junction::Or => Junction::And,
        }
    }
}

/// Left/right candidate lists.
#[derive(Clone, Debug, Default)]
pub struct ResultAlgebra {
    left: KeySet,
    right: KeySet,
}

impl ResultAlgebra {
    /// Creates an empty algebra.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an algebra whose left list is seeded with `keys`.
    pub fn seeded(keys: impl IntoIterator<Item = EntryKey>) -> Self {
        Self {
            left: keys.into_iter().collect(),
            right: KeySet::new(),
        }
    }

    #[inline]
    pub fn left(&self) -> &KeySet {
        &self.left
    }

    #[inline]
    pub fn right(&self) -> &KeySet {
        &self.right
    }

    /// Bulk-loads the right list.
    pub fn populate(&mut self, keys: impl IntoIterator<Item = EntryKey>) {
        self.right.extend(keys);
    }

    /// Promotes right → left and clears right.
    pub fn reduce(&mut self) {
        self.left = mem::take(&mut self.right);
    }

    /// Moves one key from left to right. Returns false if it was not in left.
    pub fn shift(&mut self, key: &EntryKey) -> bool {
        match self.left.take(key) {
            Some(key) => {
                self.right.insert(key);
                true
            }
            None => false,
        }
    }

    /// Unions keys into the right list.
    pub fn merge(&mut self, keys: impl IntoIterator<Item = EntryKey>) {
        self.right.extend(keys);
    }

    /// Replaces the left list, returning the previous one.
    pub fn replace_left(&mut self, keys: KeySet) -> KeySet {
        mem::replace(&mut self.left, keys)
    }

    /// Takes the right list, leaving it empty.
    pub fn take_right(&mut self) -> KeySet {
        mem::take(&mut self.right)
    }

    /// Takes the left list, leaving it empty.
    pub fn take_left(&mut self) -> KeySet {
        mem::take(&mut self.left)
    }
}

/// Orders child sets by size: ascending for `And` so the smallest set
/// bounds the intersection, descending for `Or`. Equal sizes keep child order.
pub fn order_by_size(sets: &mut [KeySet], junction: Junction) {
    match junction {
        Junction::And => sets.sort_by_key(|set| set.len()),
        Junction::Or => sets.sort_by(|a, b| b.len().cmp(&a.len())),
    }
}

/// Intersects size-ordered sets.
pub fn intersect_all(sets: Vec<KeySet>) -> KeySet {
    let mut sets = sets.into_iter();
    let Some(mut result) = sets.next() else {
        return KeySet::new();
    };
    for set in sets {
        if result.is_empty() {
            break;
        }
        result.retain(|key| set.contains(key));
    }
    result
}

/// Unions size-ordered sets, growing the largest one.
pub fn union_all(sets: Vec<KeySet>) -> KeySet {
    let mut sets = sets.into_iter();
    let Some(mut result) = sets.next() else {
        return KeySet::new();
    };
    for set in sets {
        result.extend(set);
    }
    result
}

/// Combines child sets under a junction.
pub fn combine(mut sets: Vec<KeySet>, junction: Junction) -> KeySet {
    order_by_size(&mut sets, junction);
    match junction {
        Junction::And => intersect_all(sets),
        Junction::Or => union_all(sets),
    }
}
