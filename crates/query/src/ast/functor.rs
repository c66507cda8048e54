//! Functors: value accessors over entries and index stores.

use cinder_core::{AttributeSource, IndexKey, Value};
use cinder_index::{AttributeIndex, AttributeKey, Comparison, IndexStore, KeySet};
use core::fmt;

/// Bitwise operator applied by a [`Functor::Bitwise`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BitwiseOp {
    And,
    Or,
}

impl BitwiseOp {
    fn apply(self, value: i64, mask: i64) -> i64 {
        match self {
            BitwiseOp::And => value & mask,
            BitwiseOp::Or => value | mask,
        }
    }
}

/// Extracts the compared value(s) of an entry.
///
/// A member functor yields exactly one value (null when absent). The tag
/// functor yields every tag of the entry, so it is multi-valued.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Functor {
    /// A declared attribute. Chained member access is a dotted name.
    Member(String),
    /// The free-form tags of an entry.
    Tag,
    /// A named tag.
    NamedTag(String),
    /// `attribute <op> mask`, the attribute decoded as an integer.
    Bitwise {
        attribute: String,
        op: BitwiseOp,
        mask: i64,
    },
}

impl Functor {
    /// Creates a member functor.
    pub fn member(name: impl Into<String>) -> Self {
        Functor::Member(name.into())
    }

    /// Creates a member functor over a chain of members (`address.city`).
    pub fn path<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let path: Vec<String> = members.into_iter().map(|m| m.as_ref().to_string()).collect();
        Functor::Member(path.join("."))
    }

    /// Creates a named-tag functor.
    pub fn named_tag(name: impl Into<String>) -> Self {
        Functor::NamedTag(name.into())
    }

    /// Creates a bitwise functor.
    pub fn bitwise(attribute: impl Into<String>, op: BitwiseOp, mask: i64) -> Self {
        Functor::Bitwise {
            attribute: attribute.into(),
            op,
            mask,
        }
    }

    /// Returns the key of the store this functor reads.
    pub fn attribute_key(&self) -> AttributeKey {
        match self {
            Functor::Member(name) | Functor::Bitwise { attribute: name, .. } => {
                AttributeKey::plain(name.as_str())
            }
            Functor::Tag => AttributeKey::Tag,
            Functor::NamedTag(name) => AttributeKey::named_tag(name.as_str()),
        }
    }

    /// Returns true for functors whose store is created on demand. A
    /// missing dynamic store simply holds nothing.
    pub fn is_dynamic(&self) -> bool {
        self.attribute_key().is_dynamic()
    }

    /// Normalizes a query value for comparison with this functor's values.
    pub fn normalize(&self, value: IndexKey) -> IndexKey {
        match (self, value) {
            (Functor::Tag, IndexKey::Value(v)) => IndexKey::Value(v.case_folded()),
            (_, value) => value,
        }
    }

    /// Evaluates the functor against one entry.
    pub fn evaluate(&self, source: &dyn AttributeSource) -> Vec<IndexKey> {
        match self {
            Functor::Member(name) => vec![IndexKey::from(source.attribute(name).flatten())],
            Functor::NamedTag(name) => vec![IndexKey::from(source.named_tag(name).flatten())],
            Functor::Tag => source
                .tags()
                .iter()
                .map(|tag| IndexKey::Value(Value::String(tag.to_lowercase())))
                .collect(),
            Functor::Bitwise {
                attribute,
                op,
                mask,
            } => {
                let value = IndexKey::from(source.attribute(attribute).flatten());
                vec![transform(&value, *op, *mask)]
            }
        }
    }

    /// Tests the functor's values of one entry against a query value.
    ///
    /// Positive comparisons hold when any value matches. Negative ones
    /// hold when the entry has values and none matches the positive form.
    pub fn test(&self, values: &[IndexKey], comparison: Comparison, query: &IndexKey) -> bool {
        if comparison.is_negative() {
            let positive = comparison.inverse().matcher(query);
            !values.is_empty() && !values.iter().any(|v| positive.test(v))
        } else {
            let matcher = comparison.matcher(query);
            values.iter().any(|v| matcher.test(v))
        }
    }

    /// Looks up the keys whose value satisfies `value <comparison> query` in
    /// the functor's store. Returns `None` when a declared attribute has no
    /// store.
    pub fn lookup(&self, index: &AttributeIndex, comparison: Comparison, query: &IndexKey) -> Option<KeySet> {
        let found = index.with_store(&self.attribute_key(), |store| match self {
            Functor::Bitwise { op, mask, .. } => Self::scan_bitwise(store, *op, *mask, comparison, query),
            Functor::Tag if comparison.is_negative() => {
                let mut keys = store.all_keys();
                for key in store.get_data(query, comparison.inverse()) {
                    keys.remove(&key);
                }
                keys
            }
            _ => store.get_data(query, comparison),
        });
        match found {
            None if self.is_dynamic() => Some(KeySet::new()),
            found => found,
        }
    }

    /// Returns every key of the functor's store.
    pub fn all_keys(&self, index: &AttributeIndex) -> Option<KeySet> {
        match index.with_store(&self.attribute_key(), |store| store.all_keys()) {
            None if self.is_dynamic() => Some(KeySet::new()),
            found => found,
        }
    }

    // No ordering survives a bitwise operation, so the whole store is
    // transformed and tested.
    fn scan_bitwise(
        store: &dyn IndexStore,
        op: BitwiseOp,
        mask: i64,
        comparison: Comparison,
        query: &IndexKey,
    ) -> KeySet {
        let matcher = comparison.matcher(query);
        let mut keys = KeySet::new();
        for (value, bucket) in store.iter() {
            if matcher.test(&transform(value, op, mask)) {
                keys.extend(bucket.iter().cloned());
            }
        }
        keys
    }
}

fn transform(value: &IndexKey, op: BitwiseOp, mask: i64) -> IndexKey {
    match value.value().and_then(Value::to_bits) {
        Some(bits) => IndexKey::Value(Value::Int64(op.apply(bits, mask))),
        None => IndexKey::Null,
    }
}

impl fmt::Display for Functor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Functor::Bitwise {
                attribute,
                op: BitwiseOp::And,
                mask,
            } => write!(f, "({} & {})", attribute, mask),
            Functor::Bitwise {
                attribute,
                op: BitwiseOp::Or,
                mask,
            } => write!(f, "({} | {})", attribute, mask),
            _ => write!(f, "{}", self.attribute_key()),
        }
    }
}
