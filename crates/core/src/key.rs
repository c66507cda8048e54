//! Index keys and entry keys.

use crate::value::Value;
use core::fmt;
use std::sync::Arc;

/// Cache key of an entry.
pub type EntryKey = Arc<str>;

/// A key inside an index store.
///
/// `Null` stands in for an absent attribute value so that "IS NULL" is an
/// ordinary equality lookup. It is equal only to itself and orders before
/// every value (the variant order makes the derived `Ord` do this).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    /// Absent value.
    Null,
    /// Present value.
    Value(Value),
}

impl IndexKey {
    /// Returns true for the null key.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, IndexKey::Null)
    }

    /// Returns the wrapped value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            IndexKey::Null => None,
            IndexKey::Value(v) => Some(v),
        }
    }

    /// Converts back into an optional value.
    pub fn into_value(self) -> Option<Value> {
        match self {
            IndexKey::Null => None,
            IndexKey::Value(v) => Some(v),
        }
    }
}

impl From<Option<Value>> for IndexKey {
    fn from(v: Option<Value>) -> Self {
        match v {
            Some(v) => IndexKey::Value(v),
            None => IndexKey::Null,
        }
    }
}

impl From<Value> for IndexKey {
    fn from(v: Value) -> Self {
        IndexKey::Value(v)
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Null => f.write_str("null"),
            IndexKey::Value(v) => write!(f, "{}", v),
        }
    }
}
