//! Read access to the attributes of one candidate entry.

use crate::value::Value;

/// Anything a predicate can be evaluated against directly.
///
/// Implemented by registered objects bound to their accessor table and by
/// entry metadata snapshots.
pub trait AttributeSource {
    /// Name of the object type.
    fn type_name(&self) -> &str;

    /// Looks up an attribute.
    ///
    /// The outer `Option` is `None` when the attribute is unknown for this
    /// source; the inner one is `None` when it is known but null.
    fn attribute(&self, name: &str) -> Option<Option<Value>>;

    /// Looks up a named tag attached to the entry.
    fn named_tag(&self, name: &str) -> Option<Option<Value>> {
        let _ = name;
        None
    }

    /// Free-form tags attached to the entry, lower-cased.
    fn tags(&self) -> &[String] {
        &[]
    }
}
