//! Attribute keys of an attribute index.

use core::fmt;

/// Interchange name of the unnamed-tag bucket.
pub const TAG_ATTRIBUTE: &str = "$Tag$";

/// Interchange prefix of named-tag attributes.
pub const NAMED_TAG_PREFIX: &str = "$NamedTagAttribute$";

/// Key of one store inside an [`AttributeIndex`].
///
/// The reserved tag namespaces are variants rather than string prefixes, so
/// a schema attribute can never collide with them.
///
/// [`AttributeIndex`]: crate::AttributeIndex
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeKey {
    /// A declared schema attribute.
    Plain(String),
    /// The bucket of free-form tags.
    Tag,
    /// A named, typed tag attribute.
    NamedTag(String),
}

impl AttributeKey {
    /// Creates a plain attribute key.
    pub fn plain(name: impl Into<String>) -> Self {
        AttributeKey::Plain(name.into())
    }

    /// Creates a named-tag attribute key.
    pub fn named_tag(name: impl Into<String>) -> Self {
        AttributeKey::NamedTag(name.into())
    }

    /// Parses an interchange name. Anything outside the reserved namespaces
    /// is a plain attribute.
    pub fn parse(name: &str) -> Self {
        if name == TAG_ATTRIBUTE {
            AttributeKey::Tag
        } else if let Some(rest) = name.strip_prefix(NAMED_TAG_PREFIX) {
            AttributeKey::NamedTag(rest.to_string())
        } else {
            AttributeKey::Plain(name.to_string())
        }
    }

    /// Returns true for keys created dynamically (tags and named tags).
    ///
    /// Their stores are dropped when they become empty; plain schema
    /// attributes keep an empty placeholder.
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, AttributeKey::Plain(_))
    }

    /// Returns the bare name, without any reserved prefix.
    pub fn name(&self) -> &str {
        match self {
            AttributeKey::Plain(name) | AttributeKey::NamedTag(name) => name,
            AttributeKey::Tag => TAG_ATTRIBUTE,
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKey::Plain(name) => f.write_str(name),
            AttributeKey::Tag => f.write_str(TAG_ATTRIBUTE),
            AttributeKey::NamedTag(name) => write!(f, "{}{}", NAMED_TAG_PREFIX, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reserved_names() {
        assert_eq!(AttributeKey::parse("$Tag$"), AttributeKey::Tag);
        assert_eq!(
            AttributeKey::parse("$NamedTagAttribute$region"),
            AttributeKey::named_tag("region")
        );
        assert_eq!(AttributeKey::parse("age"), AttributeKey::plain("age"));
    }

    #[test]
    fn test_display_round_trips_reserved_names() {
        for name in ["$Tag$", "$NamedTagAttribute$region", "age"] {
            assert_eq!(AttributeKey::parse(name).to_string(), name);
        }
    }

    #[test]
    fn test_is_dynamic() {
        assert!(!AttributeKey::plain("age").is_dynamic());
        assert!(AttributeKey::Tag.is_dynamic());
        assert!(AttributeKey::named_tag("region").is_dynamic());
    }
}
