//! Index configuration.

use crate::traits::StoreKind;

/// Settings shared by every attribute index of one cache instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    /// Name of the owning cache, carried into log events.
    pub cache_name: String,
    /// Store strategy of the free-form tag bucket.
    pub tag_store: StoreKind,
    /// Store strategy of named-tag attributes.
    pub named_tag_store: StoreKind,
    /// Whether entry metadata records textual values lower-cased.
    pub fold_metadata_case: bool,
}

impl IndexConfig {
    /// Creates the default configuration for a named cache.
    pub fn new(cache_name: impl Into<String>) -> Self {
        Self {
            cache_name: cache_name.into(),
            ..Self::default()
        }
    }

    /// Sets the tag bucket store strategy.
    pub fn tag_store(mut self, kind: StoreKind) -> Self {
        self.tag_store = kind;
        self
    }

    /// Sets the named-tag store strategy.
    pub fn named_tag_store(mut self, kind: StoreKind) -> Self {
        self.named_tag_store = kind;
        self
    }

    /// Sets whether metadata values are case-folded.
    pub fn fold_metadata_case(mut self, fold: bool) -> Self {
        self.fold_metadata_case = fold;
        self
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cache_name: String::from("default"),
            tag_store: StoreKind::Hash,
            // Named tags are typed and often range-queried.
            named_tag_store: StoreKind::Ordered,
            fold_metadata_case: true,
        }
    }
}
