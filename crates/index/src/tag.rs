//! Tag and named-tag index managers.
//!
//! Tags are free-form, lower-cased strings attached to an entry; they all
//! live in the single `$Tag$` store of the entry's type. Named tags are typed
//! key/value pairs, each name getting its own store. Both may be attached to
//! entries of types that were never registered; such types get a schema-less
//! index on first use.

use crate::attribute_index::{AttributeIndex, AttributeValues};
use crate::config::IndexConfig;
use crate::manager::{named_tag_values, tag_values, IndexLookup, IndexManager};
use crate::metadata::EntryMetadata;
use cinder_core::{EntryKey, Result};
use core::ops::Deref;
use std::sync::Arc;
use tracing::trace;

/// Index manager with free-form tag support.
#[derive(Debug, Default)]
pub struct TagIndexManager {
    inner: IndexManager,
}

impl TagIndexManager {
    /// Creates an empty manager.
    pub fn new(config: IndexConfig) -> Self {
        Self {
            inner: IndexManager::new(config),
        }
    }

    /// Attaches tags to an entry. Each tag is indexed as its own value of
    /// the tag store.
    pub fn add_tags<S: AsRef<str>>(&self, key: &EntryKey, type_name: &str, tags: &[S]) -> Result<()> {
        if tags.is_empty() {
            return Ok(());
        }
        let index = self.inner.index_or_schema_less(type_name);
        for tag in tags {
            let tag = tag.as_ref().to_lowercase();
            trace!(key = %key, tag = %tag, "add tag");
            self.inner.add_to_index(key, index.type_name(), &tag_values(&tag))?;
        }
        Ok(())
    }

    /// Detaches tags from an entry.
    pub fn remove_tags<S: AsRef<str>>(&self, key: &EntryKey, type_name: &str, tags: &[S]) -> Result<()> {
        let Some(index) = self.inner.resolve_attribute_index(type_name) else {
            return Ok(());
        };
        for tag in tags {
            let tag = tag.as_ref().to_lowercase();
            self.inner.remove_from_index(key, index.type_name(), &tag_values(&tag))?;
        }
        Ok(())
    }
}

impl Deref for TagIndexManager {
    type Target = IndexManager;

    fn deref(&self) -> &IndexManager {
        &self.inner
    }
}

impl IndexLookup for TagIndexManager {
    fn resolve_attribute_index(&self, type_name: &str) -> Option<Arc<AttributeIndex>> {
        self.inner.resolve_attribute_index(type_name)
    }

    fn metadata(&self, key: &EntryKey) -> Option<Arc<EntryMetadata>> {
        self.inner.metadata(key)
    }
}

/// Index manager with tag and named-tag support.
#[derive(Debug, Default)]
pub struct NamedTagIndexManager {
    inner: TagIndexManager,
}

impl NamedTagIndexManager {
    /// Creates an empty manager.
    pub fn new(config: IndexConfig) -> Self {
        Self {
            inner: TagIndexManager::new(config),
        }
    }

    /// Attaches named tags to an entry, extending its metadata.
    pub fn add_named_tags(&self, key: &EntryKey, type_name: &str, named_tags: &AttributeValues) -> Result<()> {
        if named_tags.is_empty() {
            return Ok(());
        }
        let index = self.inner.index_or_schema_less(type_name);
        self.inner
            .add_to_index(key, index.type_name(), &named_tag_values(named_tags))
    }

    /// Detaches named tags from an entry.
    pub fn remove_named_tags(
        &self,
        key: &EntryKey,
        type_name: &str,
        named_tags: &AttributeValues,
    ) -> Result<()> {
        if self.inner.resolve_attribute_index(type_name).is_none() {
            return Ok(());
        }
        self.inner
            .remove_from_index(key, type_name, &named_tag_values(named_tags))
    }
}

impl Deref for NamedTagIndexManager {
    type Target = TagIndexManager;

    fn deref(&self) -> &TagIndexManager {
        &self.inner
    }
}

impl IndexLookup for NamedTagIndexManager {
    fn resolve_attribute_index(&self, type_name: &str) -> Option<Arc<AttributeIndex>> {
        self.inner.resolve_attribute_index(type_name)
    }

    fn metadata(&self, key: &EntryKey) -> Option<Arc<EntryMetadata>> {
        self.inner.metadata(key)
    }
}
