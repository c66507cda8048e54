//! Index manager: the registry of attribute indexes of one cache.

use crate::attribute::{AttributeKey, NAMED_TAG_PREFIX, TAG_ATTRIBUTE};
use crate::attribute_index::{AttributeIndex, AttributeValues};
use crate::config::IndexConfig;
use crate::definition::TypeDefinition;
use crate::metadata::{EntryMetadata, MetadataStore};
use cinder_core::{AttributeSource, EntryKey, Error, Result, Value};
use core::any::Any;
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Lookups the query layer needs from an index manager.
pub trait IndexLookup: Send + Sync {
    /// Returns the attribute index registered for `type_name`.
    fn resolve_attribute_index(&self, type_name: &str) -> Option<Arc<AttributeIndex>>;

    /// Returns the metadata snapshot of an entry.
    fn metadata(&self, key: &EntryKey) -> Option<Arc<EntryMetadata>>;
}

/// Registry of type name → attribute index, plus the entry metadata store.
#[derive(Debug)]
pub struct IndexManager {
    config: IndexConfig,
    indexes: RwLock<HashMap<String, Arc<AttributeIndex>>>,
    metadata: MetadataStore,
}

impl IndexManager {
    /// Creates an empty manager.
    pub fn new(config: IndexConfig) -> Self {
        let metadata = MetadataStore::new(config.fold_metadata_case);
        Self {
            config,
            indexes: RwLock::new(HashMap::new()),
            metadata,
        }
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Registers a type, replacing any earlier registration of the same name.
    pub fn register_type(&self, definition: TypeDefinition) -> Arc<AttributeIndex> {
        let name = definition.name().to_string();
        let index = Arc::new(AttributeIndex::new(definition, self.config.clone()));
        if self.indexes.write().insert(name.clone(), index.clone()).is_some() {
            warn!(cache = %self.config.cache_name, type_name = %name, "replaced type registration");
        }
        index
    }

    /// Returns the registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.indexes.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Extracts the declared attributes of `object` through its type's
    /// accessor table and indexes them.
    pub fn index_object(&self, key: &EntryKey, type_name: &str, object: &dyn Any) -> Result<()> {
        let index = self.registered(type_name)?;
        let values = index.definition().extract(object);
        self.index_values(&index, key, &values)
    }

    /// Removes the declared attributes of `object` from its type's index.
    pub fn unindex_object(&self, key: &EntryKey, type_name: &str, object: &dyn Any) -> Result<()> {
        let index = self.registered(type_name)?;
        let values = index.definition().extract(object);
        self.unindex_values(&index, key, &values)
    }

    /// Indexes an explicit attribute map for an entry of a registered type.
    pub fn add_to_index(&self, key: &EntryKey, type_name: &str, values: &AttributeValues) -> Result<()> {
        let index = self.registered(type_name)?;
        self.index_values(&index, key, values)
    }

    /// Removes an explicit attribute map for an entry of a registered type.
    pub fn remove_from_index(
        &self,
        key: &EntryKey,
        type_name: &str,
        values: &AttributeValues,
    ) -> Result<()> {
        let index = self.registered(type_name)?;
        self.unindex_values(&index, key, values)
    }

    /// Removes everything recorded for an entry (attributes, tags and named
    /// tags) and drops its metadata. Returns false if the entry was unknown.
    pub fn remove_entry(&self, key: &EntryKey) -> Result<bool> {
        let Some(meta) = self.metadata.remove(key) else {
            return Ok(false);
        };
        let Some(index) = self.resolve_attribute_index(meta.type_name()) else {
            return Ok(true);
        };

        // Metadata values may be case-folded, so stores are purged by key.
        let attributes = meta.attributes().keys().map(|name| AttributeKey::plain(name.as_str()));
        let named_tags = meta
            .named_tags()
            .keys()
            .map(|name| AttributeKey::named_tag(name.as_str()));
        let tags = (!meta.tags().is_empty()).then_some(AttributeKey::Tag);
        index.purge_entry(key, attributes.chain(named_tags).chain(tags));
        debug!(key = %key, type_name = index.type_name(), "removed entry from index");
        Ok(true)
    }

    /// Empties every index and forgets all metadata. Registrations stay.
    pub fn clear(&self) {
        for index in self.indexes.read().values() {
            index.clear();
        }
        self.metadata.clear();
    }

    /// Returns the metadata store.
    pub fn metadata_store(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Returns the index of `type_name`, creating a schema-less one for an
    /// unregistered type.
    pub(crate) fn index_or_schema_less(&self, type_name: &str) -> Arc<AttributeIndex> {
        if let Some(index) = self.resolve_attribute_index(type_name) {
            return index;
        }
        let mut indexes = self.indexes.write();
        indexes
            .entry(type_name.to_string())
            .or_insert_with(|| {
                Arc::new(AttributeIndex::schema_less(type_name, self.config.clone()))
            })
            .clone()
    }

    fn registered(&self, type_name: &str) -> Result<Arc<AttributeIndex>> {
        self.resolve_attribute_index(type_name)
            .ok_or_else(|| Error::type_not_registered(type_name))
    }

    fn index_values(&self, index: &AttributeIndex, key: &EntryKey, values: &AttributeValues) -> Result<()> {
        index.add_to_index(key, values)?;
        let split = Split::of(index, values);
        let type_name = index.type_name();
        if !split.attributes.is_empty() {
            self.metadata.record_attributes(key, type_name, &split.attributes);
        }
        if !split.named_tags.is_empty() {
            self.metadata.record_named_tags(key, type_name, &split.named_tags);
        }
        if !split.tags.is_empty() {
            self.metadata.record_tags(key, type_name, &split.tags);
        }
        Ok(())
    }

    fn unindex_values(&self, index: &AttributeIndex, key: &EntryKey, values: &AttributeValues) -> Result<()> {
        index.remove_from_index(key, values)?;
        let split = Split::of(index, values);
        self.metadata.forget_attributes(key, split.attributes.keys());
        self.metadata.forget_named_tags(key, split.named_tags.keys());
        self.metadata.forget_tags(key, &split.tags);
        if self
            .metadata
            .get(key)
            .is_some_and(|meta| meta.is_blank())
        {
            self.metadata.remove(key);
        }
        Ok(())
    }
}

impl Default for IndexManager {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

impl IndexLookup for IndexManager {
    fn resolve_attribute_index(&self, type_name: &str) -> Option<Arc<AttributeIndex>> {
        self.indexes.read().get(type_name).cloned()
    }

    fn metadata(&self, key: &EntryKey) -> Option<Arc<EntryMetadata>> {
        self.metadata.get(key)
    }
}

/// An attribute map split by namespace, for metadata bookkeeping.
struct Split {
    attributes: AttributeValues,
    named_tags: AttributeValues,
    tags: Vec<String>,
}

impl Split {
    fn of(index: &AttributeIndex, values: &AttributeValues) -> Self {
        let mut split = Split {
            attributes: AttributeValues::new(),
            named_tags: AttributeValues::new(),
            tags: Vec::new(),
        };
        for (name, value) in values {
            match index.resolve_key(name) {
                AttributeKey::Plain(name) => {
                    split.attributes.insert(name, value.clone());
                }
                AttributeKey::NamedTag(name) => {
                    split.named_tags.insert(name, value.clone());
                }
                AttributeKey::Tag => {
                    if let Some(Value::String(tag)) = value {
                        split.tags.push(tag.clone());
                    }
                }
            }
        }
        split
    }
}

/// Builds the interchange attribute map of one tag.
pub(crate) fn tag_values(tag: &str) -> AttributeValues {
    let mut values = AttributeValues::with_capacity(1);
    values.insert(TAG_ATTRIBUTE.to_string(), Some(Value::String(tag.to_string())));
    values
}

/// Builds the interchange attribute map of a set of named tags.
pub(crate) fn named_tag_values(named_tags: &AttributeValues) -> AttributeValues {
    named_tags
        .iter()
        .map(|(name, value)| (format!("{}{}", NAMED_TAG_PREFIX, name), value.clone()))
        .collect()
}
