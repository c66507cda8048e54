//! Cache collaborator contract and an in-memory reference cache.

use cinder_core::{AttributeSource, EntryKey, Result, Value};
use cinder_index::{AttributeValues, IndexConfig, IndexLookup, NamedTagIndexManager, TypeDefinition};
use core::any::Any;
use core::fmt;
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// One cached object with its tags.
#[derive(Clone)]
pub struct CachedObject {
    type_name: String,
    value: Arc<dyn Any + Send + Sync>,
    tags: Vec<String>,
    named_tags: AttributeValues,
}

impl CachedObject {
    /// Wraps a value of the given type.
    pub fn new<T: Any + Send + Sync>(type_name: impl Into<String>, value: T) -> Self {
        Self {
            type_name: type_name.into(),
            value: Arc::new(value),
            tags: Vec::new(),
            named_tags: AttributeValues::new(),
        }
    }

    /// Attaches free-form tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Attaches a named tag.
    pub fn with_named_tag(mut self, name: impl Into<String>, value: impl Into<Option<Value>>) -> Self {
        self.named_tags.insert(name.into(), value.into());
        self
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    pub fn value(&self) -> &(dyn Any + Send + Sync) {
        self.value.as_ref()
    }

    /// Downcasts the cached value.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    #[inline]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[inline]
    pub fn named_tags(&self) -> &AttributeValues {
        &self.named_tags
    }
}

impl fmt::Debug for CachedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedObject")
            .field("type_name", &self.type_name)
            .field("tags", &self.tags)
            .field("named_tags", &self.named_tags)
            .finish_non_exhaustive()
    }
}

/// An object bound to its definition for direct evaluation.
pub(crate) struct DirectSource<'a> {
    object: &'a CachedObject,
    definition: Option<&'a TypeDefinition>,
}

impl<'a> DirectSource<'a> {
    pub(crate) fn new(object: &'a CachedObject, definition: Option<&'a TypeDefinition>) -> Self {
        Self { object, definition }
    }
}

impl AttributeSource for DirectSource<'_> {
    fn type_name(&self) -> &str {
        self.object.type_name()
    }

    fn attribute(&self, name: &str) -> Option<Option<Value>> {
        let object: &dyn Any = self.object.value();
        self.definition?.read(object, name)
    }

    fn named_tag(&self, name: &str) -> Option<Option<Value>> {
        self.object.named_tags().get(name).cloned()
    }

    fn tags(&self) -> &[String] {
        self.object.tags()
    }
}

/// Storage-tier operations the query engine consumes.
pub trait CacheStore: Send + Sync {
    /// Gets an entry.
    fn get_entry(&self, key: &EntryKey) -> Option<CachedObject>;

    /// Returns the keys of every entry of a type.
    fn keys_of_type(&self, type_name: &str) -> Vec<EntryKey>;

    /// Returns the number of entries of a type.
    fn entry_count(&self, type_name: &str) -> usize;
}

/// A map-backed cache that keeps its indexes in step with every write.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    indexes: NamedTagIndexManager,
    entries: RwLock<HashMap<EntryKey, CachedObject>>,
}

impl InMemoryCache {
    /// Creates an empty cache.
    pub fn new(config: IndexConfig) -> Self {
        Self {
            indexes: NamedTagIndexManager::new(config),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the index manager.
    #[inline]
    pub fn indexes(&self) -> &NamedTagIndexManager {
        &self.indexes
    }

    /// Registers an object type.
    pub fn register_type(&self, definition: TypeDefinition) {
        self.indexes.register_type(definition);
    }

    /// Inserts or replaces an entry and indexes it.
    ///
    /// A replaced entry is removed from the indexes first. If the new object
    /// cannot be indexed, its partial records are dropped, the replaced
    /// entry is indexed again and the cache is left as it was.
    pub fn insert(&self, key: impl Into<EntryKey>, object: CachedObject) -> Result<()> {
        let key = key.into();
        let mut entries = self.entries.write();
        let previous = entries.get(&key);
        if previous.is_some() {
            self.indexes.remove_entry(&key)?;
        }
        if let Err(err) = self.index(&key, &object) {
            warn!(key = %key, type_name = object.type_name(), error = %err, "rejected entry");
            self.indexes.remove_entry(&key)?;
            if let Some(previous) = previous {
                self.index(&key, previous)?;
            }
            return Err(err);
        }
        debug!(key = %key, type_name = object.type_name(), "cached entry");
        entries.insert(key, object);
        Ok(())
    }

    /// Removes an entry and its index records.
    pub fn remove(&self, key: &EntryKey) -> Result<Option<CachedObject>> {
        let mut entries = self.entries.write();
        if entries.contains_key(key) {
            self.indexes.remove_entry(key)?;
        }
        Ok(entries.remove(key))
    }

    /// Gets an entry.
    pub fn get(&self, key: &EntryKey) -> Option<CachedObject> {
        self.entries.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every entry and empties the indexes.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        self.indexes.clear();
        entries.clear();
    }

    fn index(&self, key: &EntryKey, object: &CachedObject) -> Result<()> {
        let type_name = object.type_name();
        if self.indexes.resolve_attribute_index(type_name).is_some() {
            self.indexes.index_object(key, type_name, object.value())?;
        }
        self.indexes.add_tags(key, type_name, object.tags())?;
        self.indexes.add_named_tags(key, type_name, object.named_tags())
    }
}

impl CacheStore for InMemoryCache {
    fn get_entry(&self, key: &EntryKey) -> Option<CachedObject> {
        self.get(key)
    }

    fn keys_of_type(&self, type_name: &str) -> Vec<EntryKey> {
        self.entries
            .read()
            .iter()
            .filter(|(_, object)| object.type_name() == type_name)
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn entry_count(&self, type_name: &str) -> usize {
        self.entries
            .read()
            .values()
            .filter(|object| object.type_name() == type_name)
            .count()
    }
}
