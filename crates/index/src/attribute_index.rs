//! Attribute index of one object type.
//!
//! An `AttributeIndex` maps every [`AttributeKey`] of a type to the store
//! holding its values. Declared schema attributes get their stores up front
//! and keep them (possibly empty) for the lifetime of the index; tag and
//! named-tag stores are created on first use and dropped once empty.

use crate::attribute::AttributeKey;
use crate::config::IndexConfig;
use crate::definition::TypeDefinition;
use crate::hash::HashStore;
use crate::ordered::OrderedStore;
use crate::traits::{Comparison, IndexStore, KeySet, StoreKind};
use cinder_core::{EntryKey, Error, IndexKey, Result, Value};
use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

/// Attribute name → value map handed to `add_to_index` / `remove_from_index`.
pub type AttributeValues = HashMap<String, Option<Value>>;

type StoreTable = HashMap<AttributeKey, Box<dyn IndexStore>>;

fn new_store(kind: StoreKind) -> Box<dyn IndexStore> {
    match kind {
        StoreKind::Hash => Box::new(HashStore::new()),
        StoreKind::Ordered => Box::new(OrderedStore::new()),
    }
}

/// The stores of one object type within one cache.
#[derive(Debug)]
pub struct AttributeIndex {
    definition: TypeDefinition,
    config: IndexConfig,
    ephemeral: bool,
    stores: RwLock<StoreTable>,
}

impl AttributeIndex {
    /// Creates the index of a registered type, with one store per declared
    /// attribute.
    pub fn new(definition: TypeDefinition, config: IndexConfig) -> Self {
        let stores = definition
            .attributes()
            .iter()
            .map(|attr| (AttributeKey::plain(attr.name()), new_store(attr.store())))
            .collect();
        debug!(
            cache = %config.cache_name,
            type_name = definition.name(),
            attributes = definition.attributes().len(),
            "created attribute index"
        );
        Self {
            definition,
            config,
            ephemeral: false,
            stores: RwLock::new(stores),
        }
    }

    /// Creates an index without declared attributes, used for tags on
    /// entries of unregistered types.
    pub fn schema_less(type_name: &str, config: IndexConfig) -> Self {
        Self::new(TypeDefinition::schema_only(type_name, Vec::new()), config)
    }

    /// Synthesizes a throwaway index holding a single empty store named
    /// `attribute`. It lets a query over an unindexed type run to an empty
    /// result instead of failing.
    pub fn ephemeral(type_name: &str, attribute: &str) -> Self {
        let mut stores = StoreTable::new();
        stores.insert(AttributeKey::plain(attribute), new_store(StoreKind::Hash));
        Self {
            definition: TypeDefinition::schema_only(type_name, Vec::new()),
            config: IndexConfig::default(),
            ephemeral: true,
            stores: RwLock::new(stores),
        }
    }

    /// Returns the type name this index covers.
    #[inline]
    pub fn type_name(&self) -> &str {
        self.definition.name()
    }

    /// Returns the type definition.
    #[inline]
    pub fn definition(&self) -> &TypeDefinition {
        &self.definition
    }

    /// Returns true for an index synthesized by [`AttributeIndex::ephemeral`].
    #[inline]
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Resolves an attribute name to its key.
    ///
    /// Declared names are plain attributes, reserved names map to the tag
    /// namespaces, and any other name is treated as a named tag.
    pub fn resolve_key(&self, name: &str) -> AttributeKey {
        if self.definition.is_declared(name) {
            return AttributeKey::plain(name);
        }
        match AttributeKey::parse(name) {
            AttributeKey::Plain(name) if !self.has_plain_store(&name) => {
                AttributeKey::NamedTag(name)
            }
            key => key,
        }
    }

    /// Adds an entry under every attribute of `values`.
    ///
    /// The whole map is validated before any store is touched.
    pub fn add_to_index(&self, key: &EntryKey, values: &AttributeValues) -> Result<()> {
        let resolved = self.validate(key, values)?;
        let mut stores = self.stores.write();
        for (attribute, value) in resolved {
            if !stores.contains_key(&attribute) {
                let kind = self.store_kind(&attribute);
                debug!(
                    type_name = self.type_name(),
                    attribute = %attribute,
                    ?kind,
                    "created index store"
                );
                stores.insert(attribute.clone(), new_store(kind));
            }
            if let Some(store) = stores.get_mut(&attribute) {
                trace!(key = %key, attribute = %attribute, value = %value, "index add");
                store.add(value, key.clone());
            }
        }
        Ok(())
    }

    /// Removes an entry from every attribute of `values`.
    ///
    /// Declared attributes keep their store when it empties; tag and
    /// named-tag stores are dropped.
    pub fn remove_from_index(&self, key: &EntryKey, values: &AttributeValues) -> Result<()> {
        let resolved = self.validate(key, values)?;
        let mut stores = self.stores.write();
        for (attribute, value) in resolved {
            let Some(store) = stores.get_mut(&attribute) else {
                continue;
            };
            if store.remove(&value, key) {
                trace!(key = %key, attribute = %attribute, value = %value, "index remove");
            }
            if store.is_empty() && attribute.is_dynamic() {
                debug!(
                    type_name = self.type_name(),
                    attribute = %attribute,
                    "dropped empty index store"
                );
                stores.remove(&attribute);
            }
        }
        Ok(())
    }

    /// Removes an entry from the given stores whatever value it is stored
    /// under.
    pub fn purge_entry(&self, key: &EntryKey, attributes: impl IntoIterator<Item = AttributeKey>) {
        let mut stores = self.stores.write();
        for attribute in attributes {
            let Some(store) = stores.get_mut(&attribute) else {
                continue;
            };
            let held: Vec<IndexKey> = store
                .iter()
                .filter(|(_, keys)| keys.contains(key))
                .map(|(value, _)| value.clone())
                .collect();
            for value in held {
                store.remove(&value, key);
            }
            if store.is_empty() && attribute.is_dynamic() {
                stores.remove(&attribute);
            }
        }
    }

    /// Looks up `stored <comparison> value` in one store. Returns `None`
    /// when the store does not exist.
    pub fn get_data(
        &self,
        attribute: &AttributeKey,
        value: &IndexKey,
        comparison: Comparison,
    ) -> Option<KeySet> {
        self.stores
            .read()
            .get(attribute)
            .map(|store| store.get_data(value, comparison))
    }

    /// Runs `f` against one store under the read lock.
    pub fn with_store<R>(
        &self,
        attribute: &AttributeKey,
        f: impl FnOnce(&dyn IndexStore) -> R,
    ) -> Option<R> {
        let stores = self.stores.read();
        stores.get(attribute).map(|store| f(store.as_ref()))
    }

    /// Returns true if a store exists for `attribute`.
    pub fn has_store(&self, attribute: &AttributeKey) -> bool {
        self.stores.read().contains_key(attribute)
    }

    /// Returns the number of value/entry pairs of one store.
    pub fn store_len(&self, attribute: &AttributeKey) -> Option<usize> {
        self.stores.read().get(attribute).map(|store| store.len())
    }

    /// Returns the keys of every existing store, in key order.
    pub fn store_keys(&self) -> Vec<AttributeKey> {
        let mut keys: Vec<_> = self.stores.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns every entry key held by a plain attribute store.
    pub fn attribute_keys(&self) -> KeySet {
        self.collect_keys(|attribute| !attribute.is_dynamic())
    }

    /// Returns every entry key held by the tag and named-tag stores.
    pub fn tag_keys(&self) -> KeySet {
        self.collect_keys(AttributeKey::is_dynamic)
    }

    /// Returns every entry key held by any store.
    pub fn all_keys(&self) -> KeySet {
        self.collect_keys(|_| true)
    }

    /// Empties every store. Dynamic stores are dropped.
    pub fn clear(&self) {
        let mut stores = self.stores.write();
        stores.retain(|attribute, _| !attribute.is_dynamic());
        for store in stores.values_mut() {
            store.clear();
        }
        debug!(type_name = self.type_name(), "cleared attribute index");
    }

    fn has_plain_store(&self, name: &str) -> bool {
        self.stores
            .read()
            .keys()
            .any(|k| matches!(k, AttributeKey::Plain(n) if n == name))
    }

    fn collect_keys(&self, include: impl Fn(&AttributeKey) -> bool) -> KeySet {
        let stores = self.stores.read();
        let mut keys = KeySet::new();
        for (_, store) in stores.iter().filter(|(attribute, _)| include(attribute)) {
            keys.extend(store.all_keys());
        }
        keys
    }

    fn store_kind(&self, attribute: &AttributeKey) -> StoreKind {
        match attribute {
            AttributeKey::Plain(name) => self
                .definition
                .attribute(name)
                .map(|attr| attr.store())
                .unwrap_or_default(),
            AttributeKey::Tag => self.config.tag_store,
            AttributeKey::NamedTag(_) => self.config.named_tag_store,
        }
    }

    fn validate(
        &self,
        key: &EntryKey,
        values: &AttributeValues,
    ) -> Result<Vec<(AttributeKey, IndexKey)>> {
        let mut resolved = Vec::with_capacity(values.len());
        for (name, value) in values {
            let attribute = self.resolve_key(name);
            match &attribute {
                AttributeKey::Tag => {
                    if !matches!(value, Some(Value::String(_))) {
                        return Err(Error::malformed_attributes(
                            key.to_string(),
                            format!("tag value must be a string, got {:?}", value),
                        ));
                    }
                }
                AttributeKey::Plain(name) => {
                    if let Some(def) = self.definition.attribute(name) {
                        if !def.accepts(value.as_ref()) {
                            return Err(Error::malformed_attributes(
                                key.to_string(),
                                format!(
                                    "attribute '{}' expects {:?}, got {:?}",
                                    name,
                                    def.data_type(),
                                    value
                                ),
                            ));
                        }
                    }
                }
                AttributeKey::NamedTag(_) => {}
            }
            resolved.push((attribute, IndexKey::from(value.clone())));
        }
        Ok(resolved)
    }
}
