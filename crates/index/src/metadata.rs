//! Per-entry metadata snapshots.
//!
//! Every indexed entry keeps a compact snapshot of its indexed attribute
//! values, named tags and tags. Aggregates and predicate re-evaluation read
//! these snapshots instead of materializing the stored object.

use crate::attribute::AttributeKey;
use crate::attribute_index::AttributeValues;
use cinder_core::{AttributeSource, EntryKey, Value};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Snapshot of one entry's indexed values.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryMetadata {
    key: EntryKey,
    type_name: String,
    attributes: AttributeValues,
    named_tags: AttributeValues,
    tags: Vec<String>,
}

impl EntryMetadata {
    /// Creates an empty snapshot.
    pub fn new(key: EntryKey, type_name: impl Into<String>) -> Self {
        Self {
            key,
            type_name: type_name.into(),
            attributes: AttributeValues::new(),
            named_tags: AttributeValues::new(),
            tags: Vec::new(),
        }
    }

    /// Returns the entry key.
    #[inline]
    pub fn key(&self) -> &EntryKey {
        &self.key
    }

    /// Returns the recorded attribute values.
    #[inline]
    pub fn attributes(&self) -> &AttributeValues {
        &self.attributes
    }

    /// Returns the recorded named tags.
    #[inline]
    pub fn named_tags(&self) -> &AttributeValues {
        &self.named_tags
    }

    /// Returns true if nothing is recorded.
    pub fn is_blank(&self) -> bool {
        self.attributes.is_empty() && self.named_tags.is_empty() && self.tags.is_empty()
    }

    /// Looks up a value by attribute key. The tag bucket has no single value.
    pub fn value_of(&self, key: &AttributeKey) -> Option<Option<Value>> {
        match key {
            AttributeKey::Plain(name) => self.attributes.get(name).cloned(),
            AttributeKey::NamedTag(name) => self.named_tags.get(name).cloned(),
            AttributeKey::Tag => None,
        }
    }
}

impl AttributeSource for EntryMetadata {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn attribute(&self, name: &str) -> Option<Option<Value>> {
        self.attributes.get(name).cloned()
    }

    fn named_tag(&self, name: &str) -> Option<Option<Value>> {
        self.named_tags.get(name).cloned()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Thread-safe map of entry key → metadata snapshot.
#[derive(Debug)]
pub struct MetadataStore {
    entries: RwLock<HashMap<EntryKey, Arc<EntryMetadata>>>,
    fold_case: bool,
}

impl MetadataStore {
    /// Creates an empty store. With `fold_case`, textual values are
    /// recorded lower-cased.
    pub fn new(fold_case: bool) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            fold_case,
        }
    }

    /// Gets the snapshot of an entry.
    pub fn get(&self, key: &EntryKey) -> Option<Arc<EntryMetadata>> {
        self.entries.read().get(key).cloned()
    }

    /// Returns the number of entries with metadata.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no entry has metadata.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records attribute values, replacing any previous value of the same name.
    pub fn record_attributes(&self, key: &EntryKey, type_name: &str, values: &AttributeValues) {
        self.update(key, type_name, |meta, fold| {
            for (name, value) in values {
                meta.attributes.insert(name.clone(), fold(value));
            }
        });
    }

    /// Records named tags, extending the existing snapshot.
    pub fn record_named_tags(&self, key: &EntryKey, type_name: &str, values: &AttributeValues) {
        self.update(key, type_name, |meta, fold| {
            for (name, value) in values {
                meta.named_tags.insert(name.clone(), fold(value));
            }
        });
    }

    /// Records free-form tags (already lower-cased), skipping duplicates.
    pub fn record_tags(&self, key: &EntryKey, type_name: &str, tags: &[String]) {
        self.update(key, type_name, |meta, _| {
            for tag in tags {
                if !meta.tags.contains(tag) {
                    meta.tags.push(tag.clone());
                }
            }
        });
    }

    /// Forgets attribute values of an entry.
    pub fn forget_attributes<'a>(&self, key: &EntryKey, names: impl IntoIterator<Item = &'a String>) {
        self.modify(key, |meta| {
            for name in names {
                meta.attributes.remove(name);
            }
        });
    }

    /// Forgets named tags of an entry.
    pub fn forget_named_tags<'a>(&self, key: &EntryKey, names: impl IntoIterator<Item = &'a String>) {
        self.modify(key, |meta| {
            for name in names {
                meta.named_tags.remove(name);
            }
        });
    }

    /// Forgets tags of an entry.
    pub fn forget_tags(&self, key: &EntryKey, tags: &[String]) {
        self.modify(key, |meta| meta.tags.retain(|t| !tags.contains(t)));
    }

    /// Drops the snapshot of an entry.
    pub fn remove(&self, key: &EntryKey) -> Option<Arc<EntryMetadata>> {
        self.entries.write().remove(key)
    }

    /// Drops every snapshot.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    fn update<F>(&self, key: &EntryKey, type_name: &str, f: F)
    where
        F: FnOnce(&mut EntryMetadata, &dyn Fn(&Option<Value>) -> Option<Value>),
    {
        let fold_case = self.fold_case;
        let fold = move |value: &Option<Value>| match value {
            Some(v) if fold_case => Some(v.case_folded()),
            other => other.clone(),
        };
        let mut entries = self.entries.write();
        let slot = entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(EntryMetadata::new(key.clone(), type_name)));
        f(Arc::make_mut(slot), &fold);
    }

    fn modify<F>(&self, key: &EntryKey, f: F)
    where
        F: FnOnce(&mut EntryMetadata),
    {
        let mut entries = self.entries.write();
        if let Some(slot) = entries.get_mut(key) {
            f(Arc::make_mut(slot));
        }
    }
}

impl Default for MetadataStore {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[(&str, Option<Value>)]) -> AttributeValues {
        items
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_record_and_fold_case() {
        let store = MetadataStore::new(true);
        let key = EntryKey::from("k1");
        store.record_attributes(
            &key,
            "Person",
            &values(&[("name", Some("Alice".into())), ("age", Some(Value::Int32(30)))]),
        );

        let meta = store.get(&key).unwrap();
        assert_eq!(meta.type_name(), "Person");
        assert_eq!(meta.attribute("name"), Some(Some(Value::from("alice"))));
        assert_eq!(meta.attribute("age"), Some(Some(Value::Int32(30))));
        assert_eq!(meta.attribute("missing"), None);
    }

    #[test]
    fn test_no_fold_case() {
        let store = MetadataStore::new(false);
        let key = EntryKey::from("k1");
        store.record_attributes(&key, "Person", &values(&[("name", Some("Alice".into()))]));
        assert_eq!(
            store.get(&key).unwrap().attribute("name"),
            Some(Some(Value::from("Alice")))
        );
    }

    #[test]
    fn test_extend_and_forget() {
        let store = MetadataStore::default();
        let key = EntryKey::from("k1");
        store.record_tags(&key, "Person", &["vip".to_string(), "vip".to_string()]);
        store.record_named_tags(&key, "Person", &values(&[("region", Some("EU".into()))]));

        let meta = store.get(&key).unwrap();
        assert_eq!(meta.tags(), &["vip".to_string()]);
        assert_eq!(
            meta.value_of(&AttributeKey::named_tag("region")),
            Some(Some(Value::from("eu")))
        );

        store.forget_tags(&key, &["vip".to_string()]);
        store.forget_named_tags(&key, &["region".to_string()]);
        let meta = store.get(&key).unwrap();
        assert!(meta.tags().is_empty());
        assert!(meta.named_tags().is_empty());

        assert!(store.remove(&key).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshots_are_copy_on_write() {
        let store = MetadataStore::default();
        let key = EntryKey::from("k1");
        store.record_attributes(&key, "T", &values(&[("a", Some(Value::Int32(1)))]));
        let before = store.get(&key).unwrap();
        store.record_attributes(&key, "T", &values(&[("a", Some(Value::Int32(2)))]));
        assert_eq!(before.attribute("a"), Some(Some(Value::Int32(1))));
        assert_eq!(store.get(&key).unwrap().attribute("a"), Some(Some(Value::Int32(2))));
    }
}
