//! Type definitions and accessor tables.
//!
//! A `TypeDefinition` is registered once per object type. It declares the
//! indexed attributes (with their store strategy and optional data type) and
//! carries an accessor table: attribute name → extraction closure over the
//! concrete Rust type. Chained member access is expressed as a dotted
//! attribute name (`"address.city"`) with its own accessor.

use crate::attribute_index::AttributeValues;
use crate::traits::StoreKind;
use cinder_core::{AttributeSource, DataType, Value};
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;
use hashbrown::HashMap;
use std::sync::Arc;

/// Extraction closure of one attribute.
pub type Accessor = Arc<dyn Fn(&dyn Any) -> Option<Value> + Send + Sync>;

/// A declared, indexed attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeDef {
    name: String,
    store: StoreKind,
    data_type: Option<DataType>,
}

impl AttributeDef {
    /// Creates an attribute definition without a declared data type.
    pub fn new(name: impl Into<String>, store: StoreKind) -> Self {
        Self {
            name: name.into(),
            store,
            data_type: None,
        }
    }

    /// Declares the data type values of this attribute must carry.
    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    /// Returns the attribute name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the store strategy.
    #[inline]
    pub fn store(&self) -> StoreKind {
        self.store
    }

    /// Returns the declared data type, if any.
    #[inline]
    pub fn data_type(&self) -> Option<DataType> {
        self.data_type
    }

    /// Checks a value against the declared data type. Null is always accepted.
    pub fn accepts(&self, value: Option<&Value>) -> bool {
        match (self.data_type, value) {
            (Some(expected), Some(value)) => value.data_type() == expected,
            _ => true,
        }
    }
}

/// Schema and accessor table of one object type.
#[derive(Clone)]
pub struct TypeDefinition {
    name: String,
    attributes: Vec<AttributeDef>,
    accessors: HashMap<String, Accessor>,
}

impl TypeDefinition {
    /// Starts a definition for the Rust type `T`.
    pub fn builder<T: Any>(name: impl Into<String>) -> TypeDefinitionBuilder<T> {
        TypeDefinitionBuilder {
            definition: TypeDefinition::schema_only(name, Vec::new()),
            _marker: PhantomData,
        }
    }

    /// Creates a definition without accessors. Entries of such a type are
    /// indexed from explicit attribute maps only.
    pub fn schema_only(name: impl Into<String>, attributes: Vec<AttributeDef>) -> Self {
        Self {
            name: name.into(),
            attributes,
            accessors: HashMap::new(),
        }
    }

    /// Returns the type name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared attributes.
    #[inline]
    pub fn attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    /// Gets a declared attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Returns true if `name` is a declared attribute.
    pub fn is_declared(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Reads one attribute of an object through the accessor table.
    ///
    /// Returns `None` when the attribute has no accessor or the object is
    /// not of this definition's Rust type.
    pub fn read(&self, object: &dyn Any, name: &str) -> Option<Option<Value>> {
        let accessor = self.accessors.get(name)?;
        Some(accessor(object))
    }

    /// Extracts every declared attribute that has an accessor.
    pub fn extract(&self, object: &dyn Any) -> AttributeValues {
        self.attributes
            .iter()
            .filter_map(|attr| {
                self.read(object, attr.name())
                    .map(|value| (attr.name().to_string(), value))
            })
            .collect()
    }

    /// Binds an object to this definition for direct predicate evaluation.
    pub fn bind<'a>(&'a self, object: &'a dyn Any) -> BoundObject<'a> {
        BoundObject {
            definition: self,
            object,
            tags: &[],
            named_tags: None,
        }
    }
}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut accessors: Vec<_> = self.accessors.keys().collect();
        accessors.sort();
        f.debug_struct("TypeDefinition")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("accessors", &accessors)
            .finish()
    }
}

/// Builder for [`TypeDefinition`]s over a concrete Rust type.
pub struct TypeDefinitionBuilder<T> {
    definition: TypeDefinition,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Any> TypeDefinitionBuilder<T> {
    /// Declares an indexed attribute and its accessor.
    pub fn attribute<F>(self, name: impl Into<String>, store: StoreKind, accessor: F) -> Self
    where
        F: Fn(&T) -> Option<Value> + Send + Sync + 'static,
    {
        self.declare(AttributeDef::new(name, store), accessor)
    }

    /// Declares an indexed attribute with a declared data type.
    pub fn typed_attribute<F>(
        self,
        name: impl Into<String>,
        store: StoreKind,
        data_type: DataType,
        accessor: F,
    ) -> Self
    where
        F: Fn(&T) -> Option<Value> + Send + Sync + 'static,
    {
        self.declare(AttributeDef::new(name, store).with_type(data_type), accessor)
    }

    /// Registers an accessor for an attribute that is readable in direct
    /// evaluation but not indexed.
    pub fn accessor<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> Option<Value> + Send + Sync + 'static,
    {
        let accessor: Accessor =
            Arc::new(move |object: &dyn Any| object.downcast_ref::<T>().and_then(&accessor));
        self.definition.accessors.insert(name.into(), accessor);
        self
    }

    /// Finishes the definition.
    pub fn build(self) -> TypeDefinition {
        self.definition
    }

    fn declare<F>(mut self, def: AttributeDef, accessor: F) -> Self
    where
        F: Fn(&T) -> Option<Value> + Send + Sync + 'static,
    {
        let name = def.name().to_string();
        self.definition.attributes.retain(|a| a.name() != name);
        self.definition.attributes.push(def);
        self.accessor(name, accessor)
    }
}

/// An object bound to its type definition, readable by predicates.
pub struct BoundObject<'a> {
    definition: &'a TypeDefinition,
    object: &'a dyn Any,
    tags: &'a [String],
    named_tags: Option<&'a AttributeValues>,
}

impl<'a> BoundObject<'a> {
    /// Attaches the entry's tags.
    pub fn with_tags(mut self, tags: &'a [String]) -> Self {
        self.tags = tags;
        self
    }

    /// Attaches the entry's named tags.
    pub fn with_named_tags(mut self, named_tags: &'a AttributeValues) -> Self {
        self.named_tags = Some(named_tags);
        self
    }
}

impl AttributeSource for BoundObject<'_> {
    fn type_name(&self) -> &str {
        self.definition.name()
    }

    fn attribute(&self, name: &str) -> Option<Option<Value>> {
        self.definition.read(self.object, name)
    }

    fn named_tag(&self, name: &str) -> Option<Option<Value>> {
        self.named_tags.and_then(|tags| tags.get(name).cloned())
    }

    fn tags(&self) -> &[String] {
        self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Address {
        city: String,
    }

    struct Person {
        name: String,
        age: i32,
        nickname: Option<String>,
        address: Address,
    }

    fn person_definition() -> TypeDefinition {
        TypeDefinition::builder::<Person>("Person")
            .attribute("name", StoreKind::Hash, |p| Some(p.name.as_str().into()))
            .typed_attribute("age", StoreKind::Ordered, DataType::Int32, |p| Some(p.age.into()))
            .attribute("nickname", StoreKind::Hash, |p| p.nickname.as_deref().map(Value::from))
            .attribute("address.city", StoreKind::Hash, |p| {
                Some(p.address.city.as_str().into())
            })
            .build()
    }

    fn alice() -> Person {
        Person {
            name: "Alice".into(),
            age: 30,
            nickname: None,
            address: Address {
                city: "Lisbon".into(),
            },
        }
    }

    #[test]
    fn test_definition_attributes() {
        let def = person_definition();
        assert_eq!(def.name(), "Person");
        assert_eq!(def.attributes().len(), 4);
        assert!(def.is_declared("age"));
        assert!(!def.is_declared("salary"));
        assert_eq!(def.attribute("age").unwrap().store(), StoreKind::Ordered);
    }

    #[test]
    fn test_extract_reads_accessors() {
        let def = person_definition();
        let values = def.extract(&alice());
        assert_eq!(values.get("age"), Some(&Some(Value::Int32(30))));
        assert_eq!(values.get("nickname"), Some(&None));
        assert_eq!(values.get("address.city"), Some(&Some(Value::from("Lisbon"))));
    }

    #[test]
    fn test_read_wrong_type_is_absent_value() {
        let def = person_definition();
        let not_a_person = 42u8;
        assert_eq!(def.read(&not_a_person, "age"), Some(None));
        assert_eq!(def.read(&alice(), "unknown"), None);
    }

    #[test]
    fn test_bound_object_source() {
        let def = person_definition();
        let person = alice();
        let tags = vec!["vip".to_string()];
        let bound = def.bind(&person).with_tags(&tags);
        assert_eq!(bound.type_name(), "Person");
        assert_eq!(bound.attribute("name"), Some(Some(Value::from("Alice"))));
        assert_eq!(bound.tags(), &["vip".to_string()]);
        assert_eq!(bound.named_tag("region"), None);
    }

    #[test]
    fn test_attribute_def_accepts() {
        let def = AttributeDef::new("age", StoreKind::Ordered).with_type(DataType::Int32);
        assert!(def.accepts(Some(&Value::Int32(1))));
        assert!(def.accepts(None));
        assert!(!def.accepts(Some(&Value::from("x"))));
    }
}
