//! Cinder Index - Secondary indexes over cached objects.
//!
//! This crate provides the index side of the query engine:
//!
//! - `HashStore`: O(1) equality lookups using a hash map
//! - `OrderedStore`: Range walks over a balanced search tree
//! - `AttributeIndex`: Attribute key → store table of one object type
//! - `TypeDefinition`: Declared attributes and accessor tables
//! - `IndexManager`: Registry of attribute indexes plus entry metadata
//! - `TagIndexManager` / `NamedTagIndexManager`: Tag and named-tag support
//!
//! # Example
//!
//! ```rust
//! use cinder_index::{AttributeKey, Comparison, IndexLookup, IndexManager, StoreKind, TypeDefinition};
//! use cinder_core::{EntryKey, IndexKey, Value};
//!
//! struct Person { age: i32 }
//!
//! let manager = IndexManager::default();
//! manager.register_type(
//!     TypeDefinition::builder::<Person>("Person")
//!         .attribute("age", StoreKind::Ordered, |p| Some(p.age.into()))
//!         .build(),
//! );
//!
//! let key = EntryKey::from("k1");
//! manager.index_object(&key, "Person", &Person { age: 30 }).unwrap();
//!
//! let index = manager.resolve_attribute_index("Person").unwrap();
//! let found = index
//!     .get_data(
//!         &AttributeKey::plain("age"),
//!         &IndexKey::from(Value::Int32(25)),
//!         Comparison::GreaterThan,
//!     )
//!     .unwrap();
//! assert!(found.contains(&key));
//! ```

pub mod attribute;
pub mod attribute_index;
pub mod config;
pub mod definition;
pub mod hash;
pub mod manager;
pub mod metadata;
pub mod ordered;
pub mod stats;
pub mod tag;
pub mod traits;

pub use attribute::{AttributeKey, NAMED_TAG_PREFIX, TAG_ATTRIBUTE};
pub use attribute_index::{AttributeIndex, AttributeValues};
pub use config::IndexConfig;
pub use definition::{Accessor, AttributeDef, BoundObject, TypeDefinition, TypeDefinitionBuilder};
pub use hash::HashStore;
pub use manager::{IndexLookup, IndexManager};
pub use metadata::{EntryMetadata, MetadataStore};
pub use ordered::OrderedStore;
pub use stats::IndexStats;
pub use tag::{NamedTagIndexManager, TagIndexManager};
pub use traits::{Comparison, IndexStore, KeyMatcher, KeyRange, KeySet, StoreKind};
