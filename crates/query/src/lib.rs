//! Cinder Query - Predicate evaluation over secondary indexes.
//!
//! This crate answers filter queries against cached objects by consulting
//! the attribute indexes of `cinder-index`:
//!
//! - `ast`: Functors, generators and query parameters
//! - `predicate`: Leaf, logical and aggregate predicates
//! - `algebra`: The left/right candidate lists combined during evaluation
//! - `context`: Per-query evaluation state
//! - `cache`: The cache collaborator contract and an in-memory cache
//! - `engine`: The `QueryEngine` entry point
//!
//! # Example
//!
//! ```rust
//! use cinder_query::ast::{Functor, Generator, Parameters};
//! use cinder_query::predicate::CompareFunctorValuePredicate;
//! use cinder_query::{CachedObject, InMemoryCache};
//! use cinder_index::{StoreKind, TypeDefinition};
//! use cinder_core::{EntryKey, Value};
//!
//! struct Person { age: i32 }
//!
//! let cache = InMemoryCache::default();
//! cache.register_type(
//!     TypeDefinition::builder::<Person>("Person")
//!         .attribute("age", StoreKind::Ordered, |p| Some(p.age.into()))
//!         .build(),
//! );
//! cache.insert("k1", CachedObject::new("Person", Person { age: 30 })).unwrap();
//! cache.insert("k2", CachedObject::new("Person", Person { age: 20 })).unwrap();
//!
//! let tree = CompareFunctorValuePredicate::gt(Functor::member("age"), Generator::parameter("min"));
//! let params = Parameters::new().with("min", Value::Int32(25));
//! let result = cache.query_engine().evaluate(&tree, &params, "Person").unwrap();
//! assert_eq!(result.keys, vec![EntryKey::from("k1")]);
//! ```

pub mod algebra;
pub mod ast;
pub mod cache;
pub mod context;
pub mod engine;
pub mod predicate;
pub mod result;

pub use algebra::{Junction, ResultAlgebra};
pub use cache::{CacheStore, CachedObject, InMemoryCache};
pub use context::QueryContext;
pub use engine::QueryEngine;
pub use predicate::Predicate;
pub use result::{AggregateFunction, AggregateResult, AggregateValue, AverageResult, QueryResult};
