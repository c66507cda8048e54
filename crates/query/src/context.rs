//! Evaluation context of one query.

use crate::algebra::ResultAlgebra;
use crate::ast::Parameters;
use crate::cache::{CacheStore, DirectSource};
use crate::predicate::Predicate;
use crate::result::{AggregateResult, QueryResult};
use cinder_core::{AttributeSource, EntryKey, Error, Result};
use cinder_index::{AttributeIndex, EntryMetadata, IndexLookup, KeySet};
use core::mem;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves the index of `type_name`.
///
/// An unresolved type with exactly one supplied parameter gets an
/// ephemeral index holding one empty store named after that parameter.
fn resolve_index(
    lookup: &dyn IndexLookup,
    params: &Parameters,
    type_name: &str,
) -> Result<Arc<AttributeIndex>> {
    if let Some(index) = lookup.resolve_attribute_index(type_name) {
        return Ok(index);
    }
    match params.single_name() {
        Some(attribute) => {
            debug!(type_name, attribute, "synthesized ephemeral index");
            Ok(Arc::new(AttributeIndex::ephemeral(type_name, attribute)))
        }
        None => Err(Error::type_not_indexed(type_name)),
    }
}

/// State of one evaluation: the active index, the parameters, the result
/// algebra and the aggregate slot. Created per query and never shared.
pub struct QueryContext<'a> {
    lookup: &'a dyn IndexLookup,
    cache: &'a dyn CacheStore,
    params: &'a Parameters,
    type_name: String,
    index: Arc<AttributeIndex>,
    populate: bool,
    depth: usize,
    algebra: ResultAlgebra,
    aggregate: Option<AggregateResult>,
}

impl<'a> QueryContext<'a> {
    /// Opens a context over the index of `type_name`.
    pub fn new(
        lookup: &'a dyn IndexLookup,
        cache: &'a dyn CacheStore,
        params: &'a Parameters,
        type_name: &str,
    ) -> Result<Self> {
        let index = resolve_index(lookup, params, type_name)?;
        Ok(Self {
            lookup,
            cache,
            params,
            type_name: type_name.to_string(),
            index,
            populate: true,
            depth: 0,
            algebra: ResultAlgebra::new(),
            aggregate: None,
        })
    }

    /// Seeds the left list with `candidates` and turns populating off, so
    /// predicates refine the candidates instead of producing new keys.
    pub fn seed(&mut self, candidates: impl IntoIterator<Item = EntryKey>) {
        self.algebra = ResultAlgebra::seeded(candidates);
        self.populate = false;
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    pub fn index(&self) -> &AttributeIndex {
        &self.index
    }

    #[inline]
    pub fn params(&self) -> &'a Parameters {
        self.params
    }

    /// Returns true while predicates load fresh keys rather than refine.
    #[inline]
    pub fn populates(&self) -> bool {
        self.populate
    }

    #[inline]
    pub fn algebra(&self) -> &ResultAlgebra {
        &self.algebra
    }

    #[inline]
    pub fn algebra_mut(&mut self) -> &mut ResultAlgebra {
        &mut self.algebra
    }

    /// Returns the metadata snapshot of an entry.
    pub fn metadata(&self, key: &EntryKey) -> Option<Arc<EntryMetadata>> {
        self.lookup.metadata(key)
    }

    pub fn aggregate(&self) -> Option<&AggregateResult> {
        self.aggregate.as_ref()
    }

    pub fn set_aggregate(&mut self, result: AggregateResult) {
        self.aggregate = Some(result);
    }

    /// Feeds the keys matched by a predicate into the algebra: loaded into
    /// the right list when populating, otherwise shifted out of the left.
    pub fn accept(&mut self, found: KeySet) {
        if self.populate {
            self.algebra.populate(found);
        } else {
            for key in &found {
                self.algebra.shift(key);
            }
        }
    }

    /// Handles an attribute without a store: an error once the cache holds
    /// entries of the type, otherwise a direct evaluation of its entries.
    pub fn missing_store<F>(&self, attribute: &str, apply: F) -> Result<KeySet>
    where
        F: Fn(&dyn AttributeSource) -> Result<bool>,
    {
        if self.cache.entry_count(&self.type_name) > 0 {
            return Err(Error::index_not_defined(self.type_name.as_str(), attribute));
        }
        warn!(
            type_name = %self.type_name,
            attribute,
            "no index store for attribute, evaluating entries directly"
        );
        self.scan_direct(apply)
    }

    /// Evaluates `apply` against every cached entry of the active type.
    pub fn scan_direct<F>(&self, apply: F) -> Result<KeySet>
    where
        F: Fn(&dyn AttributeSource) -> Result<bool>,
    {
        let definition = self.index.definition();
        let mut keys = KeySet::new();
        for key in self.cache.keys_of_type(&self.type_name) {
            let Some(object) = self.cache.get_entry(&key) else {
                continue;
            };
            if apply(&DirectSource::new(&object, Some(definition)))? {
                keys.insert(key);
            }
        }
        Ok(keys)
    }

    /// Runs `f` with the active index switched to `type_name`, restoring
    /// the previous scope afterwards.
    pub fn with_type_scope<R, F>(&mut self, type_name: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        let index = resolve_index(self.lookup, self.params, type_name)?;
        let outer_index = mem::replace(&mut self.index, index);
        let outer_name = mem::replace(&mut self.type_name, type_name.to_string());
        let result = f(self);
        self.index = outer_index;
        self.type_name = outer_name;
        result
    }

    /// Executes `child` against a fixed incoming left list and returns the
    /// keys it produced.
    pub(crate) fn execute_branch(&mut self, incoming: &KeySet, child: &dyn Predicate) -> Result<KeySet> {
        self.algebra.replace_left(incoming.clone());
        self.algebra.take_right();
        self.depth += 1;
        let executed = child.execute(self);
        self.depth -= 1;
        executed?;
        Ok(self.algebra.take_right())
    }

    /// Returns true while executing a child of a composite.
    #[inline]
    pub fn is_nested(&self) -> bool {
        self.depth > 0
    }

    /// Finishes the evaluation. Unless an aggregate already reduced the
    /// algebra, the last produced list becomes the result.
    pub fn into_result(mut self) -> QueryResult {
        if self.aggregate.is_none() {
            self.algebra.reduce();
        }
        let mut keys: Vec<EntryKey> = self.algebra.take_left().into_iter().collect();
        keys.sort();
        QueryResult {
            keys,
            aggregate: self.aggregate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CachedObject, InMemoryCache};
    use cinder_index::{AttributeKey, StoreKind, TypeDefinition};

    struct Item {
        size: i32,
    }

    fn cache() -> InMemoryCache {
        let cache = InMemoryCache::default();
        cache.register_type(
            TypeDefinition::builder::<Item>("Item")
                .attribute("size", StoreKind::Ordered, |i| Some(i.size.into()))
                .build(),
        );
        cache
    }

    #[test]
    fn test_unresolved_type() {
        let cache = cache();
        let none = Parameters::new();
        let err = QueryContext::new(cache.indexes(), &cache, &none, "Order").err();
        assert_eq!(err, Some(Error::type_not_indexed("Order")));

        let one = Parameters::new().with("total", cinder_core::Value::Int32(1));
        let ctx = QueryContext::new(cache.indexes(), &cache, &one, "Order").unwrap();
        assert!(ctx.index().is_ephemeral());
        assert!(ctx.index().has_store(&AttributeKey::plain("total")));
    }

    #[test]
    fn test_accept_populate_and_refine() {
        let cache = cache();
        let params = Parameters::new();
        let mut ctx = QueryContext::new(cache.indexes(), &cache, &params, "Item").unwrap();
        let found: KeySet = ["a", "b"].into_iter().map(EntryKey::from).collect();
        ctx.accept(found.clone());
        assert_eq!(ctx.algebra().right(), &found);

        let mut ctx = QueryContext::new(cache.indexes(), &cache, &params, "Item").unwrap();
        ctx.seed(["b", "c"].into_iter().map(EntryKey::from));
        ctx.accept(found);
        let result = ctx.into_result();
        assert_eq!(result.keys, vec![EntryKey::from("b")]);
    }

    #[test]
    fn test_missing_store() {
        let cache = cache();
        let params = Parameters::new();
        let ctx = QueryContext::new(cache.indexes(), &cache, &params, "Item").unwrap();
        assert!(ctx.missing_store("color", |_| Ok(true)).unwrap().is_empty());

        cache.insert("k1", CachedObject::new("Item", Item { size: 1 })).unwrap();
        let err = ctx.missing_store("color", |_| Ok(true)).unwrap_err();
        assert_eq!(err, Error::index_not_defined("Item", "color"));
    }

    #[test]
    fn test_type_scope_restores() {
        let cache = cache();
        let params = Parameters::new();
        let mut ctx = QueryContext::new(cache.indexes(), &cache, &params, "Item").unwrap();
        let err = ctx.with_type_scope("Order", |_| Ok(())).unwrap_err();
        assert_eq!(err, Error::type_not_indexed("Order"));
        assert_eq!(ctx.type_name(), "Item");

        let inner = ctx
            .with_type_scope("Item", |ctx| Ok(ctx.type_name().to_string()))
            .unwrap();
        assert_eq!(inner, "Item");
    }
}
