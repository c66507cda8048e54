//! Query entry point.

use crate::ast::Parameters;
use crate::cache::{CacheStore, InMemoryCache};
use crate::context::QueryContext;
use crate::predicate::Predicate;
use crate::result::QueryResult;
use cinder_core::{EntryKey, Result};
use cinder_index::IndexLookup;
use tracing::debug;

/// Evaluates predicate trees against the indexes of one cache.
#[derive(Clone, Copy)]
pub struct QueryEngine<'a> {
    lookup: &'a dyn IndexLookup,
    cache: &'a dyn CacheStore,
}

impl<'a> QueryEngine<'a> {
    pub fn new(lookup: &'a dyn IndexLookup, cache: &'a dyn CacheStore) -> Self {
        Self { lookup, cache }
    }

    /// Evaluates `tree` over every entry of `type_name`.
    ///
    /// Any predicate failure aborts the evaluation; there is no partial
    /// result.
    pub fn evaluate(&self, tree: &dyn Predicate, params: &Parameters, type_name: &str) -> Result<QueryResult> {
        let _span = tracing::debug_span!("evaluate", type_name).entered();
        let mut ctx = QueryContext::new(self.lookup, self.cache, params, type_name)?;
        tree.execute(&mut ctx)?;
        let result = ctx.into_result();
        debug!(matched = result.len(), "query evaluated");
        Ok(result)
    }

    /// Evaluates `tree` over a known candidate set, keeping only the
    /// candidates it accepts.
    pub fn evaluate_within(
        &self,
        tree: &dyn Predicate,
        params: &Parameters,
        type_name: &str,
        candidates: impl IntoIterator<Item = EntryKey>,
    ) -> Result<QueryResult> {
        let _span = tracing::debug_span!("evaluate_within", type_name).entered();
        let mut ctx = QueryContext::new(self.lookup, self.cache, params, type_name)?;
        ctx.seed(candidates);
        tree.execute(&mut ctx)?;
        let result = ctx.into_result();
        debug!(matched = result.len(), "query evaluated");
        Ok(result)
    }
}

impl InMemoryCache {
    /// Returns an engine over this cache and its indexes.
    pub fn query_engine(&self) -> QueryEngine<'_> {
        QueryEngine::new(self.indexes(), self)
    }
}
