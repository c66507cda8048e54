//! IN-list and IS NULL leaves.

use super::{lookup_or_scan, Predicate};
use crate::ast::{Functor, Generator, Parameters};
use crate::context::QueryContext;
use cinder_core::{AttributeSource, IndexKey, Result};
use cinder_index::{Comparison, KeySet};

/// `functor IN (v1, v2, ...)`.
///
/// Inverted, it becomes `NOT IN`: the keys differing from the first value
/// minus the keys equal to any of the others.
#[derive(Clone, Debug, PartialEq)]
pub struct IsInListPredicate {
    functor: Functor,
    generators: Vec<Generator>,
    inverse: bool,
}

impl IsInListPredicate {
    pub fn new(functor: Functor, generators: Vec<Generator>) -> Self {
        Self {
            functor,
            generators,
            inverse: false,
        }
    }

    /// Creates an IN-list over constant values.
    pub fn values<I, V>(functor: Functor, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<cinder_core::Value>,
    {
        Self::new(functor, values.into_iter().map(Generator::constant).collect())
    }

    fn queries(&self, params: &Parameters) -> Result<Vec<IndexKey>> {
        self.generators
            .iter()
            .map(|g| Ok(self.functor.normalize(g.resolve(params)?)))
            .collect()
    }

    fn lookup(&self, ctx: &QueryContext<'_>, queries: &[IndexKey]) -> Option<KeySet> {
        let index = ctx.index();
        let Some((first, rest)) = queries.split_first() else {
            return if self.inverse {
                self.functor.all_keys(index)
            } else {
                self.functor.all_keys(index).map(|_| KeySet::new())
            };
        };

        if self.inverse {
            let mut keys = self.functor.lookup(index, Comparison::NotEquals, first)?;
            for query in rest {
                for key in self.functor.lookup(index, Comparison::Equals, query)? {
                    keys.remove(&key);
                }
            }
            Some(keys)
        } else {
            let mut keys = KeySet::new();
            for query in queries {
                keys.extend(self.functor.lookup(index, Comparison::Equals, query)?);
            }
            Some(keys)
        }
    }
}

impl Predicate for IsInListPredicate {
    fn apply(&self, source: &dyn AttributeSource, params: &Parameters) -> Result<bool> {
        let values = self.functor.evaluate(source);
        let queries = self.queries(params)?;
        let found = if self.inverse {
            queries
                .iter()
                .all(|q| self.functor.test(&values, Comparison::NotEquals, q))
                && !values.is_empty()
        } else {
            queries
                .iter()
                .any(|q| self.functor.test(&values, Comparison::Equals, q))
        };
        Ok(found)
    }

    fn execute(&self, ctx: &mut QueryContext<'_>) -> Result<()> {
        let params = ctx.params();
        let queries = self.queries(params)?;
        let found = match self.lookup(ctx, &queries) {
            Some(keys) => keys,
            None => ctx.missing_store(self.functor.attribute_key().name(), |source| {
                self.apply(source, params)
            })?,
        };
        ctx.accept(found);
        Ok(())
    }

    fn invert(&mut self) {
        self.inverse = !self.inverse;
    }

    fn is_inverse(&self) -> bool {
        self.inverse
    }
}

/// `functor IS NULL`, or `IS NOT NULL` when inverted.
#[derive(Clone, Debug, PartialEq)]
pub struct IsNullPredicate {
    functor: Functor,
    inverse: bool,
}

impl IsNullPredicate {
    pub fn new(functor: Functor) -> Self {
        Self {
            functor,
            inverse: false,
        }
    }

    /// Creates an `IS NOT NULL` test.
    pub fn not_null(functor: Functor) -> Self {
        Self {
            functor,
            inverse: true,
        }
    }

    fn comparison(&self) -> Comparison {
        if self.inverse {
            Comparison::NotEquals
        } else {
            Comparison::Equals
        }
    }
}

impl Predicate for IsNullPredicate {
    fn apply(&self, source: &dyn AttributeSource, _params: &Parameters) -> Result<bool> {
        let values = self.functor.evaluate(source);
        Ok(self.functor.test(&values, self.comparison(), &IndexKey::Null))
    }

    fn execute(&self, ctx: &mut QueryContext<'_>) -> Result<()> {
        let params = ctx.params();
        let found = lookup_or_scan(ctx, &self.functor, self.comparison(), &IndexKey::Null, |source| {
            self.apply(source, params)
        })?;
        ctx.accept(found);
        Ok(())
    }

    fn invert(&mut self) {
        self.inverse = !self.inverse;
    }

    fn is_inverse(&self) -> bool {
        self.inverse
    }
}
