//! Comparison leaves.

use super::{lookup_or_scan, Predicate};
use crate::ast::{Functor, Generator, Parameters};
use crate::context::QueryContext;
use cinder_core::{AttributeSource, IndexKey, Result};
use cinder_index::{Comparison, KeySet};

/// Compares a functor against a generated value: `functor <op> value`.
#[derive(Clone, Debug, PartialEq)]
pub struct CompareFunctorValuePredicate {
    functor: Functor,
    comparison: Comparison,
    generator: Generator,
    inverse: bool,
}

impl CompareFunctorValuePredicate {
    pub fn new(functor: Functor, comparison: Comparison, generator: Generator) -> Self {
        Self {
            functor,
            comparison,
            generator,
            inverse: false,
        }
    }

    pub fn eq(functor: Functor, generator: Generator) -> Self {
        Self::new(functor, Comparison::Equals, generator)
    }

    pub fn ne(functor: Functor, generator: Generator) -> Self {
        Self::new(functor, Comparison::NotEquals, generator)
    }

    pub fn lt(functor: Functor, generator: Generator) -> Self {
        Self::new(functor, Comparison::LessThan, generator)
    }

    pub fn le(functor: Functor, generator: Generator) -> Self {
        Self::new(functor, Comparison::LessThanEquals, generator)
    }

    pub fn gt(functor: Functor, generator: Generator) -> Self {
        Self::new(functor, Comparison::GreaterThan, generator)
    }

    pub fn ge(functor: Functor, generator: Generator) -> Self {
        Self::new(functor, Comparison::GreaterThanEquals, generator)
    }

    pub fn like(functor: Functor, generator: Generator) -> Self {
        Self::new(functor, Comparison::Like, generator)
    }

    pub fn not_like(functor: Functor, generator: Generator) -> Self {
        Self::new(functor, Comparison::NotLike, generator)
    }

    #[inline]
    pub fn functor(&self) -> &Functor {
        &self.functor
    }

    /// Returns the comparison in effect, accounting for inversion.
    pub fn comparison(&self) -> Comparison {
        if self.inverse {
            self.comparison.inverse()
        } else {
            self.comparison
        }
    }

    fn query(&self, params: &Parameters) -> Result<IndexKey> {
        Ok(self.functor.normalize(self.generator.resolve(params)?))
    }
}

impl Predicate for CompareFunctorValuePredicate {
    fn apply(&self, source: &dyn AttributeSource, params: &Parameters) -> Result<bool> {
        let query = self.query(params)?;
        let values = self.functor.evaluate(source);
        Ok(self.functor.test(&values, self.comparison(), &query))
    }

    fn execute(&self, ctx: &mut QueryContext<'_>) -> Result<()> {
        let params = ctx.params();
        let query = self.query(params)?;
        let found = lookup_or_scan(ctx, &self.functor, self.comparison(), &query, |source| {
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

/// Compares two functors of the same entry: `left <op> right`.
///
/// The indexed form walks the left functor's store and re-evaluates each
/// candidate from its entry metadata. Metadata holds case-folded text, so
/// indexed text comparisons ignore case while direct ones do not.
#[derive(Clone, Debug, PartialEq)]
pub struct CompareFunctorFunctorPredicate {
    left: Functor,
    comparison: Comparison,
    right: Functor,
    inverse: bool,
}

impl CompareFunctorFunctorPredicate {
    pub fn new(left: Functor, comparison: Comparison, right: Functor) -> Self {
        Self {
            left,
            comparison,
            right,
            inverse: false,
        }
    }

    pub fn comparison(&self) -> Comparison {
        if self.inverse {
            self.comparison.inverse()
        } else {
            self.comparison
        }
    }

    /// Returns the first functor without a store, if any.
    fn unindexed(&self, ctx: &QueryContext<'_>) -> Option<&Functor> {
        [&self.left, &self.right]
            .into_iter()
            .find(|functor| !functor.is_dynamic() && !ctx.index().has_store(&functor.attribute_key()))
    }
}

impl Predicate for CompareFunctorFunctorPredicate {
    fn apply(&self, source: &dyn AttributeSource, _params: &Parameters) -> Result<bool> {
        let left = self.left.evaluate(source);
        let right = self
            .right
            .evaluate(source)
            .into_iter()
            .next()
            .unwrap_or(IndexKey::Null);
        Ok(self.left.test(&left, self.comparison(), &right))
    }

    fn execute(&self, ctx: &mut QueryContext<'_>) -> Result<()> {
        let params = ctx.params();
        let found = match self.unindexed(ctx) {
            Some(functor) => {
                ctx.missing_store(functor.attribute_key().name(), |source| self.apply(source, params))?
            }
            None => {
                let candidates = self.left.all_keys(ctx.index()).unwrap_or_default();
                let mut found = KeySet::new();
                for key in candidates {
                    let Some(metadata) = ctx.metadata(&key) else {
                        continue;
                    };
                    if self.apply(metadata.as_ref(), params)? {
                        found.insert(key);
                    }
                }
                found
            }
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
