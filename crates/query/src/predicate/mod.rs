//! Predicate definitions for query filtering.
//!
//! Every predicate evaluates two ways that agree with each other: directly
//! against one entry ([`Predicate::apply`]) and against the index of the
//! active type ([`Predicate::execute`]), feeding the result algebra.

mod aggregate;
mod compare;
mod list;
mod logical;
mod tag;
mod type_filter;

pub use aggregate::AggregatePredicate;
pub use compare::{CompareFunctorFunctorPredicate, CompareFunctorValuePredicate};
pub use list::{IsInListPredicate, IsNullPredicate};
pub use logical::LogicalPredicate;
pub use tag::{TagMatch, TagPredicate};
pub use type_filter::IsOfTypePredicate;

use crate::ast::{Functor, Parameters};
use crate::context::QueryContext;
use cinder_core::{AttributeSource, IndexKey, Result};
use cinder_index::{Comparison, KeySet};
use core::fmt;

/// A node of a predicate tree.
pub trait Predicate: fmt::Debug + Send + Sync {
    /// Evaluates the predicate against one entry.
    fn apply(&self, source: &dyn AttributeSource, params: &Parameters) -> Result<bool>;

    /// Evaluates the predicate against the active index.
    fn execute(&self, ctx: &mut QueryContext<'_>) -> Result<()>;

    /// Negates the predicate in place.
    fn invert(&mut self);

    /// Returns true if the predicate is negated.
    fn is_inverse(&self) -> bool;

    /// Type a type filter scopes its successor to.
    fn type_scope(&self) -> Option<&str> {
        None
    }
}

impl<P: Predicate + ?Sized> Predicate for Box<P> {
    fn apply(&self, source: &dyn AttributeSource, params: &Parameters) -> Result<bool> {
        (**self).apply(source, params)
    }

    fn execute(&self, ctx: &mut QueryContext<'_>) -> Result<()> {
        (**self).execute(ctx)
    }

    fn invert(&mut self) {
        (**self).invert()
    }

    fn is_inverse(&self) -> bool {
        (**self).is_inverse()
    }

    fn type_scope(&self) -> Option<&str> {
        (**self).type_scope()
    }
}

/// Looks up `functor <comparison> query`, falling back to `apply` over the
/// type's entries when the functor has no store.
fn lookup_or_scan<F>(
    ctx: &QueryContext<'_>,
    functor: &Functor,
    comparison: Comparison,
    query: &IndexKey,
    apply: F,
) -> Result<KeySet>
where
    F: Fn(&dyn AttributeSource) -> Result<bool>,
{
    match functor.lookup(ctx.index(), comparison, query) {
        Some(keys) => Ok(keys),
        None => ctx.missing_store(functor.attribute_key().name(), apply),
    }
}
