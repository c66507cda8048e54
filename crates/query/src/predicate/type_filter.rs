//! Type filter.

use super::Predicate;
use crate::ast::Parameters;
use crate::context::QueryContext;
use cinder_core::{AttributeSource, Error, Result};

/// Selects the object type a (sub)tree executes against.
///
/// On its own it accepts every entry the type's index knows about. Inside a
/// logical predicate it scopes its next sibling to the type instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IsOfTypePredicate {
    type_name: String,
}

impl IsOfTypePredicate {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Rejects the `*` wildcard, which names no single index.
    pub(crate) fn check(type_name: &str) -> Result<&str> {
        if type_name == "*" {
            return Err(Error::unsupported("type filter `*` is not supported"));
        }
        Ok(type_name)
    }
}

impl Predicate for IsOfTypePredicate {
    fn apply(&self, source: &dyn AttributeSource, _params: &Parameters) -> Result<bool> {
        let type_name = Self::check(&self.type_name)?;
        Ok(source.type_name() == type_name)
    }

    fn execute(&self, ctx: &mut QueryContext<'_>) -> Result<()> {
        let type_name = Self::check(&self.type_name)?;
        ctx.with_type_scope(type_name, |ctx| {
            let keys = ctx.index().all_keys();
            ctx.accept(keys);
            Ok(())
        })
    }

    fn invert(&mut self) {}

    fn is_inverse(&self) -> bool {
        false
    }

    fn type_scope(&self) -> Option<&str> {
        Some(&self.type_name)
    }
}
