//! AND / OR composite.

use super::{IsOfTypePredicate, Predicate};
use crate::algebra::{combine, Junction};
use crate::ast::Parameters;
use crate::context::QueryContext;
use cinder_core::{AttributeSource, Result};

/// One evaluation step of a composite: a child, or a child scoped to the
/// type named by the type filter preceding it.
enum Step<'p> {
    Single(&'p dyn Predicate),
    Scoped(&'p str, &'p dyn Predicate),
}

/// Joins child predicates with AND or OR.
///
/// Inversion applies De Morgan's law: the junction flips and every child
/// is inverted.
#[derive(Debug)]
pub struct LogicalPredicate {
    junction: Junction,
    children: Vec<Box<dyn Predicate>>,
}

impl LogicalPredicate {
    pub fn new(junction: Junction, children: Vec<Box<dyn Predicate>>) -> Self {
        Self { junction, children }
    }

    pub fn and(children: Vec<Box<dyn Predicate>>) -> Self {
        Self::new(Junction::And, children)
    }

    pub fn or(children: Vec<Box<dyn Predicate>>) -> Self {
        Self::new(Junction::Or, children)
    }

    /// Appends a child.
    pub fn push(&mut self, child: impl Predicate + 'static) {
        self.children.push(Box::new(child));
    }

    #[inline]
    pub fn junction(&self) -> Junction {
        self.junction
    }

    #[inline]
    pub fn children(&self) -> &[Box<dyn Predicate>] {
        &self.children
    }

    fn steps(&self) -> Vec<Step<'_>> {
        let mut steps = Vec::with_capacity(self.children.len());
        let mut children = self.children.iter();
        while let Some(child) = children.next() {
            let scoped = match child.type_scope() {
                Some(type_name) => children.next().map(|next| Step::Scoped(type_name, &**next)),
                None => None,
            };
            steps.push(scoped.unwrap_or(Step::Single(&**child)));
        }
        steps
    }
}

impl Predicate for LogicalPredicate {
    fn apply(&self, source: &dyn AttributeSource, params: &Parameters) -> Result<bool> {
        for step in self.steps() {
            let matched = match step {
                Step::Single(child) => child.apply(source, params)?,
                Step::Scoped(type_name, child) => {
                    source.type_name() == IsOfTypePredicate::check(type_name)? && child.apply(source, params)?
                }
            };
            match self.junction {
                Junction::And if !matched => return Ok(false),
                Junction::Or if matched => return Ok(true),
                _ => {}
            }
        }
        Ok(self.junction == Junction::And)
    }

    fn execute(&self, ctx: &mut QueryContext<'_>) -> Result<()> {
        let steps = self.steps();
        let populates = ctx.populates();
        let incoming = ctx.algebra().left().clone();

        let mut sets = Vec::with_capacity(steps.len());
        for step in steps {
            let set = match step {
                Step::Single(child) => ctx.execute_branch(&incoming, child)?,
                Step::Scoped(type_name, child) => {
                    let type_name = IsOfTypePredicate::check(type_name)?;
                    ctx.with_type_scope(type_name, |ctx| ctx.execute_branch(&incoming, child))?
                }
            };
            sets.push(set);
        }

        let combined = if sets.is_empty() {
            match self.junction {
                Junction::And if populates => ctx.index().all_keys(),
                Junction::And => incoming.clone(),
                Junction::Or => Default::default(),
            }
        } else {
            combine(sets, self.junction)
        };

        let mut left = incoming;
        if !populates {
            left.retain(|key| !combined.contains(key));
        }
        let algebra = ctx.algebra_mut();
        algebra.replace_left(left);
        algebra.take_right();
        algebra.merge(combined);
        Ok(())
    }

    fn invert(&mut self) {
        self.junction = self.junction.flip();
        for child in &mut self.children {
            child.invert();
        }
    }

    fn is_inverse(&self) -> bool {
        self.junction == Junction::Or
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Functor, Generator};
    use crate::predicate::{CompareFunctorValuePredicate, IsNullPredicate};
    use cinder_core::{EntryKey, Value};
    use cinder_index::{AttributeValues, EntryMetadata, MetadataStore};
    use std::sync::Arc;

    fn person(age: Option<i32>) -> Arc<EntryMetadata> {
        let store = MetadataStore::default();
        let key = EntryKey::from("k");
        let mut values = AttributeValues::new();
        values.insert("age".into(), age.map(Value::Int32));
        store.record_attributes(&key, "Person", &values);
        store.get(&key).unwrap()
    }

    fn older_than(age: i32) -> Box<dyn Predicate> {
        Box::new(CompareFunctorValuePredicate::gt(
            Functor::member("age"),
            Generator::constant(age),
        ))
    }

    fn younger_than(age: i32) -> Box<dyn Predicate> {
        Box::new(CompareFunctorValuePredicate::lt(
            Functor::member("age"),
            Generator::constant(age),
        ))
    }

    #[test]
    fn test_apply_short_circuits() {
        let params = Parameters::new();
        let meta = person(Some(30));
        let and = LogicalPredicate::and(vec![older_than(25), younger_than(35)]);
        assert!(and.apply(meta.as_ref(), &params).unwrap());
        let and = LogicalPredicate::and(vec![older_than(25), younger_than(28)]);
        assert!(!and.apply(meta.as_ref(), &params).unwrap());
        let or = LogicalPredicate::or(vec![older_than(40), younger_than(35)]);
        assert!(or.apply(meta.as_ref(), &params).unwrap());
    }

    #[test]
    fn test_empty_junctions() {
        let params = Parameters::new();
        let meta = person(Some(30));
        assert!(LogicalPredicate::and(Vec::new()).apply(meta.as_ref(), &params).unwrap());
        assert!(!LogicalPredicate::or(Vec::new()).apply(meta.as_ref(), &params).unwrap());
    }

    #[test]
    fn test_invert_applies_de_morgan() {
        let params = Parameters::new();
        let is_null: Box<dyn Predicate> = Box::new(IsNullPredicate::new(Functor::member("age")));
        let mut pred = LogicalPredicate::and(vec![older_than(25), is_null]);
        pred.invert();
        assert_eq!(pred.junction(), Junction::Or);
        assert!(pred.is_inverse());
        assert!(pred.children().iter().all(|c| c.is_inverse()));
        assert!(pred.apply(person(Some(30)).as_ref(), &params).unwrap());
    }

    #[test]
    fn test_type_filter_pairs_with_next_child() {
        let params = Parameters::new();
        let mut pred = LogicalPredicate::or(Vec::new());
        pred.push(IsOfTypePredicate::new("Order"));
        pred.push(CompareFunctorValuePredicate::gt(Functor::member("age"), Generator::constant(0i32)));
        assert_eq!(pred.steps().len(), 1);
        assert!(!pred.apply(person(Some(30)).as_ref(), &params).unwrap());

        let mut pred = LogicalPredicate::and(Vec::new());
        pred.push(IsOfTypePredicate::new("Person"));
        pred.push(CompareFunctorValuePredicate::gt(Functor::member("age"), Generator::constant(0i32)));
        assert!(pred.apply(person(Some(30)).as_ref(), &params).unwrap());
    }
}
